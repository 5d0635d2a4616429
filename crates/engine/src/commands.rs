//! Command structs for engine operations.
//!
//! These types group parameters for write operations (add/update), keeping
//! call sites readable and avoiding long argument lists.

use chrono::{DateTime, Utc};

use crate::{Division, TransactionKind};

/// Record a new transaction in the ledger.
///
/// Only `kind`, `amount_minor`, `description` and `category` are required;
/// the remaining fields fall back to the ledger defaults when left unset:
/// - `division`: [`Division::Personal`]
/// - `account_from`: [`DEFAULT_ACCOUNT`](crate::DEFAULT_ACCOUNT)
/// - `occurred_at`: creation time
#[derive(Clone, Debug)]
pub struct NewTransactionCmd {
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub division: Option<Division>,
    pub account_from: Option<String>,
    pub account_to: Option<String>,
    pub note: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl NewTransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        amount_minor: i64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            amount_minor,
            description: description.into(),
            category: category.into(),
            division: None,
            account_from: None,
            account_to: None,
            note: None,
            occurred_at: None,
        }
    }

    /// Money entering `account`.
    #[must_use]
    pub fn income(
        account: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Income, amount_minor, description, category)
            .account_from(account)
    }

    /// Money leaving `account`.
    #[must_use]
    pub fn expense(
        account: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Expense, amount_minor, description, category)
            .account_from(account)
    }

    /// Money moving from `from` to `to`.
    #[must_use]
    pub fn transfer(
        from: impl Into<String>,
        to: impl Into<String>,
        amount_minor: i64,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self::new(TransactionKind::Transfer, amount_minor, description, category)
            .account_from(from)
            .account_to(to)
    }

    #[must_use]
    pub fn division(mut self, division: Division) -> Self {
        self.division = Some(division);
        self
    }

    #[must_use]
    pub fn account_from(mut self, account: impl Into<String>) -> Self {
        self.account_from = Some(account.into());
        self
    }

    #[must_use]
    pub fn account_to(mut self, account: impl Into<String>) -> Self {
        self.account_to = Some(account.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }
}

/// Partial update of an existing transaction.
///
/// `None` keeps the stored value. For `note`, `Some("")` clears it.
#[derive(Clone, Debug, Default)]
pub struct TransactionPatch {
    pub kind: Option<TransactionKind>,
    pub amount_minor: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub division: Option<Division>,
    pub account_from: Option<String>,
    pub account_to: Option<String>,
    pub note: Option<String>,
    pub occurred_at: Option<DateTime<Utc>>,
}

impl TransactionPatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = Some(amount_minor);
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn division(mut self, division: Division) -> Self {
        self.division = Some(division);
        self
    }

    #[must_use]
    pub fn account_from(mut self, account: impl Into<String>) -> Self {
        self.account_from = Some(account.into());
        self
    }

    #[must_use]
    pub fn account_to(mut self, account: impl Into<String>) -> Self {
        self.account_to = Some(account.into());
        self
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = Some(occurred_at);
        self
    }

    /// Returns `true` when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        self.kind.is_none()
            && self.amount_minor.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.division.is_none()
            && self.account_from.is_none()
            && self.account_to.is_none()
            && self.note.is_none()
            && self.occurred_at.is_none()
    }
}
