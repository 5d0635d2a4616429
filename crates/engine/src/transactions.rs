//! Transaction primitives.
//!
//! A `Transaction` is a ledger record describing one monetary movement. Its
//! effect on account balances is expressed as a list of
//! [`Delta`](crate::Delta)s.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError, NewTransactionCmd, ResultEngine, TransactionPatch,
    util::{
        apply_optional_text_patch, normalize_optional_text, normalize_required_text, parse_uuid,
    },
};

/// Account used when a transaction does not name its source account.
pub const DEFAULT_ACCOUNT: &str = "Manual account";

/// Largest amount a single transaction may carry (10^15 minor units).
pub const MAX_AMOUNT_MINOR: i64 = 1_000_000_000_000_000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid transaction kind: {other}"
            ))),
        }
    }
}

/// User-facing grouping tag, orthogonal to account and category.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    #[default]
    Personal,
    Office,
}

impl Division {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Office => "Office",
        }
    }
}

impl TryFrom<&str> for Division {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "Personal" => Ok(Self::Personal),
            "Office" => Ok(Self::Office),
            other => Err(EngineError::Validation(format!("invalid division: {other}"))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TransactionKind,
    /// Always positive; the sign of the balance effect comes from `kind`.
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub division: Division,
    pub account_from: String,
    /// Set if and only if `kind` is [`TransactionKind::Transfer`].
    pub account_to: Option<String>,
    pub note: Option<String>,
    /// Effective date of the movement.
    pub occurred_at: DateTime<Utc>,
    /// Immutable record creation time; drives the edit window.
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Validate a creation command and build the record it describes.
    ///
    /// `created_at` doubles as the default `occurred_at`.
    pub fn create(cmd: NewTransactionCmd, created_at: DateTime<Utc>) -> ResultEngine<Self> {
        ensure_amount_in_range(cmd.amount_minor)?;
        let description = normalize_required_text(&cmd.description, "description")?;
        let category = normalize_required_text(&cmd.category, "category")?;
        let account_from = account_or_default(cmd.account_from.as_deref());
        let account_to = resolve_account_to(cmd.kind, cmd.account_to.as_deref())?;

        Ok(Self {
            id: Uuid::new_v4(),
            kind: cmd.kind,
            amount_minor: cmd.amount_minor,
            description,
            category,
            division: cmd.division.unwrap_or_default(),
            account_from,
            account_to,
            note: normalize_optional_text(cmd.note.as_deref()),
            occurred_at: cmd.occurred_at.unwrap_or(created_at),
            created_at,
        })
    }

    /// Merge `patch` into a copy of this record and re-validate the result.
    ///
    /// `id` and `created_at` never change.
    pub fn patched(&self, patch: &TransactionPatch) -> ResultEngine<Self> {
        let kind = patch.kind.unwrap_or(self.kind);
        let amount_minor = patch.amount_minor.unwrap_or(self.amount_minor);
        ensure_amount_in_range(amount_minor)?;

        let description = match patch.description.as_deref() {
            Some(value) => normalize_required_text(value, "description")?,
            None => self.description.clone(),
        };
        let category = match patch.category.as_deref() {
            Some(value) => normalize_required_text(value, "category")?,
            None => self.category.clone(),
        };
        let account_from = match patch.account_from.as_deref() {
            Some(value) => account_or_default(Some(value)),
            None => self.account_from.clone(),
        };
        let account_to = resolve_account_to(
            kind,
            patch.account_to.as_deref().or(self.account_to.as_deref()),
        )?;

        Ok(Self {
            id: self.id,
            kind,
            amount_minor,
            description,
            category,
            division: patch.division.unwrap_or(self.division),
            account_from,
            account_to,
            note: apply_optional_text_patch(self.note.clone(), patch.note.as_deref()),
            occurred_at: patch.occurred_at.unwrap_or(self.occurred_at),
            created_at: self.created_at,
        })
    }

    /// Returns `true` if `account` is the source or the transfer destination.
    pub fn involves(&self, account: &str) -> bool {
        self.account_from == account || self.account_to.as_deref() == Some(account)
    }
}

fn ensure_amount_in_range(amount_minor: i64) -> ResultEngine<()> {
    if amount_minor <= 0 {
        return Err(EngineError::Validation(
            "amount_minor must be > 0".to_string(),
        ));
    }
    if amount_minor > MAX_AMOUNT_MINOR {
        return Err(EngineError::Validation(format!(
            "amount_minor must be <= {MAX_AMOUNT_MINOR}"
        )));
    }
    Ok(())
}

fn account_or_default(value: Option<&str>) -> String {
    normalize_optional_text(value).unwrap_or_else(|| DEFAULT_ACCOUNT.to_string())
}

fn resolve_account_to(kind: TransactionKind, value: Option<&str>) -> ResultEngine<Option<String>> {
    match kind {
        TransactionKind::Transfer => normalize_optional_text(value).map(Some).ok_or_else(|| {
            EngineError::Validation("account_to is required for transfers".to_string())
        }),
        TransactionKind::Income | TransactionKind::Expense => Ok(None),
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub kind: String,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub division: String,
    pub account_from: String,
    pub account_to: Option<String>,
    pub note: Option<String>,
    pub occurred_at: DateTimeUtc,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id.to_string()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            category: ActiveValue::Set(tx.category.clone()),
            division: ActiveValue::Set(tx.division.as_str().to_string()),
            account_from: ActiveValue::Set(tx.account_from.clone()),
            account_to: ActiveValue::Set(tx.account_to.clone()),
            note: ActiveValue::Set(tx.note.clone()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            created_at: ActiveValue::Set(tx.created_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: parse_uuid(&model.id, "transaction")?,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            amount_minor: model.amount_minor,
            description: model.description,
            category: model.category,
            division: Division::try_from(model.division.as_str())?,
            account_from: model.account_from,
            account_to: model.account_to,
            note: model.note,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
        })
    }
}
