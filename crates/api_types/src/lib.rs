use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generic acknowledgement body.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

pub mod account {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountNew {
        pub name: String,
        /// Opening balance in minor units. Defaults to 0.
        pub balance_minor: Option<i64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountView {
        pub name: String,
        pub balance_minor: i64,
        pub opening_balance_minor: i64,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AccountListResponse {
        pub accounts: Vec<AccountView>,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Income,
        Expense,
        Transfer,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub enum Division {
        Personal,
        Office,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub kind: TransactionKind,
        /// Must be > 0. The kind defines the sign of the balance effect.
        pub amount_minor: i64,
        pub description: String,
        pub category: String,
        /// Defaults to `Personal`.
        pub division: Option<Division>,
        /// Defaults to the manual account.
        pub account_from: Option<String>,
        /// Required for transfers, ignored otherwise.
        pub account_to: Option<String>,
        pub note: Option<String>,
        /// RFC3339 timestamp. Defaults to the creation time.
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    /// Partial update; absent fields keep their stored value.
    ///
    /// An empty `note` clears the note.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionUpdate {
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub description: Option<String>,
        pub category: Option<String>,
        pub division: Option<Division>,
        pub account_from: Option<String>,
        pub account_to: Option<String>,
        pub note: Option<String>,
        pub occurred_at: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub description: String,
        pub category: String,
        pub division: Division,
        pub account_from: String,
        pub account_to: Option<String>,
        pub note: Option<String>,
        pub occurred_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
    }

    /// Query string of `GET /api/transactions`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionListQuery {
        /// Case-insensitive substring of the description.
        pub search: Option<String>,
        pub kind: Option<TransactionKind>,
        pub division: Option<Division>,
        pub category: Option<String>,
        /// Inclusive lower bound on `occurred_at` (RFC3339).
        pub from: Option<DateTime<FixedOffset>>,
        /// Inclusive upper bound on `occurred_at` (RFC3339).
        pub to: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod report {
    use super::*;

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum ReportPeriod {
        Weekly,
        Monthly,
        Yearly,
        #[default]
        All,
    }

    /// Query string of `GET /api/reports`.
    ///
    /// When both `from` and `to` are given they replace `period`.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ReportQuery {
        pub period: Option<ReportPeriod>,
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SummaryView {
        pub income_minor: i64,
        pub expense_minor: i64,
        pub transfer_minor: i64,
        pub balance_minor: i64,
        pub savings_rate: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryShareView {
        pub category: String,
        pub amount_minor: i64,
        pub percent: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TrendPointView {
        pub date: NaiveDate,
        pub income_minor: i64,
        pub expense_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportResponse {
        pub summary: SummaryView,
        pub categories: Vec<CategoryShareView>,
        pub trend: Vec<TrendPointView>,
    }
}

pub mod balance {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceDriftView {
        pub account: String,
        /// Absent when the ledger names an account with no stored row.
        pub stored_minor: Option<i64>,
        pub derived_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceAuditResponse {
        /// `true` when every stored balance matches the ledger.
        pub consistent: bool,
        pub drifts: Vec<BalanceDriftView>,
    }
}
