//! The module contains `Account` struct and its storage model.

use chrono::{DateTime, Utc};

use sea_orm::entity::{ActiveValue, prelude::*};
use serde::{Deserialize, Serialize};

/// Largest absolute balance an account may hold (10^18 minor units).
pub const MAX_BALANCE_MINOR: i64 = 1_000_000_000_000_000_000;

/// A named balance bucket that transactions debit or credit.
///
/// The name is the identity: it is case-sensitive and unique. Accounts are
/// created explicitly or materialized the first time a transaction names them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    /// Current balance in minor units, maintained incrementally by deltas.
    pub balance_minor: i64,
    /// Balance the account was explicitly created with (0 when implicit).
    pub opening_balance_minor: i64,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, balance_minor: i64, created_at: DateTime<Utc>) -> Self {
        Self {
            name,
            balance_minor,
            opening_balance_minor: balance_minor,
            created_at,
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "accounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub name: String,
    pub balance_minor: i64,
    pub opening_balance_minor: i64,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<&Account> for ActiveModel {
    fn from(value: &Account) -> Self {
        Self {
            name: ActiveValue::Set(value.name.clone()),
            balance_minor: ActiveValue::Set(value.balance_minor),
            opening_balance_minor: ActiveValue::Set(value.opening_balance_minor),
            created_at: ActiveValue::Set(value.created_at),
        }
    }
}

impl From<Model> for Account {
    fn from(model: Model) -> Self {
        Self {
            name: model.name,
            balance_minor: model.balance_minor,
            opening_balance_minor: model.opening_balance_minor,
            created_at: model.created_at,
        }
    }
}
