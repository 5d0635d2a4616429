//! The module contains the error the engine can throw.
//!
//! The errors are:
//!
//! - [`Validation`] thrown when a transaction or account input is malformed.
//! - [`KeyNotFound`] thrown when an item is not found.
//! - [`ExistingKey`] thrown when an account name is already taken.
//! - [`EditWindowExpired`] thrown when a transaction is locked for updates.
//! - [`BalanceMutation`] thrown when a balance delta could not be applied.
//! - [`AmountOverflow`] thrown when a balance or a total leaves the allowed range.
//!
//!  [`Validation`]: EngineError::Validation
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`ExistingKey`]: EngineError::ExistingKey
//!  [`EditWindowExpired`]: EngineError::EditWindowExpired
//!  [`BalanceMutation`]: EngineError::BalanceMutation
//!  [`AmountOverflow`]: EngineError::AmountOverflow
use sea_orm::DbErr;
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("\"{0}\" already present!")]
    ExistingKey(String),
    #[error("Edit time expired: transaction is {age_minutes} minutes old, limit is {limit_minutes}")]
    EditWindowExpired { age_minutes: i64, limit_minutes: i64 },
    #[error("Balance mutation failed: {0}")]
    BalanceMutation(String),
    #[error("Amount overflow: {0}")]
    AmountOverflow(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::ExistingKey(a), Self::ExistingKey(b)) => a == b,
            (
                Self::EditWindowExpired {
                    age_minutes: a1,
                    limit_minutes: l1,
                },
                Self::EditWindowExpired {
                    age_minutes: a2,
                    limit_minutes: l2,
                },
            ) => a1 == a2 && l1 == l2,
            (Self::BalanceMutation(a), Self::BalanceMutation(b)) => a == b,
            (Self::AmountOverflow(a), Self::AmountOverflow(b)) => a == b,
            (Self::Database(a), Self::Database(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
