//! Ledger consistency engine.
//!
//! The engine records income, expense and transfer transactions against
//! named accounts and keeps account balances in step with the ledger:
//!
//! - [`Engine::add_transaction`] persists a record and applies its
//!   [`Delta`]s in one database transaction.
//! - [`Engine::update_transaction`] is gated by the [`EditWindow`].
//! - [`Engine::delete_transaction`] is never gated; whether it reverses the
//!   balance effect depends on the [`BalancePolicy`].
//! - [`reports`] derives summaries, category breakdowns and trends on demand.

pub use accounts::{Account, MAX_BALANCE_MINOR};
pub use commands::{NewTransactionCmd, TransactionPatch};
pub use deltas::{Delta, derive_balances};
pub use error::EngineError;
pub use ops::{BalanceDrift, Engine, EngineBuilder, TransactionListFilter};
pub use policy::{BalancePolicy, DEFAULT_EDIT_WINDOW_HOURS, EditWindow, Mutability};
pub use reports::{CategoryShare, Report, ReportWindow, Summary, TrendPoint};
pub use transactions::{
    DEFAULT_ACCOUNT, Division, MAX_AMOUNT_MINOR, Transaction, TransactionKind,
};

mod accounts;
mod commands;
mod deltas;
mod error;
mod ops;
mod policy;
pub mod reports;
mod transactions;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
