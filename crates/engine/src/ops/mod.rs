use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;

use crate::{BalancePolicy, EditWindow};

mod accounts;
mod balances;
mod reports;
mod transactions;

pub use balances::BalanceDrift;
pub use transactions::TransactionListFilter;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    edit_window: EditWindow,
    balance_policy: BalancePolicy,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn edit_window(&self) -> EditWindow {
        self.edit_window
    }

    pub fn balance_policy(&self) -> BalancePolicy {
        self.balance_policy
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    edit_window: EditWindow,
    balance_policy: BalancePolicy,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// How long after creation a transaction may still be updated.
    pub fn edit_window(mut self, window: EditWindow) -> EngineBuilder {
        self.edit_window = window;
        self
    }

    pub fn balance_policy(mut self, policy: BalancePolicy) -> EngineBuilder {
        self.balance_policy = policy;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> crate::ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            edit_window: self.edit_window,
            balance_policy: self.balance_policy,
        })
    }
}
