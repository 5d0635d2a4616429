use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, DatabaseTransaction, Statement, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

use crate::{
    Account, Delta, EngineError, MAX_AMOUNT_MINOR, MAX_BALANCE_MINOR, ResultEngine, Transaction,
    accounts, derive_balances, transactions, util::normalize_required_text,
};

use super::{Engine, with_tx};

/// Increment-or-create in one statement; the storage layer serializes
/// concurrent increments on the same name. The update is skipped when the
/// new balance would leave `[-MAX_BALANCE_MINOR, MAX_BALANCE_MINOR]`; SQLite
/// turns an overflowing integer sum into a REAL, which the bound also catches.
const UPSERT_DELTA_SQL: &str = "INSERT INTO accounts (name, balance_minor, opening_balance_minor, created_at) \
     VALUES (?, ?, 0, ?) \
     ON CONFLICT(name) DO UPDATE SET balance_minor = accounts.balance_minor + excluded.balance_minor \
     WHERE abs(accounts.balance_minor + excluded.balance_minor) <= ?;";

/// An account whose stored balance disagrees with the ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceDrift {
    pub account: String,
    /// `None` when the ledger names an account that has no stored row.
    pub stored_minor: Option<i64>,
    pub derived_minor: i64,
}

impl Engine {
    /// Adds `delta_minor` to the balance of `name`, creating the account with
    /// `balance = delta_minor` if it does not exist yet.
    ///
    /// `delta_minor` is bounded like a transaction amount, and the resulting
    /// balance must stay within [`MAX_BALANCE_MINOR`].
    pub async fn upsert_balance_delta(&self, name: &str, delta_minor: i64) -> ResultEngine<Account> {
        let name = normalize_required_text(name, "account name")?;
        if delta_minor.checked_abs().is_none_or(|abs| abs > MAX_AMOUNT_MINOR) {
            return Err(EngineError::Validation(format!(
                "delta must be within +/-{MAX_AMOUNT_MINOR}"
            )));
        }
        let now = self.now();
        with_tx!(self, |db_tx| {
            apply_deltas(&db_tx, &[Delta::new(name.clone(), delta_minor)], now).await?;
            let model = accounts::Entity::find_by_id(name.clone())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::BalanceMutation(format!("account '{name}' vanished")))?;
            Ok(Account::from(model))
        })
    }

    /// Compares every stored balance with the balance derived from the ledger.
    ///
    /// Only drifting accounts are returned, ordered by name.
    pub async fn verify_balances(&self) -> ResultEngine<Vec<BalanceDrift>> {
        with_tx!(self, |db_tx| balance_drift(&db_tx).await)
    }

    /// Rewrites drifting balances to their ledger-derived value.
    ///
    /// Accounts named by the ledger but missing from storage are created.
    /// Returns the drifts that were corrected.
    pub async fn recompute_balances(&self) -> ResultEngine<Vec<BalanceDrift>> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let drifts = balance_drift(&db_tx).await?;
            for drift in &drifts {
                match drift.stored_minor {
                    Some(_) => {
                        let active = accounts::ActiveModel {
                            name: ActiveValue::Set(drift.account.clone()),
                            balance_minor: ActiveValue::Set(drift.derived_minor),
                            ..Default::default()
                        };
                        active.update(&db_tx).await?;
                    }
                    None => {
                        let mut account = Account::new(drift.account.clone(), 0, now);
                        account.balance_minor = drift.derived_minor;
                        accounts::ActiveModel::from(&account).insert(&db_tx).await?;
                    }
                }
            }
            if !drifts.is_empty() {
                tracing::info!("recomputed {} drifting account balances", drifts.len());
            }
            Ok(drifts)
        })
    }
}

/// Applies `deltas` in order through the atomic increment-or-create upsert.
pub(crate) async fn apply_deltas(
    db_tx: &DatabaseTransaction,
    deltas: &[Delta],
    now: DateTime<Utc>,
) -> ResultEngine<()> {
    let backend = db_tx.get_database_backend();
    for delta in deltas {
        let result = db_tx
            .execute(Statement::from_sql_and_values(
                backend,
                UPSERT_DELTA_SQL,
                vec![
                    delta.account.clone().into(),
                    delta.amount_minor.into(),
                    now.into(),
                    MAX_BALANCE_MINOR.into(),
                ],
            ))
            .await
            .map_err(|err| {
                tracing::error!(account = %delta.account, "balance delta failed: {err}");
                EngineError::BalanceMutation(format!("account '{}': {err}", delta.account))
            })?;
        if result.rows_affected() == 0 {
            tracing::warn!(
                account = %delta.account,
                amount_minor = delta.amount_minor,
                "balance delta rejected: out of range"
            );
            return Err(EngineError::AmountOverflow(format!(
                "balance of account '{}' would exceed {MAX_BALANCE_MINOR}",
                delta.account
            )));
        }
        tracing::debug!(
            account = %delta.account,
            amount_minor = delta.amount_minor,
            "balance delta applied"
        );
    }
    Ok(())
}

async fn balance_drift(db_tx: &DatabaseTransaction) -> ResultEngine<Vec<BalanceDrift>> {
    let accounts: Vec<Account> = accounts::Entity::find()
        .all(db_tx)
        .await?
        .into_iter()
        .map(Account::from)
        .collect();
    let ledger = transactions::Entity::find()
        .all(db_tx)
        .await?
        .into_iter()
        .map(Transaction::try_from)
        .collect::<ResultEngine<Vec<_>>>()?;

    let stored: HashMap<&str, i64> = accounts
        .iter()
        .map(|account| (account.name.as_str(), account.balance_minor))
        .collect();
    let derived = derive_balances(&accounts, &ledger)?;

    Ok(derived
        .into_iter()
        .filter_map(|(account, derived_minor)| {
            let stored_minor = stored.get(account.as_str()).copied();
            (stored_minor != Some(derived_minor)).then_some(BalanceDrift {
                account,
                stored_minor,
                derived_minor,
            })
        })
        .collect())
}
