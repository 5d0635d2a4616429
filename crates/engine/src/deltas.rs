//! Balance deltas.
//!
//! A [`Delta`] is a single signed change applied to one account's balance as
//! part of a [`Transaction`]:
//! - positive values increase the account balance
//! - negative values decrease the account balance
//!
//! In the engine, *every* change to a stored balance goes through deltas.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Account, EngineError, ResultEngine, Transaction, TransactionKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delta {
    pub account: String,
    pub amount_minor: i64,
}

impl Delta {
    pub fn new(account: impl Into<String>, amount_minor: i64) -> Self {
        Self {
            account: account.into(),
            amount_minor,
        }
    }

    /// The delta that undoes this one.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            account: self.account.clone(),
            amount_minor: -self.amount_minor,
        }
    }
}

impl Transaction {
    /// Translate the record into the deltas it applies, in application order.
    ///
    /// - `Income`: `+amount` on `account_from`
    /// - `Expense`: `-amount` on `account_from`
    /// - `Transfer`: `-amount` on `account_from`, then `+amount` on `account_to`
    pub fn deltas(&self) -> ResultEngine<Vec<Delta>> {
        match self.kind {
            TransactionKind::Income => Ok(vec![Delta::new(&self.account_from, self.amount_minor)]),
            TransactionKind::Expense => {
                Ok(vec![Delta::new(&self.account_from, -self.amount_minor)])
            }
            TransactionKind::Transfer => {
                let to = self
                    .account_to
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| {
                        EngineError::BalanceMutation(format!(
                            "transfer {} has no destination account",
                            self.id
                        ))
                    })?;
                Ok(vec![
                    Delta::new(&self.account_from, -self.amount_minor),
                    Delta::new(to, self.amount_minor),
                ])
            }
        }
    }

    /// The deltas that undo [`Transaction::deltas`], in reverse order.
    pub fn reversal_deltas(&self) -> ResultEngine<Vec<Delta>> {
        Ok(self.deltas()?.iter().rev().map(Delta::reversed).collect())
    }
}

/// Balance every account should hold according to the ledger: its opening
/// balance plus the signed sum of all deltas naming it.
///
/// Accounts referenced by the ledger but absent from `accounts` start at 0.
pub fn derive_balances<'a, A, T>(accounts: A, transactions: T) -> ResultEngine<BTreeMap<String, i64>>
where
    A: IntoIterator<Item = &'a Account>,
    T: IntoIterator<Item = &'a Transaction>,
{
    let mut balances: BTreeMap<String, i64> = accounts
        .into_iter()
        .map(|account| (account.name.clone(), account.opening_balance_minor))
        .collect();
    for tx in transactions {
        for delta in tx.deltas()? {
            let balance = balances.entry(delta.account).or_insert(0);
            *balance = balance.checked_add(delta.amount_minor).ok_or_else(|| {
                EngineError::AmountOverflow(format!("derived balance of transaction {}", tx.id))
            })?;
        }
    }
    Ok(balances)
}
