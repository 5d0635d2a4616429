use uuid::Uuid;

use sea_orm::{TransactionTrait, prelude::*};

use crate::{
    BalancePolicy, EngineError, NewTransactionCmd, ResultEngine, Transaction, TransactionPatch,
    transactions,
};

use super::super::{Engine, balances::apply_deltas, with_tx};

impl Engine {
    /// Records a new transaction and applies its balance effect.
    ///
    /// The record insert and every delta (both sides of a transfer) commit in
    /// one DB transaction: either the record exists and all balances moved,
    /// or nothing changed.
    pub async fn add_transaction(&self, cmd: NewTransactionCmd) -> ResultEngine<Transaction> {
        let now = self.now();
        let tx = Transaction::create(cmd, now)?;
        let deltas = tx.deltas()?;

        with_tx!(self, |db_tx| {
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;
            apply_deltas(&db_tx, &deltas, now).await?;
            tracing::info!(
                id = %tx.id,
                kind = tx.kind.as_str(),
                amount_minor = tx.amount_minor,
                "transaction recorded"
            );
            Ok(tx)
        })
    }

    /// Updates an existing transaction within its edit window.
    ///
    /// Outside the window the call fails with
    /// [`EngineError::EditWindowExpired`] and the record is untouched. With
    /// [`BalancePolicy::AppendOnly`] balances are left as they are; with
    /// [`BalancePolicy::Reconcile`] the old effect is reversed and the new one
    /// applied.
    pub async fn update_transaction(
        &self,
        id: Uuid,
        patch: TransactionPatch,
    ) -> ResultEngine<Transaction> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            let existing = Transaction::try_from(model)?;

            if let Err(err) = self.edit_window.ensure_editable(existing.created_at, now) {
                tracing::info!(id = %id, "update rejected: {err}");
                return Err(err);
            }

            let updated = existing.patched(&patch)?;
            transactions::ActiveModel::from(&updated)
                .update(&db_tx)
                .await?;

            if self.balance_policy == BalancePolicy::Reconcile {
                apply_deltas(&db_tx, &existing.reversal_deltas()?, now).await?;
                apply_deltas(&db_tx, &updated.deltas()?, now).await?;
            }

            tracing::info!(id = %id, "transaction updated");
            Ok(updated)
        })
    }

    /// Deletes a transaction. Deletion is allowed at any age.
    ///
    /// With [`BalancePolicy::AppendOnly`] the balance effect the record
    /// produced stays in place; with [`BalancePolicy::Reconcile`] it is
    /// reversed in the same DB transaction.
    pub async fn delete_transaction(&self, id: Uuid) -> ResultEngine<()> {
        let now = self.now();
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            let existing = Transaction::try_from(model)?;

            match self.balance_policy {
                BalancePolicy::Reconcile => {
                    apply_deltas(&db_tx, &existing.reversal_deltas()?, now).await?;
                }
                BalancePolicy::AppendOnly => {
                    tracing::warn!(
                        id = %id,
                        amount_minor = existing.amount_minor,
                        "transaction deleted; account balances keep its effect"
                    );
                }
            }

            transactions::Entity::delete_by_id(id.to_string())
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
