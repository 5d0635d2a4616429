use sea_orm::{Condition, QueryFilter, QueryOrder, SqlErr, TransactionTrait, prelude::*};

use crate::{
    Account, EngineError, MAX_BALANCE_MINOR, ResultEngine, Transaction, accounts, transactions,
    util::normalize_required_text,
};

use super::{Engine, with_tx};

impl Engine {
    /// Creates an account with an opening balance.
    ///
    /// Names are unique: creating an existing name fails with
    /// [`EngineError::ExistingKey`], also when two creates race.
    pub async fn new_account(&self, name: &str, balance_minor: i64) -> ResultEngine<Account> {
        let name = normalize_required_text(name, "account name")?;
        if balance_minor.checked_abs().is_none_or(|abs| abs > MAX_BALANCE_MINOR) {
            return Err(EngineError::Validation(format!(
                "balance_minor must be within +/-{MAX_BALANCE_MINOR}"
            )));
        }
        let account = Account::new(name, balance_minor, self.now());
        with_tx!(self, |db_tx| {
            accounts::ActiveModel::from(&account)
                .insert(&db_tx)
                .await
                .map_err(|err| match err.sql_err() {
                    Some(SqlErr::UniqueConstraintViolation(_)) => {
                        EngineError::ExistingKey(account.name.clone())
                    }
                    _ => EngineError::Database(err),
                })?;
            tracing::info!(account = %account.name, balance_minor, "account created");
            Ok(account)
        })
    }

    /// Returns every account, newest first.
    pub async fn accounts(&self) -> ResultEngine<Vec<Account>> {
        with_tx!(self, |db_tx| {
            let models = accounts::Entity::find()
                .order_by_desc(accounts::Column::CreatedAt)
                .order_by_asc(accounts::Column::Name)
                .all(&db_tx)
                .await?;
            Ok(models.into_iter().map(Account::from).collect())
        })
    }

    /// Return an account snapshot from DB.
    pub async fn account(&self, name: &str) -> ResultEngine<Account> {
        with_tx!(self, |db_tx| {
            let model = accounts::Entity::find_by_id(name.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("account not exists".to_string()))?;
            Ok(Account::from(model))
        })
    }

    /// Lists the transactions where `name` is the source or the transfer
    /// destination, newest first.
    ///
    /// An unknown name yields an empty history.
    pub async fn account_history(&self, name: &str) -> ResultEngine<Vec<Transaction>> {
        with_tx!(self, |db_tx| {
            let models = transactions::Entity::find()
                .filter(
                    Condition::any()
                        .add(transactions::Column::AccountFrom.eq(name))
                        .add(transactions::Column::AccountTo.eq(name)),
                )
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;
            models
                .into_iter()
                .map(Transaction::try_from)
                .collect::<ResultEngine<Vec<_>>>()
        })
    }
}
