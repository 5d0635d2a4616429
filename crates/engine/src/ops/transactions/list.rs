use chrono::{DateTime, Utc};
use uuid::Uuid;

use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};

use crate::{
    Division, EngineError, Mutability, ResultEngine, Transaction, TransactionKind, transactions,
};

use super::super::{Engine, with_tx};

/// Filters for listing transactions.
///
/// `from` and `to` are both inclusive, in UTC, and apply to `occurred_at`.
#[derive(Clone, Debug, Default)]
pub struct TransactionListFilter {
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
    pub kind: Option<TransactionKind>,
    pub division: Option<Division>,
    pub category: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl TransactionListFilter {
    /// Returns `true` if `tx` passes every criterion of the filter.
    pub fn matches(&self, tx: &Transaction) -> bool {
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            tx.description
                .to_lowercase()
                .contains(&needle.trim().to_lowercase())
        });
        search_ok
            && self.kind.is_none_or(|kind| tx.kind == kind)
            && self.division.is_none_or(|division| tx.division == division)
            && self
                .category
                .as_deref()
                .is_none_or(|category| tx.category == category)
            && self.from.is_none_or(|from| tx.occurred_at >= from)
            && self.to.is_none_or(|to| tx.occurred_at <= to)
    }
}

fn validate_list_filter(filter: &TransactionListFilter) -> ResultEngine<()> {
    if let (Some(from), Some(to)) = (filter.from, filter.to)
        && from > to
    {
        return Err(EngineError::Validation(
            "invalid range: from must be <= to".to_string(),
        ));
    }
    Ok(())
}

trait ApplyTxFilters: QueryFilter + Sized {
    fn apply_tx_filters(self, filter: &TransactionListFilter) -> Self;
}

impl<T> ApplyTxFilters for T
where
    T: QueryFilter + Sized,
{
    fn apply_tx_filters(mut self, filter: &TransactionListFilter) -> Self {
        if let Some(kind) = filter.kind {
            self = self.filter(transactions::Column::Kind.eq(kind.as_str()));
        }
        if let Some(division) = filter.division {
            self = self.filter(transactions::Column::Division.eq(division.as_str()));
        }
        if let Some(category) = filter.category.as_deref() {
            self = self.filter(transactions::Column::Category.eq(category));
        }
        if let Some(from) = filter.from {
            self = self.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            self = self.filter(transactions::Column::OccurredAt.lte(to));
        }

        self
    }
}

impl Engine {
    /// Lists every transaction, newest first.
    pub async fn transactions(&self) -> ResultEngine<Vec<Transaction>> {
        self.list_transactions(&TransactionListFilter::default())
            .await
    }

    /// Lists the transactions matching `filter`, newest first.
    ///
    /// Ordering is `(occurred_at DESC, created_at DESC, id DESC)`.
    pub async fn list_transactions(
        &self,
        filter: &TransactionListFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        validate_list_filter(filter)?;
        with_tx!(self, |db_tx| {
            let rows: Vec<transactions::Model> = transactions::Entity::find()
                .apply_tx_filters(filter)
                .order_by_desc(transactions::Column::OccurredAt)
                .order_by_desc(transactions::Column::CreatedAt)
                .order_by_desc(transactions::Column::Id)
                .all(&db_tx)
                .await?;

            let mut out: Vec<Transaction> = Vec::with_capacity(rows.len());
            for model in rows {
                let tx = Transaction::try_from(model)?;
                if filter.matches(&tx) {
                    out.push(tx);
                }
            }
            Ok(out)
        })
    }

    /// Returns a single transaction.
    pub async fn transaction(&self, id: Uuid) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let model = transactions::Entity::find_by_id(id.to_string())
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
            Transaction::try_from(model)
        })
    }

    /// Whether the transaction can still be updated right now.
    pub async fn transaction_mutability(&self, id: Uuid) -> ResultEngine<Mutability> {
        let tx = self.transaction(id).await?;
        Ok(self.edit_window.state(tx.created_at, self.now()))
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::NewTransactionCmd;

    fn sample() -> Transaction {
        let at = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        Transaction::create(
            NewTransactionCmd::expense("Cash", 120, "Coffee beans", "Food")
                .division(Division::Office),
            at,
        )
        .unwrap()
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(TransactionListFilter::default().matches(&sample()));
    }

    #[test]
    fn search_is_case_insensitive() {
        let filter = TransactionListFilter {
            search: Some("BEANS".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&sample()));

        let filter = TransactionListFilter {
            search: Some("tea".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&sample()));
    }

    #[test]
    fn criteria_are_combined() {
        let filter = TransactionListFilter {
            kind: Some(TransactionKind::Expense),
            division: Some(Division::Personal),
            ..Default::default()
        };
        assert!(!filter.matches(&sample()));
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let tx = sample();
        let filter = TransactionListFilter {
            from: Some(tx.occurred_at),
            to: Some(tx.occurred_at),
            ..Default::default()
        };
        assert!(filter.matches(&tx));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let tx = sample();
        let filter = TransactionListFilter {
            from: Some(tx.occurred_at),
            to: Some(tx.occurred_at - chrono::TimeDelta::seconds(1)),
            ..Default::default()
        };
        assert!(matches!(
            validate_list_filter(&filter),
            Err(EngineError::Validation(_))
        ));
    }
}
