//! Read-side aggregations over ledger records.
//!
//! Every function here is pure: it takes a set of transactions (and a
//! reference instant where relevant) and derives a view without touching
//! storage. Calendar arithmetic is done in UTC.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine, Transaction, TransactionKind};

/// Label used for expenses whose category is blank.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Which slice of the ledger a report covers, relative to a reference instant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportWindow {
    /// Records dated at most 7×24h before the reference instant.
    Weekly,
    /// Same calendar month and year as the reference instant.
    Monthly,
    /// Same calendar year as the reference instant.
    Yearly,
    /// Explicit range, inclusive at both ends.
    Range {
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    },
    All,
}

impl ReportWindow {
    pub fn contains(&self, date: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match *self {
            Self::Weekly => now - date <= TimeDelta::days(7),
            Self::Monthly => date.year() == now.year() && date.month() == now.month(),
            Self::Yearly => date.year() == now.year(),
            Self::Range { from, to } => from <= date && date <= to,
            Self::All => true,
        }
    }
}

/// Keep the records whose effective date falls in `window`, preserving order.
pub fn filter_window<'a, I>(transactions: I, window: ReportWindow, now: DateTime<Utc>) -> Vec<&'a Transaction>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    transactions
        .into_iter()
        .filter(|tx| window.contains(tx.occurred_at, now))
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub income_minor: i64,
    pub expense_minor: i64,
    pub transfer_minor: i64,
    /// `income - expense`.
    pub balance_minor: i64,
    /// Share of income left after expenses, in percent, clamped to `[0, 100]`.
    pub savings_rate: f64,
}

fn add_minor(total: i64, amount_minor: i64, what: &str) -> ResultEngine<i64> {
    total
        .checked_add(amount_minor)
        .ok_or_else(|| EngineError::AmountOverflow(format!("{what} total")))
}

pub fn summary<'a, I>(transactions: I) -> ResultEngine<Summary>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut out = Summary::default();
    for tx in transactions {
        match tx.kind {
            TransactionKind::Income => {
                out.income_minor = add_minor(out.income_minor, tx.amount_minor, "income")?;
            }
            TransactionKind::Expense => {
                out.expense_minor = add_minor(out.expense_minor, tx.amount_minor, "expense")?;
            }
            TransactionKind::Transfer => {
                out.transfer_minor = add_minor(out.transfer_minor, tx.amount_minor, "transfer")?;
            }
        }
    }
    out.balance_minor = out
        .income_minor
        .checked_sub(out.expense_minor)
        .ok_or_else(|| EngineError::AmountOverflow("summary balance".to_string()))?;
    out.savings_rate = if out.income_minor == 0 {
        0.0
    } else {
        (out.balance_minor as f64 * 100.0 / out.income_minor as f64).clamp(0.0, 100.0)
    };
    Ok(out)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryShare {
    pub category: String,
    pub amount_minor: i64,
    /// Share of the total expense amount, in percent.
    pub percent: f64,
}

/// Expense totals per category, largest first.
///
/// Categories with equal totals keep the order in which they were first
/// encountered in `transactions`.
pub fn category_breakdown<'a, I>(transactions: I) -> ResultEngine<Vec<CategoryShare>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut order: Vec<(String, i64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for tx in transactions {
        if tx.kind != TransactionKind::Expense {
            continue;
        }
        let label = match tx.category.trim() {
            "" => FALLBACK_CATEGORY,
            trimmed => trimmed,
        };
        match index.get(label) {
            Some(&pos) => order[pos].1 = add_minor(order[pos].1, tx.amount_minor, label)?,
            None => {
                index.insert(label.to_string(), order.len());
                order.push((label.to_string(), tx.amount_minor));
            }
        }
    }

    let total = order
        .iter()
        .try_fold(0_i64, |total, (_, amount)| add_minor(total, *amount, "expense"))?;
    // `sort_by` is stable, which gives the first-encountered tie-break.
    order.sort_by(|a, b| b.1.cmp(&a.1));

    Ok(order
        .into_iter()
        .map(|(category, amount_minor)| CategoryShare {
            percent: if total == 0 {
                0.0
            } else {
                amount_minor as f64 * 100.0 / total as f64
            },
            category,
            amount_minor,
        })
        .collect())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub income_minor: i64,
    pub expense_minor: i64,
}

/// Income and expense per calendar day of `occurred_at`, oldest first.
pub fn trend<'a, I>(transactions: I) -> ResultEngine<Vec<TrendPoint>>
where
    I: IntoIterator<Item = &'a Transaction>,
{
    let mut days: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
    for tx in transactions {
        let entry = days.entry(tx.occurred_at.date_naive()).or_default();
        match tx.kind {
            TransactionKind::Income => {
                entry.0 = add_minor(entry.0, tx.amount_minor, "daily income")?;
            }
            TransactionKind::Expense => {
                entry.1 = add_minor(entry.1, tx.amount_minor, "daily expense")?;
            }
            TransactionKind::Transfer => {}
        }
    }
    Ok(days
        .into_iter()
        .map(|(date, (income_minor, expense_minor))| TrendPoint {
            date,
            income_minor,
            expense_minor,
        })
        .collect())
}

/// Everything a dashboard needs for one window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    pub categories: Vec<CategoryShare>,
    pub trend: Vec<TrendPoint>,
}

impl Report {
    pub fn build(
        transactions: &[Transaction],
        window: ReportWindow,
        now: DateTime<Utc>,
    ) -> ResultEngine<Self> {
        let filtered = filter_window(transactions, window, now);
        Ok(Self {
            summary: summary(filtered.iter().copied())?,
            categories: category_breakdown(filtered.iter().copied())?,
            trend: trend(filtered.iter().copied())?,
        })
    }
}
