//! Mutability rules for existing ledger records.
//!
//! Updates are time-boxed by an [`EditWindow`] measured from a record's
//! `created_at`. Deletes are never time-boxed. Whether updates and deletes
//! touch account balances is decided by the [`BalancePolicy`].

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

pub const DEFAULT_EDIT_WINDOW_HOURS: i64 = 12;

/// Mutability state of a transaction. The transition `Editable -> Locked` is
/// driven by time only and never goes back.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mutability {
    Editable,
    Locked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EditWindow {
    length: TimeDelta,
}

impl Default for EditWindow {
    fn default() -> Self {
        Self::new(TimeDelta::hours(DEFAULT_EDIT_WINDOW_HOURS))
    }
}

impl EditWindow {
    pub fn new(length: TimeDelta) -> Self {
        Self { length }
    }

    /// A window of `hours` hours, or `None` when `hours` is negative or too
    /// large to be represented.
    pub fn try_hours(hours: i64) -> Option<Self> {
        if hours < 0 {
            return None;
        }
        TimeDelta::try_hours(hours).map(Self::new)
    }

    pub fn length(&self) -> TimeDelta {
        self.length
    }

    /// `Editable` while `now - created_at <= length`, `Locked` afterwards.
    pub fn state(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> Mutability {
        if now - created_at <= self.length {
            Mutability::Editable
        } else {
            Mutability::Locked
        }
    }

    pub fn ensure_editable(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> ResultEngine<()> {
        match self.state(created_at, now) {
            Mutability::Editable => Ok(()),
            Mutability::Locked => Err(EngineError::EditWindowExpired {
                age_minutes: (now - created_at).num_minutes(),
                limit_minutes: self.length.num_minutes(),
            }),
        }
    }
}

/// How updates and deletes of existing records relate to account balances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BalancePolicy {
    /// Balances only move when a transaction is added. Updating or deleting a
    /// record leaves the balance effect it already produced in place.
    #[default]
    AppendOnly,
    /// Deleting a record reverses its effect; updating a record reverses the
    /// old effect and applies the new one.
    Reconcile,
}
