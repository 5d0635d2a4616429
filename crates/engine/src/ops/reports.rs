use chrono::{DateTime, Utc};

use crate::{Report, ReportWindow, ResultEngine};

use super::Engine;

impl Engine {
    /// Builds the report for `window` relative to `now` from the current
    /// ledger contents.
    ///
    /// Nothing is cached; concurrent writes may or may not be reflected.
    pub async fn report(&self, window: ReportWindow, now: DateTime<Utc>) -> ResultEngine<Report> {
        let ledger = self.transactions().await?;
        Report::build(&ledger, window, now)
    }
}
