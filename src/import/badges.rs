//! Badge definitions, awarded badges and the pending award queue.
//!
//! These are straight table copies. Any failed row aborts the stage.

use super::convert::format_epoch_columns;
use super::{Importer, Stage, StageReport, row_total};
use crate::db::Record;
use anyhow::{Context, Result};
use tracing::debug;

impl Importer {
    pub fn import_badges(&self) -> Result<StageReport> {
        if let Some(report) = self.check_guard(Stage::Badges)? {
            return Ok(report);
        }
        self.copy_table(Stage::Badges, "badges", "Importing badges...", Ok)
    }

    /// Awarded badges. Runs after `badges` and has no guard of its own.
    pub fn import_user_badges(&self) -> Result<StageReport> {
        self.copy_table(
            Stage::UserBadges,
            "user_badges",
            "Importing user badges...",
            |record| Ok(format_epoch_columns(record, &["create_time", "complete_time"])?),
        )
    }

    /// Pending badge awards.
    pub fn import_badge_queue(&self) -> Result<StageReport> {
        self.copy_table(Stage::BadgeQueue, "badge_queue", "Importing badge queue...", Ok)
    }

    fn copy_table<F>(
        &self,
        stage: Stage,
        destination: &str,
        label: &str,
        convert: F,
    ) -> Result<StageReport>
    where
        F: Fn(Record) -> Result<Record>,
    {
        let mut report = StageReport::new(stage);
        report.total = row_total(self.source.count(stage.source_table())?);
        let mut progress = self.console.progress(label, report.total);

        for record in self.source.records(stage.source_table(), self.options.batch_size)? {
            let record = record?;
            let id = record.id();
            let record = convert(record)
                .with_context(|| format!("invalid {} row {:?}", stage.source_table(), id))?;
            self.site.insert_record(destination, &record)?;
            debug!(stage = %stage, ?id, "Copied row");
            report.imported += 1;
            progress.inc();
        }

        progress.finish();
        self.console.summary(&report);
        Ok(report)
    }
}
