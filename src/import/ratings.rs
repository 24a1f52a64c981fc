//! Ratings and stars: copied rows with `create_time` turned into
//! `created_at`.

use super::convert::convert_create_time;
use super::{Importer, Stage, StageReport, row_total};
use anyhow::Result;
use tracing::error;

impl Importer {
    pub fn import_ratings(&self) -> Result<StageReport> {
        self.import_timestamped(Stage::Ratings, "rating", "Importing ratings...")
    }

    pub fn import_stars(&self) -> Result<StageReport> {
        self.import_timestamped(Stage::Stars, "star", "Importing stars...")
    }

    /// Failed rows are logged and counted; the stage keeps going.
    fn import_timestamped(
        &self,
        stage: Stage,
        destination: &str,
        label: &str,
    ) -> Result<StageReport> {
        if let Some(report) = self.check_guard(stage)? {
            return Ok(report);
        }
        let mut report = StageReport::new(stage);
        report.total = row_total(self.source.count(stage.source_table())?);
        let mut progress = self.console.progress(label, report.total);

        for record in self.source.records(stage.source_table(), self.options.batch_size)? {
            let record = record?;
            let id = record.id();
            let result = convert_create_time(record)
                .map_err(anyhow::Error::from)
                .and_then(|record| self.site.insert_record(destination, &record));
            match result {
                Ok(()) => report.imported += 1,
                Err(err) => {
                    error!(stage = %stage, ?id, "Failed to import row: {:#}", err);
                    report.record_error(id, &err);
                }
            }
            progress.inc();
        }

        progress.finish();
        self.console.summary(&report);
        Ok(report)
    }
}
