//! News stage: `tbl_news` → `news` plus tags.

use super::convert::{format_date, format_datetime, split_tags};
use super::markdown::convert_markdown;
use super::{Importer, Stage, StageReport, row_total};
use crate::error::{ImportError, ImportResult};
use crate::types::{ContentStatus, LegacyNews, News};
use anyhow::{Context, Result};
use tracing::debug;

pub(crate) fn build_news(news: &LegacyNews) -> ImportResult<News> {
    let status = ContentStatus::from_legacy_news(news.status).ok_or(
        ImportError::UnknownNewsStatus {
            id: news.id,
            status: news.status,
        },
    )?;

    Ok(News {
        id: news.id,
        title: news.title.clone(),
        news_date: format_date(news.news_date)?,
        content: convert_markdown(&news.content),
        status,
        creator_id: news.creator_id,
        created_at: format_datetime(news.create_time)?,
        updater_id: news.updater_id,
        updated_at: format_datetime(news.update_time)?,
        tag_names: split_tags(news.tags.as_deref()),
    })
}

impl Importer {
    /// An unknown status or a failed insert aborts the stage.
    pub fn import_news(&self) -> Result<StageReport> {
        if let Some(report) = self.check_guard(Stage::News)? {
            return Ok(report);
        }
        let mut report = StageReport::new(Stage::News);
        report.total = row_total(self.source.count(Stage::News.source_table())?);
        let mut progress = self.console.progress("Importing news...", report.total);

        for row in self.source.news(self.options.batch_size) {
            let row = row?;
            let news = LegacyNews::try_from(&row)
                .with_context(|| format!("invalid legacy news {:?}", row.id()))?;
            let item = build_news(&news)
                .with_context(|| format!("invalid legacy news #{}", news.id))?;
            self.site.insert_news(&item)?;
            debug!(id = item.id, status = ?item.status, tags = item.tag_names.len(), "Imported news");
            report.imported += 1;
            progress.inc();
        }

        progress.finish();
        self.console.summary(&report);
        Ok(report)
    }
}
