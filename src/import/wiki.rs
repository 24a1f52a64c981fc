//! Wiki stage: categories, pages, their tags and full revision history.

use super::convert::{format_datetime, split_tags};
use super::markdown::convert_markdown;
use super::{Importer, Stage, StageReport, row_total};
use crate::db::Record;
use crate::types::{LegacyWikiPage, LegacyWikiRevision, Wiki, WikiCategory, WikiRevision};
use anyhow::Result;
use tracing::{debug, error, info};

pub(crate) fn build_wiki(page: &LegacyWikiPage) -> Result<Wiki> {
    Ok(Wiki {
        id: page.id,
        title: page.title.clone(),
        content: convert_markdown(&page.content),
        category_id: page.category_id,
        tag_names: split_tags(page.tags.as_deref()),
        creator_id: page.creator_id,
        updater_id: page.updater_id,
        created_at: format_datetime(page.create_time)?,
        updated_at: format_datetime(page.update_time)?,
        yii_version: page.yii_version.clone(),
        total_votes: page.total_votes,
        up_votes: page.up_votes,
        rating: page.rating,
        view_count: page.view_count,
        comment_count: page.comment_count,
        status: page.status,
        featured: page.featured,
    })
}

pub(crate) fn build_revision(revision: &LegacyWikiRevision) -> Result<WikiRevision> {
    Ok(WikiRevision {
        wiki_id: revision.wiki_id,
        revision: revision.revision,
        title: revision.title.clone(),
        content: convert_markdown(&revision.content),
        tag_names: split_tags(revision.tags.as_deref()),
        category_id: revision.category_id,
        memo: revision.memo.clone().unwrap_or_default(),
        updater_id: revision.updater_id,
        updated_at: format_datetime(revision.update_time)?,
    })
}

impl Importer {
    /// Import categories, then every page with its revisions.
    ///
    /// A page is the failure boundary: if the page or any of its revisions
    /// fails, one error is counted and the next page is imported. Rows
    /// written before the failure stay.
    pub fn import_wiki(&self) -> Result<StageReport> {
        if let Some(report) = self.check_guard(Stage::Wiki)? {
            return Ok(report);
        }
        let mut report = StageReport::new(Stage::Wiki);

        let categories = self.source.wiki_categories()?;
        for category in &categories {
            self.site.insert_wiki_category(&WikiCategory {
                id: category.code,
                name: category.name.clone(),
                sequence: category.sequence,
            })?;
        }
        info!(count = categories.len(), "Imported wiki categories");

        report.total = row_total(self.source.count(Stage::Wiki.source_table())?);
        let mut progress = self.console.progress("Importing wiki...", report.total);

        for row in self.source.wiki_pages(self.options.batch_size) {
            let row = row?;
            match self.import_wiki_page(&row) {
                Ok(revisions) => {
                    debug!(id = row.id(), revisions, "Imported wiki page");
                    report.imported += 1;
                }
                Err(err) => {
                    error!(id = row.id(), "Failed to import wiki page: {:#}", err);
                    report.record_error(row.id(), &err);
                }
            }
            progress.inc();
        }

        progress.finish();
        self.console.summary(&report);
        Ok(report)
    }

    /// Returns the number of revisions written.
    fn import_wiki_page(&self, row: &Record) -> Result<usize> {
        let page = LegacyWikiPage::try_from(row)?;
        let wiki = build_wiki(&page)?;
        self.site.insert_wiki(&wiki)?;

        let removed = self.site.delete_wiki_revisions(page.id)?;
        if removed > 0 {
            debug!(id = page.id, removed, "Cleared stale wiki revisions");
        }

        let revisions = self.source.wiki_revisions(page.id)?;
        for revision in &revisions {
            let revision = LegacyWikiRevision::try_from(revision)?;
            self.site.insert_wiki_revision(&build_revision(&revision)?)?;
        }
        Ok(revisions.len())
    }
}
