//! Comments stage: `tbl_comment` → `comment`.

use super::convert::{comment_text, convert_comment_type, format_datetime};
use super::{Importer, Stage, StageReport, row_total};
use crate::types::{Comment, CommentStatus, LegacyComment};
use anyhow::Result;
use tracing::debug;

pub(crate) fn build_comment(comment: &LegacyComment) -> Result<Comment> {
    Ok(Comment {
        id: comment.id,
        user_id: comment.creator_id,
        object_type: convert_comment_type(&comment.object_type),
        object_id: comment.object_id,
        text: comment_text(comment.title.as_deref(), &comment.content),
        created_at: format_datetime(comment.create_time)?,
        updated_at: format_datetime(comment.update_time)?,
        total_votes: comment.total_votes,
        up_votes: comment.up_votes,
        rating: comment.rating,
        status: CommentStatus::from_legacy(comment.status),
    })
}

impl Importer {
    /// Failed comments are counted and logged at debug level.
    pub fn import_comments(&self) -> Result<StageReport> {
        if let Some(report) = self.check_guard(Stage::Comments)? {
            return Ok(report);
        }
        let mut report = StageReport::new(Stage::Comments);
        report.total = row_total(self.source.count(Stage::Comments.source_table())?);
        let mut progress = self.console.progress("Importing comments...", report.total);

        for row in self.source.comments(self.options.batch_size) {
            let row = row?;
            let result = LegacyComment::try_from(&row)
                .map_err(anyhow::Error::from)
                .and_then(|comment| build_comment(&comment))
                .and_then(|comment| self.site.insert_comment(&comment));
            match result {
                Ok(()) => report.imported += 1,
                Err(err) => {
                    debug!(id = row.id(), "Failed to import comment: {:#}", err);
                    report.record_error(row.id(), &err);
                }
            }
            progress.inc();
        }

        progress.finish();
        self.console.summary(&report);
        Ok(report)
    }
}
