//! Legacy content import pipeline.
//!
//! Copies content from the legacy forum/wiki schema into the site schema in
//! a fixed order of stages:
//! users → badges (→ user badges) → wiki → news → comments → stars → ratings.
//!
//! Each stage checks its destination table first and is skipped entirely if
//! the table already has rows. This is a row-count check, not a ledger: a
//! stage that failed halfway leaves rows behind and is skipped on the next
//! run even though it is incomplete.

mod badges;
mod comments;
pub mod convert;
pub mod markdown;
mod news;
mod ratings;
mod users;
mod wiki;

use crate::config::{ImportConfig, MissingCrossReference};
use crate::db::{LegacyDb, SiteDb};
use crate::progress::Console;
use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

pub use convert::{format_date, format_datetime, split_tags};
pub use markdown::convert_markdown;

/// One table-to-table import step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Users,
    Badges,
    UserBadges,
    BadgeQueue,
    Wiki,
    News,
    Comments,
    Stars,
    Ratings,
}

impl Stage {
    /// Stages started directly by a full run. User badges and the badge
    /// queue follow the badges stage.
    pub const PIPELINE: [Stage; 7] = [
        Stage::Users,
        Stage::Badges,
        Stage::Wiki,
        Stage::News,
        Stage::Comments,
        Stage::Stars,
        Stage::Ratings,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Users => "users",
            Stage::Badges => "badges",
            Stage::UserBadges => "user_badges",
            Stage::BadgeQueue => "badge_queue",
            Stage::Wiki => "wiki",
            Stage::News => "news",
            Stage::Comments => "comments",
            Stage::Stars => "stars",
            Stage::Ratings => "ratings",
        }
    }

    /// Legacy table the stage reads its main rows from.
    pub fn source_table(self) -> &'static str {
        match self {
            Stage::Users => "ipb_members",
            Stage::Badges => "tbl_badge",
            Stage::UserBadges => "tbl_user_badge",
            Stage::BadgeQueue => "tbl_badge_queue",
            Stage::Wiki => "tbl_wiki",
            Stage::News => "tbl_news",
            Stage::Comments => "tbl_comment",
            Stage::Stars => "tbl_star",
            Stage::Ratings => "tbl_rating",
        }
    }

    /// Site tables whose rows make the stage skip. Empty for stages that
    /// always run.
    pub fn guard_tables(self) -> &'static [&'static str] {
        match self {
            Stage::Users => &["user"],
            Stage::Badges => &["badges"],
            Stage::UserBadges | Stage::BadgeQueue => &[],
            Stage::Wiki => &["wiki", "wiki_categories"],
            Stage::News => &["news"],
            Stage::Comments => &["comment"],
            Stage::Stars => &["star"],
            Stage::Ratings => &["rating"],
        }
    }

    /// Capitalized label for console lines.
    fn label(self) -> &'static str {
        match self {
            Stage::Users => "Users",
            Stage::Badges => "Badges",
            Stage::UserBadges => "User badges",
            Stage::BadgeQueue => "Badge queue",
            Stage::Wiki => "Wiki",
            Stage::News => "News",
            Stage::Comments => "Comment",
            Stage::Stars => "Star",
            Stage::Ratings => "Rating",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a stage ran or was short-circuited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StageOutcome {
    Imported,
    /// Destination already populated.
    Skipped,
}

/// Why a single legacy record was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    NoCrossReference,
    NameMismatch,
    DuplicateUsername,
    DuplicateEmail,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRecord {
    pub id: i64,
    pub reason: SkipReason,
    pub detail: String,
}

/// A record that failed to import.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub message: String,
}

/// Summary of one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub outcome: StageOutcome,
    /// Rows the source query returned.
    pub total: u64,
    /// Rows written to the destination.
    pub imported: u64,
    pub skipped: Vec<SkippedRecord>,
    pub errors: Vec<RecordError>,
    /// Logged conditions that did not prevent the import.
    pub warnings: Vec<String>,
}

impl StageReport {
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            outcome: StageOutcome::Imported,
            total: 0,
            imported: 0,
            skipped: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.outcome == StageOutcome::Skipped
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub(crate) fn record_error(&mut self, id: Option<i64>, err: &anyhow::Error) {
        self.errors.push(RecordError {
            id,
            message: format!("{:#}", err),
        });
    }
}

/// Summary of a whole run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub stages: Vec<StageReport>,
}

impl ImportReport {
    pub fn stage(&self, stage: Stage) -> Option<&StageReport> {
        self.stages.iter().find(|report| report.stage == stage)
    }

    pub fn total_imported(&self) -> u64 {
        self.stages.iter().map(|report| report.imported).sum()
    }

    pub fn total_errors(&self) -> usize {
        self.stages.iter().map(StageReport::error_count).sum()
    }
}

/// Result of `run_import`.
#[derive(Debug)]
pub enum ImportOutcome {
    /// The operator declined the confirmation.
    Declined,
    Completed(ImportReport),
}

impl ImportOutcome {
    /// Process exit code: 1 when declined, 0 otherwise. Record errors do
    /// not change it.
    pub fn exit_code(&self) -> u8 {
        match self {
            ImportOutcome::Declined => 1,
            ImportOutcome::Completed(_) => 0,
        }
    }
}

/// Pipeline settings.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub batch_size: usize,
    pub badge_queue: bool,
    pub missing_cross_reference: MissingCrossReference,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for ImportOptions {
    fn from(config: &ImportConfig) -> Self {
        Self {
            batch_size: config.batch_size.max(1),
            badge_queue: config.badge_queue,
            missing_cross_reference: config.missing_cross_reference,
        }
    }
}

/// Per-stage dry-run information.
#[derive(Debug, Clone, Serialize)]
pub struct StagePreview {
    pub stage: Stage,
    pub source_rows: i64,
    pub destination_populated: bool,
}

/// Runs the import stages against a legacy source and a site destination.
///
/// Both connections are owned by the importer and closed when it is
/// dropped.
pub struct Importer {
    source: LegacyDb,
    site: SiteDb,
    options: ImportOptions,
    console: Console,
}

impl Importer {
    pub fn new(source: LegacyDb, site: SiteDb, options: ImportOptions) -> Self {
        Self {
            source,
            site,
            options,
            console: Console::quiet(),
        }
    }

    /// Print progress bars and stage summaries on stderr.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    pub fn site(&self) -> &SiteDb {
        &self.site
    }

    /// Run every stage in order. Returns `Declined` without touching either
    /// database if `confirmed` is false.
    pub fn run_import(&self, confirmed: bool) -> Result<ImportOutcome> {
        if !confirmed {
            info!("Import declined by operator");
            return Ok(ImportOutcome::Declined);
        }
        self.run_stages(&Stage::PIPELINE)
            .map(ImportOutcome::Completed)
    }

    /// Run the given stages in the given order.
    pub fn run_stages(&self, stages: &[Stage]) -> Result<ImportReport> {
        let mut report = ImportReport::default();
        for &stage in stages {
            self.run_stage(stage, &mut report)?;
        }
        info!(
            imported = report.total_imported(),
            errors = report.total_errors(),
            "Import finished"
        );
        Ok(report)
    }

    /// Run a single stage, appending its report(s).
    ///
    /// The badges stage chains into the badge queue (when enabled) and user
    /// badges unless it was skipped. A stage already present in `report`
    /// is not run again, so `badges` followed by `user-badges` copies user
    /// badges once.
    pub fn run_stage(&self, stage: Stage, report: &mut ImportReport) -> Result<()> {
        if report.stage(stage).is_some() {
            debug!(stage = %stage, "Stage already ran, not repeating it");
            return Ok(());
        }
        let stage_report = match stage {
            Stage::Users => self.import_users()?,
            Stage::Badges => self.import_badges()?,
            Stage::UserBadges => self.import_user_badges()?,
            Stage::BadgeQueue => self.import_badge_queue()?,
            Stage::Wiki => self.import_wiki()?,
            Stage::News => self.import_news()?,
            Stage::Comments => self.import_comments()?,
            Stage::Stars => self.import_stars()?,
            Stage::Ratings => self.import_ratings()?,
        };
        let skipped = stage_report.is_skipped();
        report.stages.push(stage_report);

        if !skipped {
            for next in self.chained(stage) {
                self.run_stage(next, report)?;
            }
        }
        Ok(())
    }

    /// Stages that follow `stage` whenever it is not skipped.
    fn chained(&self, stage: Stage) -> Vec<Stage> {
        match stage {
            Stage::Badges if self.options.badge_queue => vec![Stage::BadgeQueue, Stage::UserBadges],
            Stage::Badges => vec![Stage::UserBadges],
            _ => Vec::new(),
        }
    }

    /// Report what a run would do without writing anything. Chained stages
    /// are listed after the stage that triggers them.
    pub fn preview(&self, stages: &[Stage]) -> Result<Vec<StagePreview>> {
        let mut previews = Vec::new();
        for &stage in stages {
            self.preview_stage(stage, &mut previews)?;
        }
        Ok(previews)
    }

    fn preview_stage(&self, stage: Stage, previews: &mut Vec<StagePreview>) -> Result<()> {
        if previews.iter().any(|preview| preview.stage == stage) {
            return Ok(());
        }
        let source_rows = match stage {
            Stage::Users => self.source.count_members()?,
            _ => self.source.count(stage.source_table())?,
        };
        let mut destination_populated = false;
        for table in stage.guard_tables() {
            destination_populated |= self.site.is_populated(table)?;
        }
        previews.push(StagePreview {
            stage,
            source_rows,
            destination_populated,
        });

        if !destination_populated {
            for next in self.chained(stage) {
                self.preview_stage(next, previews)?;
            }
        }
        Ok(())
    }

    /// Returns a skipped report when any guard table has rows.
    fn check_guard(&self, stage: Stage) -> Result<Option<StageReport>> {
        for table in stage.guard_tables() {
            if self.site.is_populated(table)? {
                info!(stage = %stage, table = %self.site.table(table), "Destination already populated, skipping stage");
                self.console
                    .line(&format!("{} table is already populated, skipping.", stage.label()));
                let mut report = StageReport::new(stage);
                report.outcome = StageOutcome::Skipped;
                return Ok(Some(report));
            }
        }
        Ok(None)
    }
}

/// Convert a source row count into the report's unsigned total.
fn row_total(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}
