//! Legacy Importer
//!
//! One-shot migration of users, badges, wiki pages, news, comments,
//! ratings and stars from the legacy forum/wiki database into the site
//! database.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod format;
pub mod import;
pub mod logging;
pub mod progress;
pub mod types;

pub use config::Config;
pub use db::{Database, LegacyDb, SiteDb};
pub use error::{ImportError, ImportResult};
pub use import::{ImportOptions, ImportOutcome, ImportReport, Importer, Stage, StageReport};
