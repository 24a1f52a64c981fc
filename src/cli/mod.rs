//! CLI command definitions for legacy-importer
//!
//! The main entry point is the `Cli` struct. Global options select the
//! configuration, the two databases and logging; `import` is the only
//! subcommand and runs when none is given.

pub mod import;

use crate::config::Config;
use clap::{Parser, Subcommand};
use import::ImportArgs;
use std::path::PathBuf;

/// Legacy forum/wiki to site database importer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the legacy database (overrides config)
    #[arg(short, long, global = true)]
    pub source: Option<PathBuf>,

    /// Path to the site database (overrides config)
    #[arg(short, long, global = true)]
    pub destination: Option<PathBuf>,

    /// Prefix for site table names (overrides config)
    #[arg(long, global = true)]
    pub table_prefix: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Cli {
    /// Apply the global path overrides.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(source) = &self.source {
            config.source.path = source.clone();
        }
        if let Some(destination) = &self.destination {
            config.destination.path = destination.clone();
        }
        if let Some(prefix) = &self.table_prefix {
            config.destination.table_prefix = prefix.clone();
        }
    }

    /// The subcommand, defaulting to a plain `import`.
    pub fn command(self) -> Command {
        self.command
            .unwrap_or_else(|| Command::Import(ImportArgs::default()))
    }
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import legacy content into the site database (default)
    Import(ImportArgs),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_defaults_to_import() {
        let cli = Cli::parse_from(["legacy-importer", "--source", "old.db"]);
        assert_eq!(cli.log, "2");
        match cli.command() {
            Command::Import(args) => {
                assert!(!args.yes);
                assert!(args.stage.is_empty());
            }
        }
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::parse_from([
            "legacy-importer",
            "import",
            "--destination",
            "new.db",
            "--table-prefix",
            "yii_",
        ]);
        let mut config = Config::default();
        cli.apply_to(&mut config);
        assert_eq!(config.source.path, PathBuf::from("legacy.db"));
        assert_eq!(config.destination.path, PathBuf::from("new.db"));
        assert_eq!(config.destination.table_prefix, "yii_");
    }

    #[test]
    fn test_import_flags() {
        let cli = Cli::parse_from([
            "legacy-importer",
            "import",
            "--format",
            "json",
            "--stage",
            "badges",
            "--stage",
            "user-badges",
        ]);
        match cli.command() {
            Command::Import(args) => {
                assert_eq!(args.format, crate::format::OutputFormat::Json);
                assert_eq!(args.stage, vec![crate::import::Stage::Badges, crate::import::Stage::UserBadges]);
            }
        }
        assert!(Cli::try_parse_from(["legacy-importer", "import", "--format", "yaml"]).is_err());
    }
}
