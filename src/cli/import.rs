//! Import subcommand
//!
//! Copies legacy content into the site database, stage by stage.

use crate::config::Config;
use crate::format::OutputFormat;
use crate::import::Stage;
use anyhow::Result;
use clap::Args;
use std::io::{BufRead, Write};

/// Arguments for the import subcommand
#[derive(Args, Debug, Default)]
pub struct ImportArgs {
    /// Password for an encrypted legacy database (overrides config)
    #[arg(long)]
    pub password: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,

    /// Report what would be imported without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Run only these stages, in the order given
    ///
    /// Repeatable. Without it every stage runs in pipeline order.
    #[arg(long, value_enum)]
    pub stage: Vec<Stage>,

    /// Also copy pending badge awards after the badges stage
    #[arg(long)]
    pub with_badge_queue: bool,

    /// Output format for the final report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

impl ImportArgs {
    /// Stages to run, `None` for the full pipeline.
    pub fn stages(&self) -> Option<&[Stage]> {
        if self.stage.is_empty() {
            None
        } else {
            Some(&self.stage)
        }
    }

    /// Apply the flag overrides to the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(password) = &self.password {
            config.source.password = Some(password.clone());
        }
        if self.with_badge_queue {
            config.import.badge_queue = true;
        }
    }
}

/// Ask the operator before touching the site database. Anything but `y`
/// declines.
pub fn confirm<R: BufRead, W: Write>(config: &Config, input: &mut R, output: &mut W) -> Result<bool> {
    writeln!(
        output,
        "This will import data from '{}' into '{}'.",
        config.source.path.display(),
        config.destination.path.display()
    )?;
    write!(output, "Continue? [y/N] ")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}
