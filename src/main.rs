//! Legacy Importer
//!
//! Copies the legacy forum/wiki database into the site database.

use anyhow::Result;
use clap::Parser;
use legacy_importer::cli::import::{ImportArgs, confirm};
use legacy_importer::cli::{Cli, Command};
use legacy_importer::config::Config;
use legacy_importer::db::{LegacyDb, SiteDb};
use legacy_importer::format::{format_preview, format_report};
use legacy_importer::import::{ImportOptions, ImportOutcome, Importer, Stage};
use legacy_importer::logging;
use legacy_importer::progress::Console;
use std::process::ExitCode;
use tracing::info;

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init(&cli.log, cli.verbose)?;

    let mut config = Config::resolve(cli.config.as_deref())?;
    cli.apply_to(&mut config);

    match cli.command() {
        Command::Import(args) => {
            args.apply_to(&mut config);
            run_import(&config, &args)
        }
    }
}

fn run_import(config: &Config, args: &ImportArgs) -> Result<ExitCode> {
    info!(
        source = %config.source.path.display(),
        destination = %config.destination.path.display(),
        "Opening databases"
    );
    let source = LegacyDb::open(&config.source.path, config.source.password.as_deref())?;
    let site = SiteDb::open(&config.destination.path, &config.destination.table_prefix)?;
    let importer = Importer::new(source, site, ImportOptions::from(&config.import))
        .with_console(Console::stderr());

    if args.dry_run {
        let stages = args.stages().unwrap_or(&Stage::PIPELINE[..]);
        let previews = importer.preview(stages)?;
        print!("{}", format_preview(&previews, args.format)?);
        return Ok(ExitCode::SUCCESS);
    }

    let confirmed = args.yes
        || confirm(config, &mut std::io::stdin().lock(), &mut std::io::stdout())?;

    let outcome = match args.stages() {
        None => importer.run_import(confirmed)?,
        Some(stages) if confirmed => ImportOutcome::Completed(importer.run_stages(stages)?),
        Some(_) => ImportOutcome::Declined,
    };

    match &outcome {
        ImportOutcome::Declined => println!("Import cancelled."),
        ImportOutcome::Completed(report) => print!("{}", format_report(report, args.format)?),
    }
    Ok(ExitCode::from(outcome.exit_code()))
}
