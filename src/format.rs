//! Output formatting for import reports: plain text or JSON.

use crate::import::{ImportReport, StagePreview, StageReport};
use clap::ValueEnum;
use colored::Colorize;

/// Output format for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// The line printed when a stage finishes.
pub fn stage_summary_line(report: &StageReport) -> String {
    let mut line = format!(
        "{} {} records imported.",
        "done.".green().bold(),
        report.imported
    );
    if !report.skipped.is_empty() {
        line.push_str(&format!(" {} records skipped.", report.skipped.len()));
    }
    if report.error_count() > 0 {
        line.push_str(&format!(
            " {}",
            format!("{} errors occurred.", report.error_count()).red().bold()
        ));
    }
    line
}

/// Render the whole run.
pub fn format_report(report: &ImportReport, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => Ok(format_report_text(report)),
    }
}

fn format_report_text(report: &ImportReport) -> String {
    let mut out = String::new();
    out.push_str("Import complete:\n");
    for stage in &report.stages {
        if stage.is_skipped() {
            out.push_str(&format!("  {}: skipped (already populated)\n", stage.stage));
            continue;
        }
        out.push_str(&format!(
            "  {}: {} of {} imported",
            stage.stage, stage.imported, stage.total
        ));
        if !stage.skipped.is_empty() {
            out.push_str(&format!(", {} skipped", stage.skipped.len()));
        }
        if stage.error_count() > 0 {
            out.push_str(&format!(", {} errors", stage.error_count()));
        }
        out.push('\n');
        for skipped in &stage.skipped {
            out.push_str(&format!("    - skipped: {}\n", skipped.detail));
        }
        for warning in &stage.warnings {
            out.push_str(&format!("    - warning: {}\n", warning));
        }
        for error in &stage.errors {
            match error.id {
                Some(id) => out.push_str(&format!("    - error #{}: {}\n", id, error.message)),
                None => out.push_str(&format!("    - error: {}\n", error.message)),
            }
        }
    }
    out.push_str(&format!(
        "  Total: {} rows imported, {} errors\n",
        report.total_imported(),
        report.total_errors()
    ));
    out
}

/// Render a dry run.
pub fn format_preview(previews: &[StagePreview], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(previews)?),
        OutputFormat::Text => {
            let mut out = String::from("Dry run results:\n");
            for preview in previews {
                let action = if preview.destination_populated {
                    "would skip (destination populated)"
                } else {
                    "would import"
                };
                out.push_str(&format!(
                    "  {}: {} source rows, {}\n",
                    preview.stage, preview.source_rows, action
                ));
            }
            Ok(out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::{RecordError, Stage, StageOutcome};

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_summary_line_with_errors() {
        plain();
        let mut report = StageReport::new(Stage::Ratings);
        report.imported = 4;
        report.errors.push(RecordError {
            id: None,
            message: "UNIQUE constraint failed".to_string(),
        });
        assert_eq!(
            stage_summary_line(&report),
            "done. 4 records imported. 1 errors occurred."
        );
    }

    #[test]
    fn test_text_report_marks_skipped_stages() {
        plain();
        let mut users = StageReport::new(Stage::Users);
        users.outcome = StageOutcome::Skipped;
        let mut news = StageReport::new(Stage::News);
        news.total = 3;
        news.imported = 3;
        let report = ImportReport {
            stages: vec![users, news],
        };

        let text = format_report(&report, OutputFormat::Text).unwrap();
        assert!(text.contains("users: skipped (already populated)"));
        assert!(text.contains("news: 3 of 3 imported"));
        assert!(text.contains("Total: 3 rows imported, 0 errors"));
    }

    #[test]
    fn test_json_report() {
        let mut news = StageReport::new(Stage::News);
        news.imported = 1;
        let report = ImportReport { stages: vec![news] };

        let json = format_report(&report, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["stages"][0]["stage"], "news");
        assert_eq!(value["stages"][0]["outcome"], "imported");
        assert_eq!(value["stages"][0]["imported"], 1);
    }
}
