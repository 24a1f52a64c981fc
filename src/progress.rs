//! Console progress bars and stage summary lines.
//!
//! Everything here goes to stderr and is presentational only; the
//! machine-readable result is the `ImportReport`.

use crate::format::stage_summary_line;
use crate::import::StageReport;
use std::io::{IsTerminal, Write};

const BAR_WIDTH: usize = 30;

/// Where stage output is written.
#[derive(Debug, Clone, Copy)]
pub struct Console {
    enabled: bool,
    /// Redraw a progress bar in place. Off when stderr is not a terminal.
    animate: bool,
}

impl Console {
    /// Print to stderr, animating progress only on a terminal.
    pub fn stderr() -> Self {
        Self {
            enabled: true,
            animate: std::io::stderr().is_terminal(),
        }
    }

    /// Print nothing.
    pub fn quiet() -> Self {
        Self {
            enabled: false,
            animate: false,
        }
    }

    pub fn line(&self, message: &str) {
        if self.enabled {
            eprintln!("{}", message);
        }
    }

    pub fn progress(&self, label: &str, total: u64) -> Progress {
        let progress = Progress {
            label: label.to_string(),
            total,
            current: 0,
            console: *self,
        };
        progress.draw();
        progress
    }

    /// `done. N records imported.` with the error count when there is one.
    pub fn summary(&self, report: &StageReport) {
        if self.enabled {
            eprintln!("{}", stage_summary_line(report));
        }
    }
}

/// A running `current/total` counter for one stage.
pub struct Progress {
    label: String,
    total: u64,
    current: u64,
    console: Console,
}

impl Progress {
    pub fn inc(&mut self) {
        self.current += 1;
        self.draw();
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn finish(self) {
        if self.console.enabled && self.console.animate {
            eprintln!();
        }
        tracing::debug!(label = %self.label, current = self.current, total = self.total, "Stage finished");
    }

    fn draw(&self) {
        if !(self.console.enabled && self.console.animate) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "\r{}", render_bar(&self.label, self.current, self.total));
        let _ = stderr.flush();
    }
}

/// `Importing users... [=====>     ] 50% (5/10)`
pub fn render_bar(label: &str, current: u64, total: u64) -> String {
    let ratio = if total == 0 {
        1.0
    } else {
        (current.min(total) as f64) / (total as f64)
    };
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    let mut bar = "=".repeat(filled);
    if filled < BAR_WIDTH {
        bar.push('>');
        bar.push_str(&" ".repeat(BAR_WIDTH - filled - 1));
    }
    format!(
        "{} [{}] {:>3}% ({}/{})",
        label,
        bar,
        (ratio * 100.0).round() as u64,
        current,
        total
    )
}
