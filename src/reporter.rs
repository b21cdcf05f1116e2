// comic-tool/src/reporter.rs
//! Reporting hooks shared by the tree processor and the renumberer.
//!
//! Every milestone goes through a [`Reporter`] so the library never decides
//! where messages end up. [`LogReporter`] keeps the durable record through the
//! `log` facade; [`ConsoleReporter`] additionally echoes to the terminal,
//! printing around an `indicatif` spinner that ticks once per page.

use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// One symbol per page handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMarker {
    /// Page passed through unchanged.
    Copied,
    /// Page cut into two halves.
    Split,
    /// Page could not be decoded and was skipped.
    Skipped,
    /// Page checked during renumbering.
    Numbered,
}

impl ProgressMarker {
    pub fn symbol(self) -> char {
        match self {
            ProgressMarker::Copied => 'O',
            ProgressMarker::Split => '#',
            ProgressMarker::Skipped => 'x',
            ProgressMarker::Numbered => '#',
        }
    }
}

pub trait Reporter {
    fn info(&self, message: &str);
    fn error(&self, message: &str);
    fn progress(&self, marker: ProgressMarker);
    /// Called once a batch of progress markers is complete.
    fn finish_progress(&self) {}
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn info(&self, message: &str) {
        log::info!("{}", message);
    }

    fn error(&self, message: &str) {
        log::error!("{}", message);
    }

    fn progress(&self, marker: ProgressMarker) {
        log::trace!("{}", marker.symbol());
    }
}

pub struct ConsoleReporter {
    bar: ProgressBar,
}

impl ConsoleReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} pages {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn info(&self, message: &str) {
        self.bar.suspend(|| println!("{}", message));
        log::info!("{}", message);
    }

    fn error(&self, message: &str) {
        self.bar.suspend(|| println!("Error: {}", message));
        log::error!("{}", message);
    }

    fn progress(&self, marker: ProgressMarker) {
        self.bar.inc(1);
        self.bar.set_message(marker.symbol().to_string());
    }

    fn finish_progress(&self) {
        self.bar.set_message("");
    }
}
