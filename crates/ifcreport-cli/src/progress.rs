use ifcreport_core::ProgressReporter;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

/// CLI progress reporter using indicatif progress bars.
///
/// - Resolve phase: spinner (single folder lookup, unknown duration)
/// - Enumerate phase: spinner with a running file count
/// - Report phase: 0–100 bar driven by the aggregator's fraction
pub struct CliReporter {
    bar: Mutex<Option<ProgressBar>>,
}

impl CliReporter {
    pub fn new() -> Self {
        Self {
            bar: Mutex::new(None),
        }
    }

    fn set_bar(&self, pb: ProgressBar) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(old) = guard.take() {
            old.finish_and_clear();
        }
        *guard = Some(pb);
    }

    fn finish_bar(&self) {
        let mut guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.take() {
            pb.finish_and_clear();
        }
    }

    fn new_spinner(message: String) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.set_message(message);
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        pb
    }
}

impl ProgressReporter for CliReporter {
    fn on_resolve_start(&self, target_name: &str) {
        self.set_bar(Self::new_spinner(format!(
            "Resolving folder {:?}...",
            target_name
        )));
    }

    fn on_resolve_complete(&self, folder_id: Option<&str>, duration_secs: f64) {
        self.finish_bar();
        match folder_id {
            Some(id) => eprintln!(
                "  \x1b[32m✓\x1b[0m Folder resolved to {} in {:.2}s",
                id, duration_secs
            ),
            None => eprintln!(
                "  \x1b[33m✗\x1b[0m No matching folder after {:.2}s",
                duration_secs
            ),
        }
    }

    fn on_enumerate_start(&self) {
        self.set_bar(Self::new_spinner("Searching for model files...".to_string()));
    }

    fn on_enumerate_progress(&self, files_found: usize, _current_name: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("Searching... {} model files found", files_found));
        }
    }

    fn on_enumerate_complete(&self, total_files: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Search complete: {} model files in {:.2}s",
            total_files, duration_secs
        );
    }

    fn on_report_start(&self, _total_files: usize) {
        let pb = ProgressBar::new(100);
        pb.set_style(
            ProgressStyle::with_template(
                "  {spinner:.cyan} Aggregating [{bar:30.cyan/dim}] {percent}% {msg}",
            )
            .unwrap()
            .progress_chars("━╸─")
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
        );
        pb.enable_steady_tick(std::time::Duration::from_millis(80));
        self.set_bar(pb);
    }

    fn on_file_start(&self, index: usize, total_files: usize, name: &str) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_message(format!("{} ({}/{})", name, index + 1, total_files));
        }
    }

    fn on_report_progress(&self, fraction: f64) {
        let guard = self.bar.lock().unwrap();
        if let Some(pb) = guard.as_ref() {
            pb.set_position((fraction * 100.0).round() as u64);
        }
    }

    fn on_file_skipped(&self, name: &str, reason: &str) {
        let guard = self.bar.lock().unwrap();
        let line = format!("  \x1b[33m⚠\x1b[0m Skipped {}: {}", name, reason);
        match guard.as_ref() {
            Some(pb) => pb.println(line),
            None => eprintln!("{}", line),
        }
    }

    fn on_report_complete(&self, records: usize, duration_secs: f64) {
        self.finish_bar();
        eprintln!(
            "  \x1b[32m✓\x1b[0m Aggregation complete: {} records in {:.2}s",
            records, duration_secs
        );
    }
}
