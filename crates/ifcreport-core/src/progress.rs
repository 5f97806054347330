/// Trait for reporting search and report-building progress.
///
/// The CLI implements this with indicatif bars; embedders can forward the
/// events anywhere else. All methods have default no-op implementations.
///
/// `on_report_progress` carries a fraction in `0..=1`: the first half covers
/// entity listing across all files, the second half batch completion within
/// the current file. It is a coarse estimate, but never decreases.
pub trait ProgressReporter: Send + Sync {
    fn on_resolve_start(&self, _target_name: &str) {}
    fn on_resolve_complete(&self, _folder_id: Option<&str>, _duration_secs: f64) {}
    fn on_enumerate_start(&self) {}
    fn on_enumerate_progress(&self, _files_found: usize, _current_name: &str) {}
    fn on_enumerate_complete(&self, _total_files: usize, _duration_secs: f64) {}
    fn on_report_start(&self, _total_files: usize) {}
    fn on_file_start(&self, _index: usize, _total_files: usize, _name: &str) {}
    fn on_report_progress(&self, _fraction: f64) {}
    fn on_file_skipped(&self, _name: &str, _reason: &str) {}
    fn on_report_complete(&self, _records: usize, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl ProgressReporter for SilentReporter {}
