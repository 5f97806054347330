use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::aggregator;
use crate::config::SearchConfig;
use crate::enumerator;
use crate::error::Error;
use crate::model::{SkippedFile, SkippedFolder, TargetFile};
use crate::progress::ProgressReporter;
use crate::remote::RemoteTreeClient;
use crate::report::{self, ReportTable};
use crate::resolver;

/// Orchestrates the full pipeline: resolve a folder by name, enumerate its
/// target files, aggregate attribute data, assemble the report table.
///
/// The engine takes its own snapshot of the configuration at construction,
/// so a concurrently-updated configuration store can never be observed
/// half-applied mid-search.
pub struct ReportEngine<C: RemoteTreeClient> {
    client: C,
    config: SearchConfig,
    cancel: Arc<AtomicBool>,
}

/// A successful file search.
#[derive(Debug)]
pub struct FileSearch {
    pub files: Vec<TargetFile>,
    /// Subfolders skipped because their listing failed.
    pub skipped: Vec<SkippedFolder>,
    pub folders_visited: usize,
    pub duration: Duration,
    pub cancelled: bool,
}

/// Outcome of [`ReportEngine::search`]. A missing folder is a normal
/// negative result, not an error.
#[derive(Debug)]
pub enum SearchOutcome {
    Found(FileSearch),
    NotFound,
}

#[derive(Debug)]
pub struct ReportOutcome {
    pub table: ReportTable,
    /// Files skipped because entity or attribute retrieval failed.
    pub skipped: Vec<SkippedFile>,
    pub record_count: usize,
    pub entity_count: usize,
    pub aggregate_duration: Duration,
    pub assemble_duration: Duration,
    pub cancelled: bool,
}

impl<C: RemoteTreeClient> ReportEngine<C> {
    pub fn new(client: C, config: SearchConfig) -> Self {
        Self {
            client,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Token for cancelling an in-progress operation from another thread.
    /// Reset at the start of each `search`/`build_report` call. In-flight
    /// remote calls are not interrupted; no further folders, files or
    /// batches are started once the token is set.
    pub fn cancel_token(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Resolve `target_folder_name` under the given roots, then enumerate
    /// its target files.
    pub fn search(
        &self,
        root_folder_ids: &[String],
        target_folder_name: &str,
        reporter: &dyn ProgressReporter,
    ) -> Result<SearchOutcome, Error> {
        self.cancel.store(false, Ordering::Relaxed);

        info!("Resolving folder {:?}...", target_folder_name);
        reporter.on_resolve_start(target_folder_name);
        let resolve_start = Instant::now();
        let folder_id = resolver::resolve(
            &self.client,
            root_folder_ids,
            target_folder_name,
            &self.config,
            &self.cancel,
        )?;
        reporter.on_resolve_complete(folder_id.as_deref(), resolve_start.elapsed().as_secs_f64());

        let Some(folder_id) = folder_id else {
            info!("No folder named {:?} found", target_folder_name);
            return Ok(SearchOutcome::NotFound);
        };
        debug!(
            "Resolved {:?} to {} in {:.2}s",
            target_folder_name,
            folder_id,
            resolve_start.elapsed().as_secs_f64(),
        );

        info!("Enumerating model files...");
        reporter.on_enumerate_start();
        let enumerate_start = Instant::now();
        let enumeration =
            enumerator::enumerate(&self.client, &folder_id, &self.config, &self.cancel, reporter);
        let duration = enumerate_start.elapsed();
        reporter.on_enumerate_complete(enumeration.files.len(), duration.as_secs_f64());
        debug!(
            "Found {} files in {:.2}s — {} folders visited, {} skipped",
            enumeration.files.len(),
            duration.as_secs_f64(),
            enumeration.folders_visited,
            enumeration.skipped.len(),
        );

        Ok(SearchOutcome::Found(FileSearch {
            files: enumeration.files,
            skipped: enumeration.skipped,
            folders_visited: enumeration.folders_visited,
            duration,
            cancelled: enumeration.cancelled,
        }))
    }

    /// Aggregate attribute data for the given files and assemble the report
    /// table. Zero records is [`Error::NoData`] — "nothing to export" —
    /// never an empty-but-successful table.
    pub fn build_report(
        &self,
        files: &[TargetFile],
        reporter: &dyn ProgressReporter,
    ) -> Result<ReportOutcome, Error> {
        self.cancel.store(false, Ordering::Relaxed);

        info!("Aggregating attribute data for {} files...", files.len());
        reporter.on_report_start(files.len());
        let aggregate_start = Instant::now();
        let aggregation =
            aggregator::aggregate(&self.client, files, &self.config, &self.cancel, reporter);
        let aggregate_duration = aggregate_start.elapsed();
        debug!(
            "Aggregated {} records from {} entities in {:.2}s — {} files skipped",
            aggregation.records.len(),
            aggregation.entities_seen,
            aggregate_duration.as_secs_f64(),
            aggregation.skipped.len(),
        );

        if aggregation.records.is_empty() {
            if aggregation.cancelled {
                return Err(Error::Cancelled);
            }
            return Err(Error::NoData);
        }

        let assemble_start = Instant::now();
        let table = report::assemble(&aggregation.records, &self.config);
        let assemble_duration = assemble_start.elapsed();
        reporter.on_report_complete(
            aggregation.records.len(),
            aggregate_start.elapsed().as_secs_f64(),
        );

        Ok(ReportOutcome {
            table,
            skipped: aggregation.skipped,
            record_count: aggregation.records.len(),
            entity_count: aggregation.entities_seen,
            aggregate_duration,
            assemble_duration,
            cancelled: aggregation.cancelled,
        })
    }
}
