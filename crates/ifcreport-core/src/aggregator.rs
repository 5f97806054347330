use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::thread;

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::error::RemoteError;
use crate::model::{AttributeRecord, Entity, ObjectProperties, SkippedFile, TargetFile};
use crate::progress::ProgressReporter;
use crate::remote::RemoteTreeClient;

/// Entities per `fetch_attributes` call. Bounds a single request's payload
/// and latency.
pub const BATCH_SIZE: usize = 50;

/// Batches fetched ahead of the filter/append stage.
const PIPELINE_DEPTH: usize = 2;

/// Result of attribute aggregation over a set of target files.
#[derive(Debug, Default)]
pub struct Aggregation {
    /// Records in file-then-entity discovery order.
    pub records: Vec<AttributeRecord>,
    /// Files whose entity or attribute retrieval failed.
    pub skipped: Vec<SkippedFile>,
    pub entities_seen: usize,
    pub cancelled: bool,
}

/// Fetch and filter attribute data for every file, independently per file.
///
/// Entities are fetched in batches of [`BATCH_SIZE`]; the next batch is
/// requested on a pipeline thread while the previous one is filtered and
/// appended, which bounds both memory and request concurrency. A failure
/// on any batch skips the whole file (its partial records are discarded and
/// the skip recorded) and aggregation moves on to the next file.
///
/// Progress fractions: `0.5 * i / n` when starting file `i` of `n`, then
/// `0.5 + 0.5 * b / B` after batch `b` of `B` within the current file.
/// The second phase restarts per file, so raw values can move backwards;
/// only increases are reported, keeping the fraction non-decreasing.
pub fn aggregate(
    client: &dyn RemoteTreeClient,
    files: &[TargetFile],
    cfg: &SearchConfig,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
) -> Aggregation {
    let mut out = Aggregation::default();
    let mut progress = ProgressGauge::new(reporter);
    let total_files = files.len();

    for (index, file) in files.iter().enumerate() {
        if cancel.load(Ordering::Relaxed) {
            out.cancelled = true;
            break;
        }
        reporter.on_file_start(index, total_files, &file.name);
        progress.emit(0.5 * index as f64 / total_files as f64);

        let entities = match client.list_entities(&file.id) {
            Ok(entities) => entities,
            Err(error) => {
                warn!("skipping file {}: {}", file.name, error);
                reporter.on_file_skipped(&file.name, &error.to_string());
                out.skipped.push(SkippedFile {
                    file: file.clone(),
                    error,
                });
                continue;
            }
        };
        out.entities_seen += entities.len();
        debug!("file {}: {} entities", file.name, entities.len());

        match aggregate_file(client, file, &entities, cfg, cancel, &mut progress) {
            Ok(FileOutcome::Complete(records)) => out.records.extend(records),
            Ok(FileOutcome::Cancelled) => {
                out.cancelled = true;
                break;
            }
            Err(error) => {
                warn!("skipping file {}: {}", file.name, error);
                reporter.on_file_skipped(&file.name, &error.to_string());
                out.skipped.push(SkippedFile {
                    file: file.clone(),
                    error,
                });
            }
        }
    }

    if !out.cancelled {
        progress.emit(1.0);
    }
    out
}

enum FileOutcome {
    Complete(Vec<AttributeRecord>),
    /// Cancelled mid-file; the partial buffer was dropped.
    Cancelled,
}

fn aggregate_file(
    client: &dyn RemoteTreeClient,
    file: &TargetFile,
    entities: &[Entity],
    cfg: &SearchConfig,
    cancel: &AtomicBool,
    progress: &mut ProgressGauge<'_>,
) -> Result<FileOutcome, RemoteError> {
    let batches: Vec<Vec<String>> = entities
        .chunks(BATCH_SIZE)
        .map(|chunk| chunk.iter().map(|entity| entity.id.clone()).collect())
        .collect();
    let total_batches = batches.len();

    thread::scope(|scope| {
        let (tx, rx) =
            mpsc::sync_channel::<Result<Vec<ObjectProperties>, RemoteError>>(PIPELINE_DEPTH);

        // Fetch ahead while earlier batches are filtered and appended below.
        scope.spawn(move || {
            for entity_ids in &batches {
                if cancel.load(Ordering::Relaxed) {
                    return;
                }
                let fetched = client.fetch_attributes(&file.id, entity_ids);
                let stop = fetched.is_err();
                if tx.send(fetched).is_err() || stop {
                    return;
                }
            }
        });

        let mut records = Vec::new();
        let mut batches_done = 0;
        for fetched in rx {
            let objects = fetched?;
            for object in objects {
                records.push(filter_record(object, file, cfg));
            }
            batches_done += 1;
            progress.emit(0.5 + 0.5 * batches_done as f64 / total_batches as f64);
        }

        if batches_done < total_batches {
            // The channel closed early without an error: the fetcher saw
            // the cancel flag.
            return Ok(FileOutcome::Cancelled);
        }
        Ok(FileOutcome::Complete(records))
    })
}

/// Apply the attribute-set inclusion filter to one object's payload.
/// Colliding attribute names are last-write-wins in listing order.
fn filter_record(
    object: ObjectProperties,
    file: &TargetFile,
    cfg: &SearchConfig,
) -> AttributeRecord {
    let mut attributes = BTreeMap::new();
    for property in object.properties {
        if cfg.includes_attribute(&property.name) {
            attributes.insert(property.name, property.value);
        }
    }
    AttributeRecord {
        object_id: object.id,
        object_name: object.name,
        object_type: object.object_type,
        attributes,
        source_file: file.clone(),
    }
}

/// Monotonically non-decreasing fraction reporting.
struct ProgressGauge<'a> {
    reporter: &'a dyn ProgressReporter,
    last: f64,
}

impl<'a> ProgressGauge<'a> {
    fn new(reporter: &'a dyn ProgressReporter) -> Self {
        Self {
            reporter,
            last: 0.0,
        }
    }

    fn emit(&mut self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        if fraction > self.last {
            self.last = fraction;
            self.reporter.on_report_progress(fraction);
        }
    }
}
