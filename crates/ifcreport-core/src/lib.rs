pub mod aggregator;
pub mod config;
pub mod engine;
pub mod enumerator;
pub mod error;
pub mod export;
pub mod model;
pub mod progress;
pub mod remote;
pub mod report;
pub mod resolver;
pub mod snapshot;

pub use config::SearchConfig;
pub use engine::{FileSearch, ReportEngine, ReportOutcome, SearchOutcome};
pub use error::{Error, RemoteError};
pub use progress::{ProgressReporter, SilentReporter};
pub use remote::RemoteTreeClient;
pub use report::ReportTable;
pub use snapshot::SnapshotClient;
