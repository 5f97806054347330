use thiserror::Error;

/// Failure reported by a [`RemoteTreeClient`](crate::remote::RemoteTreeClient)
/// implementation.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("unavailable: {0}")]
    Unavailable(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum Error {
    /// Listing a folder's children failed. Fatal for folder resolution;
    /// enumeration and aggregation record the failure and continue instead.
    #[error("listing children of folder {folder_id} failed: {source}")]
    Listing {
        folder_id: String,
        #[source]
        source: RemoteError,
    },

    /// Fetching entity or attribute data from a file failed.
    #[error("reading attribute data from file {file_id} failed: {source}")]
    Read {
        file_id: String,
        #[source]
        source: RemoteError,
    },

    /// Aggregation produced zero records — "nothing to export", not a
    /// transport failure.
    #[error("no objects found to export")]
    NoData,

    #[error("operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}
