use crate::error::RemoteError;
use crate::model::{Entity, FolderNode, ObjectProperties};

/// Read-only access to the externally-hosted file repository.
///
/// Everything the pipeline knows about the host platform goes through this
/// trait — connection, authentication and transport live entirely in the
/// implementation. [`SnapshotClient`](crate::snapshot::SnapshotClient) is the
/// bundled implementation over an exported project-tree snapshot.
///
/// # Listing order
///
/// The order in which `list_children` yields siblings is the traversal order
/// for both folder resolution and file enumeration, so implementations
/// should return it stably.
///
/// # Thread safety
///
/// `Send + Sync` are required — attribute batches are fetched from a
/// pipeline thread while earlier batches are still being filtered.
///
/// # Retries
///
/// The pipeline never retries a failed call. All three operations are pure
/// reads, so an implementation that wants a retry policy can apply one
/// safely on its own.
pub trait RemoteTreeClient: Send + Sync {
    /// List the direct children of a folder.
    fn list_children(&self, folder_id: &str) -> Result<Vec<FolderNode>, RemoteError>;

    /// List the addressable entities inside a file.
    fn list_entities(&self, file_id: &str) -> Result<Vec<Entity>, RemoteError>;

    /// Fetch attribute data for a batch of entities in one call. The result
    /// carries one payload per requested entity, in request order.
    fn fetch_attributes(
        &self,
        file_id: &str,
        entity_ids: &[String],
    ) -> Result<Vec<ObjectProperties>, RemoteError>;
}
