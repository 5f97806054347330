use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, warn};

use crate::config::SearchConfig;
use crate::model::{NodeKind, SkippedFolder, TargetFile};
use crate::progress::ProgressReporter;
use crate::remote::RemoteTreeClient;

/// Result of collecting target files under a resolved folder.
#[derive(Debug, Default)]
pub struct Enumeration {
    /// Matches in discovery order: a folder's direct matches first, then
    /// its subfolders' results depth-first in listing order.
    pub files: Vec<TargetFile>,
    /// Subfolders whose listing failed; their siblings were still searched.
    pub skipped: Vec<SkippedFolder>,
    pub folders_visited: usize,
    pub cancelled: bool,
}

/// Collect every file under `folder_id` whose name matches the configured
/// target suffix, descending into subfolders when `recursive_file_search`
/// is set.
///
/// A failed listing is recorded and enumeration continues with siblings —
/// a partial file list is still useful, so this stage never fails as a
/// whole. Contrast with [`resolve`](crate::resolver::resolve), which
/// aborts on the first listing failure.
pub fn enumerate(
    client: &dyn RemoteTreeClient,
    folder_id: &str,
    cfg: &SearchConfig,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
) -> Enumeration {
    let mut out = Enumeration::default();
    let mut visited = HashSet::new();
    enumerate_in(client, folder_id, cfg, cancel, reporter, &mut visited, &mut out);
    out
}

fn enumerate_in(
    client: &dyn RemoteTreeClient,
    folder_id: &str,
    cfg: &SearchConfig,
    cancel: &AtomicBool,
    reporter: &dyn ProgressReporter,
    visited: &mut HashSet<String>,
    out: &mut Enumeration,
) {
    if !visited.insert(folder_id.to_string()) {
        debug!("folder {} already visited, skipping", folder_id);
        return;
    }
    if cancel.load(Ordering::Relaxed) {
        out.cancelled = true;
        return;
    }
    out.folders_visited += 1;

    let children = match client.list_children(folder_id) {
        Ok(children) => children,
        Err(error) => {
            warn!("skipping folder {}: {}", folder_id, error);
            out.skipped.push(SkippedFolder {
                folder_id: folder_id.to_string(),
                error,
            });
            return;
        }
    };

    for child in &children {
        if child.kind == NodeKind::File && cfg.matches_target(&child.name) {
            out.files.push(TargetFile {
                id: child.id.clone(),
                name: child.name.clone(),
                size: child.size.unwrap_or(0),
                path: child.path.clone(),
            });
            reporter.on_enumerate_progress(out.files.len(), &child.name);
        }
    }

    if cfg.recursive_file_search {
        for child in &children {
            if out.cancelled {
                return;
            }
            if child.kind == NodeKind::Folder {
                enumerate_in(client, &child.id, cfg, cancel, reporter, visited, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RemoteError;
    use crate::model::{Entity, FolderNode, ObjectProperties};
    use crate::progress::SilentReporter;
    use crate::snapshot::{Snapshot, SnapshotClient, SnapshotNode};

    fn cfg(recursive: bool) -> SearchConfig {
        SearchConfig {
            recursive_file_search: recursive,
            ..SearchConfig::default()
        }
    }

    fn not_cancelled() -> AtomicBool {
        AtomicBool::new(false)
    }

    /// models/
    ///   A.ifc  B.IFC  C.txt
    ///   revisions/
    ///     old.ifc
    fn tree() -> SnapshotClient {
        SnapshotClient::new(Snapshot {
            roots: vec!["models".to_string()],
            nodes: vec![
                SnapshotNode::folder("models", "Models", None),
                SnapshotNode::file("a", "A.ifc", "models", 100),
                SnapshotNode::file("b", "B.IFC", "models", 200),
                SnapshotNode::file("c", "C.txt", "models", 300),
                SnapshotNode::folder("rev", "revisions", Some("models")),
                SnapshotNode::file("old", "old.ifc", "rev", 400),
            ],
            ..Snapshot::default()
        })
    }

    #[test]
    fn non_recursive_matches_suffix_case_insensitively() {
        let client = tree();
        let out = enumerate(&client, "models", &cfg(false), &not_cancelled(), &SilentReporter);
        let names: Vec<_> = out.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A.ifc", "B.IFC"]);
        assert!(out.skipped.is_empty());
    }

    #[test]
    fn recursive_appends_subfolder_results_after_direct_matches() {
        let client = tree();
        let out = enumerate(&client, "models", &cfg(true), &not_cancelled(), &SilentReporter);
        let names: Vec<_> = out.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["A.ifc", "B.IFC", "old.ifc"]);
        assert_eq!(out.folders_visited, 2);
    }

    #[test]
    fn files_carry_listing_path_through() {
        let client = tree();
        let out = enumerate(&client, "models", &cfg(true), &not_cancelled(), &SilentReporter);
        let old = out.files.iter().find(|f| f.name == "old.ifc").unwrap();
        assert_eq!(old.path, vec!["Models", "revisions"]);
    }

    /// Delegates to a snapshot client but fails listings for one folder id.
    struct FailingClient {
        inner: SnapshotClient,
        fail_folder: String,
    }

    impl RemoteTreeClient for FailingClient {
        fn list_children(&self, folder_id: &str) -> Result<Vec<FolderNode>, RemoteError> {
            if folder_id == self.fail_folder {
                return Err(RemoteError::Unavailable("503".to_string()));
            }
            self.inner.list_children(folder_id)
        }

        fn list_entities(&self, file_id: &str) -> Result<Vec<Entity>, RemoteError> {
            self.inner.list_entities(file_id)
        }

        fn fetch_attributes(
            &self,
            file_id: &str,
            entity_ids: &[String],
        ) -> Result<Vec<ObjectProperties>, RemoteError> {
            self.inner.fetch_attributes(file_id, entity_ids)
        }
    }

    #[test]
    fn failed_sublisting_is_recorded_and_siblings_continue() {
        // models/ has two subfolders; the first one's listing fails, the
        // second must still be searched.
        let client = FailingClient {
            inner: SnapshotClient::new(Snapshot {
                roots: vec!["models".to_string()],
                nodes: vec![
                    SnapshotNode::folder("models", "Models", None),
                    SnapshotNode::folder("bad", "bad", Some("models")),
                    SnapshotNode::folder("good", "good", Some("models")),
                    SnapshotNode::file("x", "x.ifc", "good", 1),
                ],
                ..Snapshot::default()
            }),
            fail_folder: "bad".to_string(),
        };
        let out = enumerate(&client, "models", &cfg(true), &not_cancelled(), &SilentReporter);
        let names: Vec<_> = out.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["x.ifc"]);
        assert_eq!(out.skipped.len(), 1);
        assert_eq!(out.skipped[0].folder_id, "bad");
    }

    #[test]
    fn failed_root_listing_yields_empty_result_with_skip_record() {
        let client = tree();
        let out = enumerate(&client, "missing", &cfg(true), &not_cancelled(), &SilentReporter);
        assert!(out.files.is_empty());
        assert_eq!(out.skipped.len(), 1);
    }

    #[test]
    fn cancellation_stops_descending() {
        let client = tree();
        let cancel = AtomicBool::new(true);
        let out = enumerate(&client, "models", &cfg(true), &cancel, &SilentReporter);
        assert!(out.cancelled);
        assert!(out.files.is_empty());
    }
}
