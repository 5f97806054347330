use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::debug;

use crate::config::SearchConfig;
use crate::error::Error;
use crate::model::NodeKind;
use crate::remote::RemoteTreeClient;

/// Find a folder by name under the given roots.
///
/// Direct children of a folder are scanned for a case-insensitive exact
/// match before any descent — first match wins. With
/// `recursive_folder_search` off, only direct children of each root are
/// inspected. With it on, child folders are descended depth-first in
/// listing order, and roots are tried in the order supplied.
///
/// Any listing failure aborts the whole resolution: a partially-resolved
/// folder is worthless, unlike a partial file list.
pub fn resolve(
    client: &dyn RemoteTreeClient,
    root_folder_ids: &[String],
    target_name: &str,
    cfg: &SearchConfig,
    cancel: &AtomicBool,
) -> Result<Option<String>, Error> {
    let target_lower = target_name.to_lowercase();
    let mut visited = HashSet::new();
    for root in root_folder_ids {
        if let Some(found) = resolve_in(client, root, &target_lower, cfg, cancel, &mut visited)? {
            return Ok(Some(found));
        }
    }
    Ok(None)
}

fn resolve_in(
    client: &dyn RemoteTreeClient,
    folder_id: &str,
    target_lower: &str,
    cfg: &SearchConfig,
    cancel: &AtomicBool,
    visited: &mut HashSet<String>,
) -> Result<Option<String>, Error> {
    if !visited.insert(folder_id.to_string()) {
        debug!("folder {} already visited, skipping", folder_id);
        return Ok(None);
    }
    if cancel.load(Ordering::Relaxed) {
        return Err(Error::Cancelled);
    }

    let children = client
        .list_children(folder_id)
        .map_err(|source| Error::Listing {
            folder_id: folder_id.to_string(),
            source,
        })?;

    for child in &children {
        if child.kind == NodeKind::Folder && child.name.to_lowercase() == target_lower {
            debug!("matched folder {} ({})", child.name, child.id);
            return Ok(Some(child.id.clone()));
        }
    }

    if cfg.recursive_folder_search {
        for child in &children {
            if child.kind == NodeKind::Folder {
                if let Some(found) =
                    resolve_in(client, &child.id, target_lower, cfg, cancel, visited)?
                {
                    return Ok(Some(found));
                }
            }
        }
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{Snapshot, SnapshotClient, SnapshotNode};

    fn cfg(recursive: bool) -> SearchConfig {
        SearchConfig {
            recursive_folder_search: recursive,
            ..SearchConfig::default()
        }
    }

    fn not_cancelled() -> AtomicBool {
        AtomicBool::new(false)
    }

    /// root/
    ///   Drawings/
    ///   Shared/
    ///     Archive/
    ///       Models/        ← two levels below Shared
    fn tree() -> SnapshotClient {
        SnapshotClient::new(Snapshot {
            roots: vec!["root".to_string()],
            nodes: vec![
                SnapshotNode::folder("root", "Project", None),
                SnapshotNode::folder("drawings", "Drawings", Some("root")),
                SnapshotNode::folder("shared", "Shared", Some("root")),
                SnapshotNode::folder("archive", "Archive", Some("shared")),
                SnapshotNode::folder("models", "Models", Some("archive")),
            ],
            ..Snapshot::default()
        })
    }

    #[test]
    fn finds_folder_two_levels_deep_with_recursion() {
        let client = tree();
        let roots = vec!["root".to_string()];
        let found = resolve(&client, &roots, "Models", &cfg(true), &not_cancelled()).unwrap();
        assert_eq!(found.as_deref(), Some("models"));
    }

    #[test]
    fn does_not_descend_without_recursion() {
        let client = tree();
        let roots = vec!["root".to_string()];
        let found = resolve(&client, &roots, "Models", &cfg(false), &not_cancelled()).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn direct_child_is_found_without_recursion() {
        let client = tree();
        let roots = vec!["shared".to_string()];
        let found = resolve(&client, &roots, "Archive", &cfg(false), &not_cancelled()).unwrap();
        assert_eq!(found.as_deref(), Some("archive"));
    }

    #[test]
    fn match_is_case_insensitive() {
        let client = tree();
        let roots = vec!["root".to_string()];
        let found = resolve(&client, &roots, "models", &cfg(true), &not_cancelled()).unwrap();
        assert_eq!(found.as_deref(), Some("models"));
    }

    #[test]
    fn direct_match_wins_over_deeper_match() {
        // Both a direct child and a nested folder are named "Models"; the
        // direct child must win even though the nested one sits under an
        // earlier sibling.
        let client = SnapshotClient::new(Snapshot {
            roots: vec!["root".to_string()],
            nodes: vec![
                SnapshotNode::folder("root", "Project", None),
                SnapshotNode::folder("a", "Alpha", Some("root")),
                SnapshotNode::folder("nested", "Models", Some("a")),
                SnapshotNode::folder("direct", "Models", Some("root")),
            ],
            ..Snapshot::default()
        });
        let roots = vec!["root".to_string()];
        let found = resolve(&client, &roots, "Models", &cfg(true), &not_cancelled()).unwrap();
        assert_eq!(found.as_deref(), Some("direct"));
    }

    #[test]
    fn listing_failure_aborts_resolution() {
        let client = tree();
        let roots = vec!["missing".to_string()];
        let result = resolve(&client, &roots, "Models", &cfg(true), &not_cancelled());
        assert!(matches!(result, Err(Error::Listing { .. })));
    }

    #[test]
    fn cyclic_parent_links_terminate() {
        // a and b list each other as children; the visited set must stop
        // the descent.
        let client = SnapshotClient::new(Snapshot {
            roots: vec!["a".to_string()],
            nodes: vec![
                SnapshotNode::folder("a", "A", Some("b")),
                SnapshotNode::folder("b", "B", Some("a")),
            ],
            ..Snapshot::default()
        });
        let roots = vec!["a".to_string()];
        let found = resolve(&client, &roots, "zzz", &cfg(true), &not_cancelled()).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn cancellation_aborts_resolution() {
        let client = tree();
        let roots = vec!["root".to_string()];
        let cancel = AtomicBool::new(true);
        let result = resolve(&client, &roots, "Models", &cfg(true), &cancel);
        assert!(matches!(result, Err(Error::Cancelled)));
    }
}
