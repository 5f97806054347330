//! A [`RemoteTreeClient`] over an exported project-tree snapshot.
//!
//! The live host platform is reached through its own client; this one serves
//! a JSON export of a project tree instead, which keeps the whole pipeline
//! drivable offline and gives the tests a faithful double. The format is a
//! flat node list with parent links plus per-file entity and property maps:
//!
//! ```json
//! {
//!   "roots": ["root"],
//!   "nodes": [
//!     { "id": "root", "name": "Project", "kind": "FOLDER" },
//!     { "id": "f1", "name": "tower.ifc", "kind": "FILE",
//!       "parent_id": "root", "size": 2048 }
//!   ],
//!   "entities": { "f1": [{ "id": "e1", "type": "IfcWall" }] },
//!   "properties": {
//!     "f1": [{ "id": "e1", "name": "Wall-01", "type": "IfcWall",
//!              "properties": { "Pset_WallCommon.FireRating": "F60" } }]
//!   }
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, RemoteError};
use crate::model::{
    AttrValue, Entity, FolderNode, NodeKind, ObjectProperties, ObjectProperty,
};
use crate::remote::RemoteTreeClient;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub roots: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub entities: HashMap<String, Vec<SnapshotEntity>>,
    #[serde(default)]
    pub properties: HashMap<String, Vec<SnapshotObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl SnapshotNode {
    pub fn folder(id: &str, name: &str, parent_id: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: NodeKind::Folder,
            parent_id: parent_id.map(String::from),
            size: None,
        }
    }

    pub fn file(id: &str, name: &str, parent_id: &str, size: u64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: NodeKind::File,
            parent_id: Some(parent_id.to_string()),
            size: Some(size),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotEntity {
    pub id: String,
    #[serde(rename = "type", default)]
    pub entity_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotObject {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default)]
    pub object_type: Option<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, AttrValue>,
}

pub struct SnapshotClient {
    nodes: HashMap<String, SnapshotNode>,
    /// Child ids per folder, in snapshot order — this is the listing order.
    children: HashMap<String, Vec<String>>,
    roots: Vec<String>,
    entities: HashMap<String, Vec<SnapshotEntity>>,
    /// File id → object id → property payload.
    properties: HashMap<String, HashMap<String, SnapshotObject>>,
}

impl SnapshotClient {
    pub fn new(snapshot: Snapshot) -> Self {
        let mut nodes = HashMap::new();
        let mut children: HashMap<String, Vec<String>> = HashMap::new();
        for node in &snapshot.nodes {
            if let Some(parent_id) = &node.parent_id {
                children
                    .entry(parent_id.clone())
                    .or_default()
                    .push(node.id.clone());
            }
            nodes.insert(node.id.clone(), node.clone());
        }

        let roots = if snapshot.roots.is_empty() {
            // Fall back to parentless folders, in snapshot order.
            snapshot
                .nodes
                .iter()
                .filter(|n| n.kind == NodeKind::Folder && n.parent_id.is_none())
                .map(|n| n.id.clone())
                .collect()
        } else {
            snapshot.roots
        };

        let properties = snapshot
            .properties
            .into_iter()
            .map(|(file_id, objects)| {
                let by_id = objects
                    .into_iter()
                    .map(|object| (object.id.clone(), object))
                    .collect();
                (file_id, by_id)
            })
            .collect();

        Self {
            nodes,
            children,
            roots,
            entities: snapshot.entities,
            properties,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let content = fs::read_to_string(path)?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;
        Ok(Self::new(snapshot))
    }

    /// Root folder ids declared by the snapshot.
    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    /// Ancestor names of a node, root first, excluding the node itself.
    /// Broken or cyclic parent links terminate the walk instead of looping.
    fn ancestor_names(&self, node_id: &str) -> Vec<String> {
        let mut names = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self
            .nodes
            .get(node_id)
            .and_then(|node| node.parent_id.as_deref());
        while let Some(id) = current {
            if !seen.insert(id.to_string()) {
                break;
            }
            match self.nodes.get(id) {
                Some(node) => {
                    names.push(node.name.clone());
                    current = node.parent_id.as_deref();
                }
                None => break,
            }
        }
        names.reverse();
        names
    }

    fn folder(&self, folder_id: &str) -> Result<&SnapshotNode, RemoteError> {
        let node = self
            .nodes
            .get(folder_id)
            .ok_or_else(|| RemoteError::NotFound(folder_id.to_string()))?;
        if node.kind != NodeKind::Folder {
            return Err(RemoteError::Malformed(format!(
                "{} is not a folder",
                folder_id
            )));
        }
        Ok(node)
    }
}

impl RemoteTreeClient for SnapshotClient {
    fn list_children(&self, folder_id: &str) -> Result<Vec<FolderNode>, RemoteError> {
        let folder = self.folder(folder_id)?;

        let mut child_path = self.ancestor_names(folder_id);
        child_path.push(folder.name.clone());

        let child_ids = self.children.get(folder_id).map(Vec::as_slice).unwrap_or(&[]);
        Ok(child_ids
            .iter()
            .filter_map(|id| self.nodes.get(id))
            .map(|node| FolderNode {
                id: node.id.clone(),
                name: node.name.clone(),
                kind: node.kind,
                parent_id: node.parent_id.clone(),
                size: node.size,
                path: child_path.clone(),
            })
            .collect())
    }

    fn list_entities(&self, file_id: &str) -> Result<Vec<Entity>, RemoteError> {
        let node = self
            .nodes
            .get(file_id)
            .ok_or_else(|| RemoteError::NotFound(file_id.to_string()))?;
        if node.kind != NodeKind::File {
            return Err(RemoteError::Malformed(format!("{} is not a file", file_id)));
        }
        Ok(self
            .entities
            .get(file_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
            .iter()
            .map(|entity| Entity {
                id: entity.id.clone(),
                entity_type: entity.entity_type.clone(),
            })
            .collect())
    }

    fn fetch_attributes(
        &self,
        file_id: &str,
        entity_ids: &[String],
    ) -> Result<Vec<ObjectProperties>, RemoteError> {
        if !self.nodes.contains_key(file_id) {
            return Err(RemoteError::NotFound(file_id.to_string()));
        }
        let objects = self.properties.get(file_id);

        Ok(entity_ids
            .iter()
            .map(|entity_id| match objects.and_then(|o| o.get(entity_id)) {
                Some(object) => ObjectProperties {
                    id: object.id.clone(),
                    name: object
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("Object_{}", object.id)),
                    object_type: object
                        .object_type
                        .clone()
                        .unwrap_or_else(|| "Unknown".to_string()),
                    properties: object
                        .properties
                        .iter()
                        .map(|(name, value)| ObjectProperty {
                            name: name.clone(),
                            value: value.clone(),
                        })
                        .collect(),
                },
                // No property data for this entity — same fallback the host
                // platform applies.
                None => ObjectProperties {
                    id: entity_id.clone(),
                    name: format!("Object_{}", entity_id),
                    object_type: "Unknown".to_string(),
                    properties: Vec::new(),
                },
            })
            .collect())
    }
}
