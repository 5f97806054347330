use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

use crate::error::RemoteError;

/// Kind of a node in the hosted folder tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "FILE")]
    File,
    #[serde(rename = "FOLDER")]
    Folder,
}

/// One child entry returned by a folder listing.
#[derive(Debug, Clone)]
pub struct FolderNode {
    pub id: String,
    pub name: String,
    pub kind: NodeKind,
    pub parent_id: Option<String>,
    pub size: Option<u64>,
    /// Ancestor folder names, ordered root to node. Display metadata only —
    /// folder names are not unique, so this must never be used as a key.
    pub path: Vec<String>,
}

/// A file matching the configured target suffix. Identity is `id`; the
/// struct is never mutated after enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub path: Vec<String>,
}

impl TargetFile {
    /// Ancestor path as a single display string.
    pub fn path_string(&self) -> String {
        self.path.join(" > ")
    }
}

/// An addressable object inside a target file. Transient — dropped once its
/// attribute record has been produced.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: String,
    pub entity_type: String,
}

/// An attribute value as delivered by the remote repository.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Number(f64),
    Text(String),
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrValue::Text(text) => f.write_str(text),
            // Integral values render without a decimal point, the way the
            // repository presents them.
            AttrValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            AttrValue::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ObjectProperty {
    pub name: String,
    pub value: AttrValue,
}

/// Per-object payload of a `fetch_attributes` call, before filtering.
#[derive(Debug, Clone)]
pub struct ObjectProperties {
    pub id: String,
    pub name: String,
    pub object_type: String,
    pub properties: Vec<ObjectProperty>,
}

/// Retained attribute data for one object, ready for report assembly.
#[derive(Debug, Clone)]
pub struct AttributeRecord {
    pub object_id: String,
    pub object_name: String,
    pub object_type: String,
    /// Name collisions across attribute sets are last-write-wins in listing
    /// order.
    pub attributes: BTreeMap<String, AttrValue>,
    pub source_file: TargetFile,
}

/// A subfolder whose listing failed during enumeration; siblings were still
/// searched.
#[derive(Debug)]
pub struct SkippedFolder {
    pub folder_id: String,
    pub error: RemoteError,
}

/// A file whose entity or attribute retrieval failed; its records were
/// discarded and aggregation moved on.
#[derive(Debug)]
pub struct SkippedFile {
    pub file: TargetFile,
    pub error: RemoteError,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_value_display_integral_without_decimal_point() {
        assert_eq!(AttrValue::Number(60.0).to_string(), "60");
        assert_eq!(AttrValue::Number(-3.0).to_string(), "-3");
    }

    #[test]
    fn attr_value_display_fractional() {
        assert_eq!(AttrValue::Number(0.25).to_string(), "0.25");
    }

    #[test]
    fn attr_value_display_text() {
        assert_eq!(AttrValue::Text("F60".to_string()).to_string(), "F60");
    }

    #[test]
    fn path_string_joins_ancestors() {
        let file = TargetFile {
            id: "f1".to_string(),
            name: "tower.ifc".to_string(),
            size: 1024,
            path: vec!["Project".to_string(), "Models".to_string()],
        };
        assert_eq!(file.path_string(), "Project > Models");
    }

    #[test]
    fn path_string_empty_for_root_level_file() {
        let file = TargetFile {
            id: "f1".to_string(),
            name: "tower.ifc".to_string(),
            size: 0,
            path: vec![],
        };
        assert_eq!(file.path_string(), "");
    }
}
