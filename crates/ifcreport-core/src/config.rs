use config::{Config, ConfigError, File as ConfigFile};
use serde::Deserialize;

/// Search configuration, loaded once per session and passed read-only into
/// each search. Callers running concurrent searches must give each its own
/// clone so a mid-update never becomes visible half-applied.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Descend into subfolders when resolving the target folder by name.
    #[serde(default = "default_true")]
    pub recursive_folder_search: bool,

    /// Descend into subfolders of the resolved folder when collecting files.
    #[serde(default = "default_true")]
    pub recursive_file_search: bool,

    /// Attribute sets to retain. A name matches every attribute it prefixes;
    /// `"*"` retains everything.
    #[serde(default = "default_attribute_sets")]
    pub attribute_set_names: Vec<String>,

    /// Leading report columns, in user-chosen order. Discovered attribute
    /// columns are appended after these.
    #[serde(default = "default_column_order")]
    pub base_column_order: Vec<String>,

    /// File-name suffix that makes a file a report target.
    #[serde(default = "default_target_suffix")]
    pub target_suffix: String,

    /// Base name for exported report files.
    #[serde(default = "default_report_base_name")]
    pub report_base_name: String,
}

fn default_true() -> bool {
    true
}

fn default_attribute_sets() -> Vec<String> {
    vec![
        "Pset_WallCommon".to_string(),
        "Pset_SlabCommon".to_string(),
        "Pset_WindowCommon".to_string(),
        "Pset_DoorCommon".to_string(),
    ]
}

fn default_column_order() -> Vec<String> {
    vec![
        "Object Name".to_string(),
        "Model Name".to_string(),
        "Model Path".to_string(),
    ]
}

fn default_target_suffix() -> String {
    ".ifc".to_string()
}

fn default_report_base_name() -> String {
    "IFC_Properties_Report".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            recursive_folder_search: true,
            recursive_file_search: true,
            attribute_set_names: default_attribute_sets(),
            base_column_order: default_column_order(),
            target_suffix: default_target_suffix(),
            report_base_name: default_report_base_name(),
        }
    }
}

impl SearchConfig {
    /// Whether an attribute survives the inclusion filter: some configured
    /// set name is a prefix of the attribute's name (attribute names follow
    /// the `<SetName>.<PropertyName>` convention), or `"*"` is configured.
    pub fn includes_attribute(&self, attribute_name: &str) -> bool {
        self.attribute_set_names
            .iter()
            .any(|set| set == "*" || attribute_name.starts_with(set.as_str()))
    }

    /// Whether a file name matches the configured target suffix,
    /// case-insensitively.
    pub fn matches_target(&self, file_name: &str) -> bool {
        file_name
            .to_lowercase()
            .ends_with(&self.target_suffix.to_lowercase())
    }
}

/// Merge `Config.toml` (if present) over the built-in defaults.
pub fn load_configuration() -> Result<SearchConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .build()?;
    builder.try_deserialize::<SearchConfig>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_builtin_configuration() {
        let cfg = SearchConfig::default();
        assert!(cfg.recursive_folder_search);
        assert!(cfg.recursive_file_search);
        assert_eq!(cfg.attribute_set_names.len(), 4);
        assert_eq!(
            cfg.base_column_order,
            vec!["Object Name", "Model Name", "Model Path"]
        );
        assert_eq!(cfg.target_suffix, ".ifc");
        assert_eq!(cfg.report_base_name, "IFC_Properties_Report");
    }

    #[test]
    fn attribute_filter_matches_by_prefix() {
        let cfg = SearchConfig {
            attribute_set_names: vec!["Pset_WallCommon".to_string()],
            ..SearchConfig::default()
        };
        assert!(cfg.includes_attribute("Pset_WallCommon.FireRating"));
        assert!(!cfg.includes_attribute("Pset_DoorCommon.Width"));
    }

    #[test]
    fn attribute_filter_wildcard_matches_everything() {
        let cfg = SearchConfig {
            attribute_set_names: vec!["*".to_string()],
            ..SearchConfig::default()
        };
        assert!(cfg.includes_attribute("Pset_WallCommon.FireRating"));
        assert!(cfg.includes_attribute("Pset_DoorCommon.Width"));
        assert!(cfg.includes_attribute("Anything.AtAll"));
    }

    #[test]
    fn attribute_filter_rejects_everything_when_no_sets_configured() {
        let cfg = SearchConfig {
            attribute_set_names: vec![],
            ..SearchConfig::default()
        };
        assert!(!cfg.includes_attribute("Pset_WallCommon.FireRating"));
    }

    #[test]
    fn target_suffix_match_is_case_insensitive() {
        let cfg = SearchConfig::default();
        assert!(cfg.matches_target("building.ifc"));
        assert!(cfg.matches_target("BUILDING.IFC"));
        assert!(!cfg.matches_target("notes.txt"));
    }
}
