use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::filter::{FieldOptions, FilterInput, FilterKind};

pub const DEFAULT_CONFIG_PATH: &str = ".simlog-filter.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// CSV log loaded at startup
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub filters: FilterOptionsConfig,
    /// Filters applied right after the log is loaded
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub startup_filters: Vec<StartupFilter>,

    // This field is not serialized, just used at runtime
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Physical chip layout, which drives the Cluster and Quad choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_chips")]
    pub chips: u32,
    #[serde(default = "default_dies")]
    pub dies: Vec<String>,
    #[serde(default = "default_quads")]
    pub quads: Vec<String>,
    #[serde(default = "default_clusters_per_side")]
    pub clusters_per_side: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterOptionsConfig {
    #[serde(default = "default_io")]
    pub io: Vec<String>,
    #[serde(default = "default_areas")]
    pub areas: Vec<String>,
    #[serde(default = "default_units")]
    pub units: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartupFilter {
    /// Filter name as shown in the menu ("Area", "Cluster", "ThreadId", ...)
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tids: Vec<u64>,
}

impl StartupFilter {
    /// The inputs to apply, in order. ThreadId yields one input per ID.
    pub fn inputs(&self) -> anyhow::Result<(FilterKind, Vec<FilterInput>)> {
        let kind: FilterKind = self.kind.parse()?;
        let inputs = if kind.is_thread_id() {
            self.tids.iter().map(|tid| FilterInput::tid(tid.to_string())).collect()
        } else {
            vec![FilterInput::selection(self.values.clone())]
        };
        Ok((kind, inputs))
    }
}

fn default_chips() -> u32 {
    1
}

fn default_dies() -> Vec<String> {
    to_strings(&["DIE1", "DIE2"])
}

fn default_quads() -> Vec<String> {
    to_strings(&["NW", "NE", "SW", "SE"])
}

fn default_clusters_per_side() -> u32 {
    8
}

fn default_io() -> Vec<String> {
    to_strings(&["in", "out"])
}

fn default_areas() -> Vec<String> {
    to_strings(&["Core", "Quad", "Die", "HostInterface"])
}

fn default_units() -> Vec<String> {
    to_strings(&[
        "BMT", "H2G", "G2H", "PCIE", "CBU", "TCU", "ECORE", "CBUS_INJ", "CBUS_CLT", "NFI_INJ", "NFI_CLT", "EQ",
        "IRQA", "IQR", "IQD", "BIN",
    ])
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            chips: default_chips(),
            dies: default_dies(),
            quads: default_quads(),
            clusters_per_side: default_clusters_per_side(),
        }
    }
}

impl Default for FilterOptionsConfig {
    fn default() -> Self {
        Self {
            io: default_io(),
            areas: default_areas(),
            units: default_units(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_file: None,
            layout: LayoutConfig::default(),
            filters: FilterOptionsConfig::default(),
            startup_filters: Vec::new(),
            config_path: None,
        }
    }
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| format!("Invalid config {}", path.display()))?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let layout = &self.layout;
        if layout.chips == 0 {
            bail!("layout.chips must be at least 1");
        }
        if layout.clusters_per_side == 0 {
            bail!("layout.clusters_per_side must be at least 1");
        }
        // The second-die mirroring rule assumes a 2x2 quad grid
        if layout.quads.len() != 4 {
            bail!("layout.quads must name exactly 4 quads, got {}", layout.quads.len());
        }

        let lists = [
            ("layout.dies", &layout.dies),
            ("layout.quads", &layout.quads),
            ("filters.io", &self.filters.io),
            ("filters.areas", &self.filters.areas),
            ("filters.units", &self.filters.units),
        ];
        for (name, list) in lists {
            if list.is_empty() {
                bail!("{} cannot be empty", name);
            }
            let mut seen = HashSet::new();
            for item in list {
                if !seen.insert(item.as_str()) {
                    bail!("{} contains '{}' twice", name, item);
                }
            }
        }

        for startup in &self.startup_filters {
            startup
                .inputs()
                .with_context(|| format!("Invalid startup filter '{}'", startup.kind))?;
        }

        Ok(())
    }

    /// Field schema for every filter kind
    pub fn filter_schema(&self) -> Vec<(FilterKind, Vec<FieldOptions>)> {
        let layout = &self.layout;
        let chips: Vec<String> = (0..layout.chips).map(|n| n.to_string()).collect();
        let coords: Vec<String> = (0..layout.clusters_per_side).map(|n| n.to_string()).collect();
        let placement = || {
            vec![
                FieldOptions::new("chip", chips.clone()),
                FieldOptions::new("die", layout.dies.clone()),
                FieldOptions::new("quad", layout.quads.clone()),
            ]
        };

        let mut cluster = placement();
        cluster.push(FieldOptions::new("row", coords.clone()));
        cluster.push(FieldOptions::new("column", coords));

        vec![
            (FilterKind::IoDirection, vec![FieldOptions::new("in/out", self.filters.io.clone())]),
            (FilterKind::Cluster, cluster),
            (FilterKind::Quad, placement()),
            (FilterKind::ThreadId, vec![FieldOptions::free_form("TID")]),
            (FilterKind::Area, vec![FieldOptions::new("Area", self.filters.areas.clone())]),
            (FilterKind::Unit, vec![FieldOptions::new("Unit", self.filters.units.clone())]),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_file_uses_defaults() {
        let temp_file = NamedTempFile::new().unwrap();
        let config = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(config.layout.dies, vec!["DIE1", "DIE2"]);
        assert_eq!(config.layout.clusters_per_side, 8);
        assert!(config.log_file.is_none());
        assert_eq!(config.config_path.as_deref(), Some(temp_file.path()));
        config.validate().unwrap();
    }

    #[test]
    fn test_load_layout_and_startup_filters() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
log_file = "run/events.csv"

[layout]
clusters_per_side = 4

[filters]
areas = ["Core", "Die"]

[[startup_filters]]
kind = "Area"
values = {{ Area = "Core" }}

[[startup_filters]]
kind = "ThreadId"
tids = [3, 9]
"#
        )
        .unwrap();

        let config = Config::from_file(temp_file.path()).unwrap();
        config.validate().unwrap();
        assert_eq!(config.log_file, Some(PathBuf::from("run/events.csv")));
        assert_eq!(config.layout.clusters_per_side, 4);
        assert_eq!(config.layout.quads.len(), 4);
        assert_eq!(config.filters.areas, vec!["Core", "Die"]);
        assert_eq!(config.startup_filters.len(), 2);

        let (kind, inputs) = config.startup_filters[1].inputs().unwrap();
        assert_eq!(kind, FilterKind::ThreadId);
        assert_eq!(inputs, vec![FilterInput::tid("3"), FilterInput::tid("9")]);
    }

    #[test]
    fn test_invalid_toml_is_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "layout = [").unwrap();
        assert!(Config::from_file(temp_file.path()).is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_quad_count() {
        let mut config = Config::default();
        config.layout.quads.pop();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_duplicates() {
        let mut config = Config::default();
        config.filters.units.push("TCU".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("TCU"), "got: {}", err);
    }

    #[test]
    fn test_validate_rejects_unknown_startup_filter() {
        let mut config = Config::default();
        config.startup_filters.push(StartupFilter {
            kind: "TimeRange".to_string(),
            values: BTreeMap::new(),
            tids: Vec::new(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_schema_sizes_follow_layout() {
        let mut config = Config::default();
        config.layout.clusters_per_side = 3;
        let schema = config.filter_schema();
        let (_, cluster) = schema.iter().find(|(k, _)| *k == FilterKind::Cluster).unwrap();
        let names: Vec<&str> = cluster.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["chip", "die", "quad", "row", "column"]);
        assert_eq!(cluster[3].choices, vec!["0", "1", "2"]);
    }

    #[test]
    fn test_save_and_reload() {
        let mut config = Config::default();
        config.log_file = Some(PathBuf::from("events.csv"));

        let temp_file = NamedTempFile::new().unwrap();
        config.save(temp_file.path()).unwrap();

        let loaded = Config::from_file(temp_file.path()).unwrap();
        assert_eq!(loaded.log_file, config.log_file);
        assert_eq!(loaded.filters.units, config.filters.units);
    }
}
