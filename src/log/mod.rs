use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::filter::{ActiveCriteria, Criteria, FieldValue, FilterKind};

pub mod dataset;
pub mod file;

pub use dataset::{FilteredView, InMemoryDataset, LogDataset};
pub use file::load_csv;

/// Direction of a packet relative to the logging component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IoDirection {
    In,
    Out,
}

impl IoDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            IoDirection::In => "in",
            IoDirection::Out => "out",
        }
    }
}

impl FromStr for IoDirection {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" => Ok(IoDirection::In),
            "out" => Ok(IoDirection::Out),
            other => Err(anyhow!("Invalid IO direction '{}'", other)),
        }
    }
}

/// Physical location of a cluster on the chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClusterCoord {
    pub chip: u32,
    pub die: u32,
    pub quad: u32,
    pub row: u32,
    pub column: u32,
}

impl ClusterCoord {
    pub fn new(chip: u32, die: u32, quad: u32, row: u32, column: u32) -> Self {
        Self {
            chip,
            die,
            quad,
            row,
            column,
        }
    }
}

impl fmt::Display for ClusterCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}:{}", self.chip, self.die, self.quad, self.row, self.column)
    }
}

impl FromStr for ClusterCoord {
    type Err = anyhow::Error;

    /// Parses `chip:die:quad:row:col`; `.` is accepted as separator too
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = s.trim().split([':', '.']).collect();
        if parts.len() != 5 {
            bail!("Invalid cluster id '{}': expected chip:die:quad:row:col", s.trim());
        }
        let mut nums = [0u32; 5];
        for (slot, part) in nums.iter_mut().zip(&parts) {
            *slot = part
                .parse()
                .map_err(|_| anyhow!("Invalid cluster id '{}': '{}' is not a number", s.trim(), part))?;
        }
        Ok(Self::new(nums[0], nums[1], nums[2], nums[3], nums[4]))
    }
}

/// One event from the simulator log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Position in the source log, starting at 0
    pub id: u64,
    /// Simulator time stamp
    pub timestamp: u64,
    pub tid: u64,
    pub cluster: ClusterCoord,
    pub area: String,
    pub unit: String,
    pub io: Option<IoDirection>,
    pub packet: String,
}

impl LogRecord {
    /// Look up a filter field by name (case-insensitive)
    pub fn field(&self, name: &str) -> Option<FieldValue> {
        let int = |n: u32| Some(FieldValue::Int(i64::from(n)));
        match name.to_ascii_lowercase().as_str() {
            "chip" => int(self.cluster.chip),
            "die" => int(self.cluster.die),
            "quad" => int(self.cluster.quad),
            "row" => int(self.cluster.row),
            "column" | "col" => int(self.cluster.column),
            "tid" => i64::try_from(self.tid).ok().map(FieldValue::Int),
            "area" => Some(FieldValue::Text(self.area.clone())),
            "unit" => Some(FieldValue::Text(self.unit.clone())),
            "in/out" | "io" => self.io.map(|io| FieldValue::Text(io.as_str().to_string())),
            _ => None,
        }
    }

    /// Whether this record passes one filter's criteria
    pub fn matches(&self, active: &ActiveCriteria) -> bool {
        match &active.criteria {
            Criteria::ThreadIds(tids) => tids.binary_search(&self.tid).is_ok(),
            Criteria::Fields(fields) => fields
                .iter()
                .all(|f| self.field(&f.name).as_ref() == Some(&f.value)),
            Criteria::Value(value) => self.matches_bare(active.kind, value),
        }
    }

    fn matches_bare(&self, kind: FilterKind, value: &FieldValue) -> bool {
        match kind {
            FilterKind::IoDirection => self.io.map(|io| io.as_str()) == value.as_text(),
            FilterKind::Area => value.as_text() == Some(self.area.as_str()),
            FilterKind::Unit => value.as_text() == Some(self.unit.as_str()),
            FilterKind::ThreadId => value.as_int() == i64::try_from(self.tid).ok(),
            // Cluster and Quad are always multi-field
            FilterKind::Cluster | FilterKind::Quad => false,
        }
    }
}
