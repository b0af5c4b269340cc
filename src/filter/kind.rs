use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::FilterError;

/// The dimensions a log view can be filtered on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilterKind {
    IoDirection,
    Cluster,
    Quad,
    ThreadId,
    Area,
    Unit,
}

impl FilterKind {
    /// All kinds, in the order the filter menu lists them
    pub const ALL: [FilterKind; 6] = [
        FilterKind::IoDirection,
        FilterKind::Cluster,
        FilterKind::Quad,
        FilterKind::ThreadId,
        FilterKind::Area,
        FilterKind::Unit,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FilterKind::IoDirection => "IO",
            FilterKind::Cluster => "Cluster",
            FilterKind::Quad => "Quad",
            FilterKind::ThreadId => "ThreadId",
            FilterKind::Area => "Area",
            FilterKind::Unit => "Unit",
        }
    }

    /// Position of this kind within `ALL`
    pub fn index(self) -> usize {
        match self {
            FilterKind::IoDirection => 0,
            FilterKind::Cluster => 1,
            FilterKind::Quad => 2,
            FilterKind::ThreadId => 3,
            FilterKind::Area => 4,
            FilterKind::Unit => 5,
        }
    }

    pub fn is_thread_id(self) -> bool {
        matches!(self, FilterKind::ThreadId)
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for FilterKind {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "io" | "iodirection" | "in/out" => Ok(FilterKind::IoDirection),
            "cluster" => Ok(FilterKind::Cluster),
            "quad" => Ok(FilterKind::Quad),
            "threadid" | "tid" | "thread" => Ok(FilterKind::ThreadId),
            "area" => Ok(FilterKind::Area),
            "unit" => Ok(FilterKind::Unit),
            _ => Err(FilterError::UnknownFilter(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_menu_order() {
        for (i, kind) in FilterKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("IO".parse::<FilterKind>().unwrap(), FilterKind::IoDirection);
        assert_eq!("threadid".parse::<FilterKind>().unwrap(), FilterKind::ThreadId);
        assert_eq!(" tid ".parse::<FilterKind>().unwrap(), FilterKind::ThreadId);
        assert_eq!("Cluster".parse::<FilterKind>().unwrap(), FilterKind::Cluster);
        assert_eq!("UNIT".parse::<FilterKind>().unwrap(), FilterKind::Unit);
    }

    #[test]
    fn test_parse_unknown_kind() {
        match "TimeRange".parse::<FilterKind>() {
            Err(FilterError::UnknownFilter(name)) => assert_eq!(name, "TimeRange"),
            other => panic!("Expected UnknownFilter, got {:?}", other),
        }
    }

    #[test]
    fn test_display_uses_menu_name() {
        assert_eq!(FilterKind::IoDirection.to_string(), "IO");
        assert_eq!(FilterKind::ThreadId.to_string(), "ThreadId");
    }
}
