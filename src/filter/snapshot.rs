use serde::{Deserialize, Serialize};

use super::kind::FilterKind;
use super::value::{Criteria, ReadyValues};

/// Declarative state of one filter, as handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStatus {
    pub kind: FilterKind,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ready: Option<ReadyValues>,
}

impl FilterStatus {
    /// Menu entry text; active filters carry a check mark
    pub fn menu_label(&self) -> String {
        if self.active {
            format!("{}  ✓", self.kind)
        } else {
            self.kind.to_string()
        }
    }

    /// Hover text describing what the filter is doing
    pub fn tooltip(&self) -> String {
        match (&self.ready, self.active) {
            (Some(ReadyValues::ThreadIds(tids)), true) => {
                let tids: Vec<String> = tids.iter().map(|t| t.to_string()).collect();
                format!("This filter is filtering by: TID: [{}]", tids.join(", "))
            }
            (Some(ReadyValues::Fields(fields)), true) => {
                let parts: Vec<String> = fields.iter().map(|f| format!("{}: {}", f.name, f.value)).collect();
                format!("This filter is filtering by: {}", parts.join(", "))
            }
            _ => "This filter is inactive".to_string(),
        }
    }

    pub fn criteria(&self) -> Option<Criteria> {
        self.ready.as_ref().filter(|_| self.active).map(Criteria::from_ready)
    }
}

/// Full filter state, rebuilt after every mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSnapshot {
    pub filters: Vec<FilterStatus>,
}

impl FilterSnapshot {
    pub fn status(&self, kind: FilterKind) -> Option<&FilterStatus> {
        self.filters.iter().find(|s| s.kind == kind)
    }

    pub fn active_kinds(&self) -> Vec<FilterKind> {
        self.filters.iter().filter(|s| s.active).map(|s| s.kind).collect()
    }

    pub fn active_count(&self) -> usize {
        self.filters.iter().filter(|s| s.active).count()
    }

    /// One menu line per filter, followed by the clear button
    pub fn render_menu(&self) -> String {
        let mut out = String::new();
        for status in &self.filters {
            out.push_str(&status.menu_label());
            out.push('\n');
        }
        out.push_str("[Clear Filters]");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::value::Field;

    #[test]
    fn test_inactive_tooltip() {
        let status = FilterStatus {
            kind: FilterKind::Area,
            active: false,
            ready: None,
        };
        assert_eq!(status.tooltip(), "This filter is inactive");
        assert_eq!(status.menu_label(), "Area");
        assert!(status.criteria().is_none());
    }

    #[test]
    fn test_field_tooltip() {
        let status = FilterStatus {
            kind: FilterKind::Quad,
            active: true,
            ready: Some(ReadyValues::Fields(vec![
                Field::new("chip", 0),
                Field::new("die", 1),
                Field::new("quad", 3),
            ])),
        };
        assert_eq!(status.tooltip(), "This filter is filtering by: chip: 0, die: 1, quad: 3");
        assert_eq!(status.menu_label(), "Quad  ✓");
    }

    #[test]
    fn test_tid_tooltip() {
        let status = FilterStatus {
            kind: FilterKind::ThreadId,
            active: true,
            ready: Some(ReadyValues::ThreadIds(vec![7, 42])),
        };
        assert_eq!(status.tooltip(), "This filter is filtering by: TID: [7, 42]");
    }
}
