use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{ClusterCoord, LogRecord};
use crate::filter::{ActiveCriteria, FilterKind};

/// Summary of a recomputed view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredView {
    /// Records passing every active filter
    pub visible: usize,
    /// Records in the unfiltered base
    pub total: usize,
    /// Thread IDs still reachable under every non-ThreadId filter
    pub selectable_tids: Vec<u64>,
}

/// A log collection the filter chain can be applied to
pub trait LogDataset {
    /// Replace the current view with the records passing all `criteria`,
    /// evaluated over the unfiltered base
    fn apply_predicate(&mut self, criteria: &[ActiveCriteria]) -> FilteredView;
}

/// Base records held in memory plus the indices of the current view
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    records: Vec<LogRecord>,
    /// Indices into `records`, in log order
    view: Vec<usize>,
    selectable_tids: Vec<u64>,
}

impl InMemoryDataset {
    /// Create a dataset whose view starts unfiltered
    pub fn new(records: Vec<LogRecord>) -> Self {
        let mut dataset = Self {
            records,
            view: Vec::new(),
            selectable_tids: Vec::new(),
        };
        dataset.apply_predicate(&[]);
        dataset
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn base(&self) -> &[LogRecord] {
        &self.records
    }

    /// Records in the current view
    pub fn visible(&self) -> impl Iterator<Item = &LogRecord> {
        self.view.iter().map(|&i| &self.records[i])
    }

    pub fn visible_count(&self) -> usize {
        self.view.len()
    }

    /// Last `n` visible records
    pub fn visible_tail(&self, n: usize) -> Vec<&LogRecord> {
        let skip = self.view.len().saturating_sub(n);
        self.visible().skip(skip).collect()
    }

    pub fn selectable_thread_ids(&self) -> &[u64] {
        &self.selectable_tids
    }

    /// Visible records logged by one cluster
    pub fn component_logs(&self, coord: &ClusterCoord) -> Vec<&LogRecord> {
        self.visible().filter(|r| &r.cluster == coord).collect()
    }

    pub fn view(&self) -> FilteredView {
        FilteredView {
            visible: self.view.len(),
            total: self.records.len(),
            selectable_tids: self.selectable_tids.clone(),
        }
    }
}

impl LogDataset for InMemoryDataset {
    fn apply_predicate(&mut self, criteria: &[ActiveCriteria]) -> FilteredView {
        let mut view = Vec::new();
        let mut tids = BTreeSet::new();

        for (i, record) in self.records.iter().enumerate() {
            let mut passes_others = true;
            let mut passes_tid = true;
            for active in criteria {
                if record.matches(active) {
                    continue;
                }
                if active.kind == FilterKind::ThreadId {
                    passes_tid = false;
                } else {
                    passes_others = false;
                    break;
                }
            }
            if passes_others {
                tids.insert(record.tid);
                if passes_tid {
                    view.push(i);
                }
            }
        }

        self.view = view;
        self.selectable_tids = tids.into_iter().collect();
        self.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::Criteria;
    use crate::log::IoDirection;

    fn rec(id: u64, tid: u64, area: &str, unit: &str) -> LogRecord {
        LogRecord {
            id,
            timestamp: id * 10,
            tid,
            cluster: ClusterCoord::new(0, 0, (id % 4) as u32, 0, 0),
            area: area.to_string(),
            unit: unit.to_string(),
            io: Some(IoDirection::Out),
            packet: String::new(),
        }
    }

    fn dataset() -> InMemoryDataset {
        InMemoryDataset::new(vec![
            rec(0, 1, "Core", "TCU"),
            rec(1, 2, "Core", "CBU"),
            rec(2, 3, "Die", "BMT"),
            rec(3, 1, "Die", "TCU"),
        ])
    }

    fn area(name: &str) -> ActiveCriteria {
        ActiveCriteria {
            kind: FilterKind::Area,
            criteria: Criteria::Value(name.into()),
        }
    }

    fn tids(list: &[u64]) -> ActiveCriteria {
        ActiveCriteria {
            kind: FilterKind::ThreadId,
            criteria: Criteria::ThreadIds(list.to_vec()),
        }
    }

    #[test]
    fn test_new_dataset_is_unfiltered() {
        let data = dataset();
        assert_eq!(data.visible_count(), 4);
        assert_eq!(data.selectable_thread_ids(), &[1, 2, 3]);
    }

    #[test]
    fn test_apply_filters_from_base_each_time() {
        let mut data = dataset();
        let view = data.apply_predicate(&[area("Core")]);
        assert_eq!(view.visible, 2);

        // A wider predicate must bring back records the previous one hid
        let view = data.apply_predicate(&[area("Die")]);
        assert_eq!(view.visible, 2);
        let ids: Vec<u64> = data.visible().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_criteria_are_and_combined() {
        let mut data = dataset();
        let view = data.apply_predicate(&[area("Core"), tids(&[1])]);
        assert_eq!(view.visible, 1);
        assert_eq!(data.visible().next().map(|r| r.id), Some(0));
    }

    #[test]
    fn test_selectable_tids_ignore_thread_filter() {
        let mut data = dataset();
        let view = data.apply_predicate(&[area("Core"), tids(&[1])]);
        assert_eq!(view.selectable_tids, vec![1, 2]);
    }

    #[test]
    fn test_visible_tail() {
        let data = dataset();
        let tail: Vec<u64> = data.visible_tail(2).iter().map(|r| r.id).collect();
        assert_eq!(tail, vec![2, 3]);
        assert_eq!(data.visible_tail(10).len(), 4);
    }

    #[test]
    fn test_component_logs_respect_view() {
        let mut data = dataset();
        let coord = ClusterCoord::new(0, 0, 3, 0, 0);
        assert_eq!(data.component_logs(&coord).len(), 1);
        data.apply_predicate(&[area("Core")]);
        assert!(data.component_logs(&coord).is_empty());
    }
}
