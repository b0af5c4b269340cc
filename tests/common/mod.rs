#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use simlog_filter::config::Config;
use simlog_filter::filter::{ActiveCriteria, FilterRegistry, FilterSnapshot};
use simlog_filter::log::{ClusterCoord, FilteredView, InMemoryDataset, IoDirection, LogDataset, LogRecord};
use simlog_filter::session::{FilterSession, Presenter};

/// Helper to create a record with the fields filters care about
pub fn record(id: u64, tid: u64, cluster: ClusterCoord, area: &str, unit: &str, io: Option<IoDirection>) -> LogRecord {
    LogRecord {
        id,
        timestamp: (id + 1) * 10,
        tid,
        cluster,
        area: area.to_string(),
        unit: unit.to_string(),
        io,
        packet: format!("pkt{}", id),
    }
}

/// Six records spread over both dies, several areas, units and threads
pub fn sample_records() -> Vec<LogRecord> {
    vec![
        record(0, 7, ClusterCoord::new(0, 0, 0, 1, 2), "Core", "TCU", Some(IoDirection::In)),
        record(1, 7, ClusterCoord::new(0, 0, 1, 0, 0), "Core", "BMT", Some(IoDirection::Out)),
        record(2, 42, ClusterCoord::new(0, 1, 2, 3, 4), "Die", "TCU", Some(IoDirection::In)),
        record(3, 42, ClusterCoord::new(0, 1, 2, 3, 4), "Core", "CBU", Some(IoDirection::Out)),
        record(4, 9, ClusterCoord::new(0, 1, 0, 7, 7), "HostInterface", "PCIE", Some(IoDirection::In)),
        record(5, 13, ClusterCoord::new(0, 0, 3, 5, 5), "Quad", "EQ", None),
    ]
}

/// Helper to create a registry with the default layout
pub fn create_test_registry() -> FilterRegistry {
    FilterRegistry::new(Config::default().filter_schema()).unwrap()
}

pub fn create_test_dataset() -> InMemoryDataset {
    InMemoryDataset::new(sample_records())
}

/// Ids of the visible records, in log order
pub fn visible_ids(dataset: &InMemoryDataset) -> Vec<u64> {
    dataset.visible().map(|r| r.id).collect()
}

/// Presenter that remembers every refresh it received
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub refreshes: Vec<(FilterSnapshot, FilteredView)>,
}

impl RecordingPresenter {
    pub fn count(&self) -> usize {
        self.refreshes.len()
    }

    pub fn last(&self) -> Option<&(FilterSnapshot, FilteredView)> {
        self.refreshes.last()
    }
}

impl Presenter for RecordingPresenter {
    fn refresh_display(&mut self, snapshot: &FilterSnapshot, view: &FilteredView) {
        self.refreshes.push((snapshot.clone(), view.clone()));
    }
}

pub type TestSession = FilterSession<InMemoryDataset, RecordingPresenter>;

pub fn create_test_session() -> TestSession {
    FilterSession::new(create_test_registry(), create_test_dataset(), RecordingPresenter::default())
}

/// Dataset that takes a while to recompute and tracks how many recomputations overlap
pub struct SlowDataset {
    inner: InMemoryDataset,
    delay: Duration,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
    /// Number of criteria of every request, in the order they were applied
    pub applied: Arc<Mutex<Vec<usize>>>,
}

impl SlowDataset {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: create_test_dataset(),
            delay,
            in_flight: Arc::new(AtomicUsize::new(0)),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            applied: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl LogDataset for SlowDataset {
    fn apply_predicate(&mut self, criteria: &[ActiveCriteria]) -> FilteredView {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        std::thread::sleep(self.delay);
        let view = self.inner.apply_predicate(criteria);
        self.applied.lock().unwrap().push(criteria.len());

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        view
    }
}
