use tracing::{info, warn};

use super::chain::{ChainOp, ChainRequest, FilterChainApplier};
use super::entity::Filter;
use super::error::FilterError;
use super::kind::FilterKind;
use super::snapshot::{FilterSnapshot, FilterStatus};
use super::value::{ActiveCriteria, Criteria, FieldOptions, FilterInput, ReadyValues};

/// Owns exactly one `Filter` per kind for the lifetime of a session
#[derive(Debug, Clone)]
pub struct FilterRegistry {
    /// Indexed by `FilterKind::index()`
    filters: Vec<Filter>,
}

impl FilterRegistry {
    /// Build every filter from its schema. Each kind must appear exactly once.
    pub fn new(schema: Vec<(FilterKind, Vec<FieldOptions>)>) -> Result<Self, FilterError> {
        let mut slots: Vec<Option<Filter>> = FilterKind::ALL.iter().map(|_| None).collect();
        for (kind, options) in schema {
            let slot = &mut slots[kind.index()];
            if slot.is_some() {
                return Err(FilterError::configuration(format!("{} is configured twice", kind)));
            }
            *slot = Some(Filter::configure(kind, options)?);
        }

        let mut filters = Vec::with_capacity(slots.len());
        for (kind, slot) in FilterKind::ALL.iter().zip(slots) {
            match slot {
                Some(filter) => filters.push(filter),
                None => return Err(FilterError::configuration(format!("{} has no schema", kind))),
            }
        }
        Ok(Self { filters })
    }

    pub fn filter(&self, kind: FilterKind) -> &Filter {
        &self.filters[kind.index()]
    }

    pub fn filters(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn is_active(&self, kind: FilterKind) -> bool {
        self.filter(kind).is_active()
    }

    pub fn ready_for_filter(&self, kind: FilterKind) -> Option<&ReadyValues> {
        self.filter(kind).ready_for_filter()
    }

    /// Commit `input` and route it as activation or update depending on current state
    pub fn apply(&mut self, kind: FilterKind, input: FilterInput) -> Result<ChainRequest, FilterError> {
        let was_active = self.is_active(kind);
        self.commit(kind, input)?;
        let op = if was_active {
            ChainOp::Update(kind)
        } else {
            ChainOp::Activate(kind)
        };
        Ok(self.request(op))
    }

    /// First activation of a filter. An already-active filter is routed as an update.
    pub fn activate(&mut self, kind: FilterKind, input: FilterInput) -> Result<ChainRequest, FilterError> {
        self.apply(kind, input)
    }

    /// Re-commit an active filter. An inert filter is treated as activation.
    pub fn update(&mut self, kind: FilterKind, input: FilterInput) -> Result<ChainRequest, FilterError> {
        self.apply(kind, input)
    }

    /// Drop one thread ID; removing the last one removes the whole ThreadId filter
    pub fn remove_thread_id(&mut self, tid: u64) -> Result<ChainRequest, FilterError> {
        let filter = &mut self.filters[FilterKind::ThreadId.index()];
        if let Err(e) = filter.deactivate_one(tid) {
            warn!(tid, error = %e, "thread id removal rejected");
            return Err(e);
        }
        if filter.is_active() {
            info!(tid, remaining = ?filter.thread_ids(), "removed thread id");
            Ok(self.request(ChainOp::Update(FilterKind::ThreadId)))
        } else {
            info!(tid, "removed last thread id");
            Ok(self.request(ChainOp::Remove(FilterKind::ThreadId)))
        }
    }

    /// Deactivate a filter. An inert filter yields no request, since nothing changed.
    pub fn remove(&mut self, kind: FilterKind) -> Option<ChainRequest> {
        let filter = &mut self.filters[kind.index()];
        if !filter.is_active() {
            return None;
        }
        filter.reset();
        info!(filter = %kind, "filter removed");
        Some(self.request(ChainOp::Remove(kind)))
    }

    /// Reset every filter to inert
    pub fn clear_all(&mut self) -> ChainRequest {
        for filter in &mut self.filters {
            filter.reset();
        }
        info!("all filters cleared");
        self.request(ChainOp::ClearAll)
    }

    /// Criteria of every active filter, in menu order
    pub fn active_criteria(&self) -> Vec<ActiveCriteria> {
        self.filters
            .iter()
            .filter(|f| f.is_active())
            .filter_map(|f| {
                f.ready_for_filter().map(|ready| ActiveCriteria {
                    kind: f.kind(),
                    criteria: Criteria::from_ready(ready),
                })
            })
            .collect()
    }

    pub fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            filters: self
                .filters
                .iter()
                .map(|f| FilterStatus {
                    kind: f.kind(),
                    active: f.is_active(),
                    ready: f.ready_for_filter().cloned(),
                })
                .collect(),
        }
    }

    fn commit(&mut self, kind: FilterKind, input: FilterInput) -> Result<(), FilterError> {
        let filter = &mut self.filters[kind.index()];
        let result = filter.stage(input).and_then(|_| filter.commit());
        match &result {
            Ok(()) => {
                if let Some(ready) = filter.ready_for_filter() {
                    info!(filter = %kind, values = %Criteria::from_ready(ready), "filter applied");
                }
            }
            Err(e) => warn!(filter = %kind, error = %e, "filter input rejected"),
        }
        result
    }

    fn request(&self, op: ChainOp) -> ChainRequest {
        FilterChainApplier::request(op, self)
    }
}
