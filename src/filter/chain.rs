use std::fmt;
use std::time::Instant;

use tracing::debug;

use crate::log::{FilteredView, LogDataset};

use super::kind::FilterKind;
use super::registry::FilterRegistry;
use super::value::ActiveCriteria;

/// What caused a recomputation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainOp {
    /// A previously inert filter was committed
    Activate(FilterKind),
    /// An active filter was re-committed with new values
    Update(FilterKind),
    Remove(FilterKind),
    ClearAll,
}

impl fmt::Display for ChainOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainOp::Activate(kind) => write!(f, "activate {}", kind),
            ChainOp::Update(kind) => write!(f, "update {}", kind),
            ChainOp::Remove(kind) => write!(f, "remove {}", kind),
            ChainOp::ClearAll => f.write_str("clear all"),
        }
    }
}

/// A recomputation to run against the base dataset.
/// `criteria` is always the complete active set, never a delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRequest {
    pub op: ChainOp,
    pub criteria: Vec<ActiveCriteria>,
}

impl ChainRequest {
    pub fn is_unfiltered(&self) -> bool {
        self.criteria.is_empty()
    }
}

/// Turns registry state into dataset recomputations
pub struct FilterChainApplier;

impl FilterChainApplier {
    /// Build the request for `op` from every filter that is active after the mutation
    pub fn request(op: ChainOp, registry: &FilterRegistry) -> ChainRequest {
        let criteria = match op {
            ChainOp::ClearAll => Vec::new(),
            _ => registry.active_criteria(),
        };
        ChainRequest { op, criteria }
    }

    /// Recompute the dataset's view from its unfiltered base
    pub fn apply<D: LogDataset + ?Sized>(dataset: &mut D, request: &ChainRequest) -> FilteredView {
        let start = Instant::now();
        let view = dataset.apply_predicate(&request.criteria);
        debug!(
            op = %request.op,
            filters = request.criteria.len(),
            visible = view.visible,
            total = view.total,
            elapsed_us = start.elapsed().as_micros() as u64,
            "recomputed filtered view"
        );
        view
    }
}
