//! Chained, stateful log filters.
//!
//! A `FilterRegistry` owns one `Filter` per `FilterKind`. Every mutation yields a
//! `ChainRequest` carrying the complete set of active criteria, and the
//! `FilterChainApplier` always recomputes the view from the unfiltered base.

mod chain;
mod entity;
mod error;
mod kind;
mod registry;
mod snapshot;
mod value;

pub use chain::{ChainOp, ChainRequest, FilterChainApplier};
pub use entity::{Filter, FilterValues};
pub use error::FilterError;
pub use kind::FilterKind;
pub use registry::FilterRegistry;
pub use snapshot::{FilterSnapshot, FilterStatus};
pub use value::{ActiveCriteria, Criteria, Field, FieldOptions, FieldValue, FilterInput, ReadyValues};
