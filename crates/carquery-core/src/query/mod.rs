//! Query engine module
//!
//! Filter specs, predicate compilation, query execution, aggregation and
//! descriptive statistics over a record store.

/// Grouped aggregation and pivots
#[allow(missing_docs)]
pub mod aggregate;
/// Query executor
#[allow(missing_docs)]
pub mod executor;
/// Filter specification types
#[allow(missing_docs)]
pub mod filter;
/// Predicate builder
pub mod predicate;
/// Descriptive statistics
#[allow(missing_docs)]
pub mod stats;

// Re-export main types
pub use aggregate::{
    aggregate, AggregateFunction, Aggregation, AggregationSpec, Aggregator, GroupKey, Groups,
};
pub use executor::{Executor, Query, Row, SortDirection, SortKey};
pub use filter::{Bound, Constraint, FilterSpec, Literal};
pub use predicate::Predicate;
pub use stats::{Summary, ValueCounts};
