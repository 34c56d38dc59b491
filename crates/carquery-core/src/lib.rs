//! # CarQuery Core
//!
//! Core types and implementations for the CarQuery listing engine: the
//! immutable record store, filter specs and predicates, the query executor,
//! the aggregator and the recommendation tagger.
//!
//! Every operation is a pure function of its inputs and a store snapshot.
//! Specs are validated up front; once validated, running them cannot fail.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod query;
#[allow(missing_docs)]
pub mod record;
pub mod store;
pub mod tag;

pub use error::{Error, Result};
pub use record::{Attribute, AttributeKind, Value, VehicleRecord};
pub use store::{RecordId, RecordPolicy, RecordStore};
pub use tag::{tag, RuleRegistry, TagRule, TagTable};
