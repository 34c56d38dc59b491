//! # CarQuery
//!
//! An in-memory query and aggregation engine for used-car listings.
//!
//! ## Quick Start
//!
//! ```rust
//! use carquery::{Engine, FilterSpec, VehicleRecord};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = Engine::new(vec![
//!         VehicleRecord {
//!             brand: Some("BMW".into()),
//!             year: Some(2021),
//!             price: Some(28_500.0),
//!             ..Default::default()
//!         },
//!         VehicleRecord {
//!             brand: Some("Kia".into()),
//!             year: Some(2019),
//!             price: Some(14_900.0),
//!             ..Default::default()
//!         },
//!     ])?;
//!
//!     // Listings from 2020 onwards
//!     let recent = engine.search(&FilterSpec::new().at_least("Year", 2020))?;
//!     assert_eq!(recent.len(), 1);
//!
//!     for car in recent.iter() {
//!         println!("{:?} {:?}", car.brand, car.price);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Snapshots
//!
//! The engine holds one immutable [`RecordStore`] at a time. [`Engine::refresh`]
//! builds a replacement store and swaps it in; every [`ResultSet`] keeps the
//! snapshot it was computed from, so results never change underneath a reader.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

pub mod config;
pub mod logging;
pub mod presets;

// Re-export core types
pub use carquery_core::{Error, Result};

pub use carquery_core::{
    tag, Attribute, AttributeKind, RecordId, RecordPolicy, RecordStore, RuleRegistry, TagRule,
    TagTable, Value, VehicleRecord,
};

pub use carquery_core::query::{
    AggregateFunction, Aggregation, AggregationSpec, Bound, Constraint, Executor, FilterSpec,
    GroupKey, Groups, Literal, Predicate, Query, Row, SortDirection, SortKey, Summary,
    ValueCounts,
};

pub use config::EngineConfig;
pub use presets::SearchParams;

use carquery_core::query::stats;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

struct EngineInner {
    config: EngineConfig,
    store: RwLock<Arc<RecordStore>>,
    rules: RwLock<RuleRegistry>,
}

/// The main engine handle.
///
/// Thread-safe and can be cloned to share across threads. Reads never block
/// each other; a refresh only holds the write lock long enough to swap the
/// store pointer.
///
/// # Examples
///
/// ```rust
/// use carquery::{Attribute, Engine, SortKey};
/// use carquery::presets::POWERFUL_GERMAN;
///
/// let engine = Engine::new(Vec::new())?;
/// let ranked = engine.tagged(POWERFUL_GERMAN, Some(SortKey::desc(Attribute::EnginePowerHp)))?;
/// assert!(ranked.is_empty());
/// # Ok::<(), carquery::Error>(())
/// ```
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

impl Engine {
    /// Creates an engine over `records` with the default configuration.
    pub fn new(records: Vec<VehicleRecord>) -> Result<Self> {
        Self::with_config(records, EngineConfig::default())
    }

    /// Creates an engine with a custom configuration.
    ///
    /// Fails if the configuration is invalid or any record violates the
    /// configured record policy.
    pub fn with_config(records: Vec<VehicleRecord>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let store = RecordStore::with_policy(records, &config.record_policy)?;

        let mut rules = RuleRegistry::new();
        if config.default_rules {
            for rule in presets::default_rules() {
                rules.register(rule)?;
            }
        }

        info!(
            records = store.len(),
            rules = rules.len(),
            "Opened CarQuery engine"
        );

        Ok(Engine {
            inner: Arc::new(EngineInner {
                config,
                store: RwLock::new(Arc::new(store)),
                rules: RwLock::new(rules),
            }),
        })
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Returns the current store snapshot.
    pub fn snapshot(&self) -> Result<Arc<RecordStore>> {
        let store = self.inner.store.read().map_err(|_| Error::LockPoisoned)?;
        Ok(Arc::clone(&store))
    }

    /// Number of records in the current snapshot.
    pub fn len(&self) -> Result<usize> {
        Ok(self.snapshot()?.len())
    }

    /// Returns whether the current snapshot holds no records.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.snapshot()?.is_empty())
    }

    /// Replaces the record store.
    ///
    /// The new store is validated before anything is swapped, so a failed
    /// refresh leaves the current snapshot in place. Returns the snapshot
    /// that was replaced.
    pub fn refresh(&self, records: Vec<VehicleRecord>) -> Result<Arc<RecordStore>> {
        let fresh = Arc::new(RecordStore::with_policy(
            records,
            &self.inner.config.record_policy,
        )?);
        let records = fresh.len();

        let previous = {
            let mut store = self.inner.store.write().map_err(|_| Error::LockPoisoned)?;
            std::mem::replace(&mut *store, fresh)
        };

        info!(
            previous = previous.len(),
            records, "Refreshed record store"
        );
        Ok(previous)
    }

    /// Runs a query against the current snapshot.
    pub fn execute(&self, query: &Query) -> Result<ResultSet> {
        let store = self.snapshot()?;
        Ok(ResultSet::from_query(store, query))
    }

    /// Records matching `filter`, in store order.
    pub fn search(&self, filter: &FilterSpec) -> Result<ResultSet> {
        let query = Query::new(Predicate::build(filter)?);
        self.execute(&query)
    }

    /// Runs the guided search, cheapest first.
    pub fn search_params(&self, params: &SearchParams) -> Result<ResultSet> {
        self.execute(&params.to_query()?)
    }

    /// Grouped aggregation or pivot over the current snapshot.
    pub fn aggregate(&self, spec: &AggregationSpec) -> Result<Aggregation> {
        let aggregator = spec.validate()?;
        let store = self.snapshot()?;
        Ok(aggregator.run(&store))
    }

    /// Grouped aggregation restricted to the rows of `results`.
    pub fn aggregate_results(
        &self,
        results: &ResultSet,
        spec: &AggregationSpec,
    ) -> Result<Aggregation> {
        let aggregator = spec.validate()?;
        Ok(aggregator.aggregate(results.iter()))
    }

    /// Registers a tag rule, replacing any rule with the same name.
    pub fn register_rule(&self, rule: TagRule) -> Result<Option<TagRule>> {
        let mut rules = self.inner.rules.write().map_err(|_| Error::LockPoisoned)?;
        rules.register(rule)
    }

    /// Removes a tag rule. Returns whether it existed.
    pub fn remove_rule(&self, name: &str) -> Result<bool> {
        let mut rules = self.inner.rules.write().map_err(|_| Error::LockPoisoned)?;
        let removed = rules.remove(name);
        if removed {
            info!(rule = name, "Removed tag rule");
        }
        Ok(removed)
    }

    /// The registered tag rules, in registration order.
    pub fn rules(&self) -> Result<Vec<TagRule>> {
        let rules = self.inner.rules.read().map_err(|_| Error::LockPoisoned)?;
        Ok(rules.snapshot())
    }

    /// Registers the dream garage rule built from the configured price cap.
    pub fn register_dream_garage(&self, brands: &[String], body_types: &[String]) -> Result<()> {
        let rule = presets::dream_garage(brands, body_types, self.inner.config.dream_garage_price_cap);
        self.register_rule(rule)?;
        Ok(())
    }

    /// Tags the current snapshot with every registered rule.
    pub fn tag(&self) -> Result<TagTable> {
        let rules = self.rules()?;
        let store = self.snapshot()?;
        tag(&store, &rules)
    }

    /// Records tagged by the rule `name`, optionally sorted.
    pub fn tagged(&self, name: &str, order: Option<SortKey>) -> Result<ResultSet> {
        let filter = {
            let rules = self.inner.rules.read().map_err(|_| Error::LockPoisoned)?;
            rules
                .get(name)
                .map(|rule| rule.filter.clone())
                .ok_or_else(|| Error::Configuration(format!("unknown tag rule '{}'", name)))?
        };

        let mut query = Query::new(Predicate::build(&filter)?);
        if let Some(key) = order {
            query = query.order_by(key);
        }
        let results = self.execute(&query)?;
        debug!(rule = name, rows = results.len(), "Listed tagged records");
        Ok(results)
    }

    /// Occurrences of each value of a text, integer or date attribute.
    pub fn value_counts(&self, attribute: &str) -> Result<ValueCounts> {
        let attribute = Attribute::resolve(attribute)?;
        let store = self.snapshot()?;
        stats::value_counts(store.records(), attribute)
    }

    /// Summary statistics of a numeric attribute.
    pub fn describe(&self, attribute: &str) -> Result<Summary> {
        let attribute = Attribute::resolve(attribute)?;
        let store = self.snapshot()?;
        stats::describe(store.records(), attribute)
    }

    /// Quantile of a numeric attribute, `q` in `[0, 1]`.
    pub fn quantile(&self, attribute: &str, q: f64) -> Result<Option<f64>> {
        let attribute = Attribute::resolve(attribute)?;
        let store = self.snapshot()?;
        stats::attribute_quantile(store.records(), attribute, q)
    }

    /// Number of missing values for every attribute.
    pub fn missing_values(&self) -> Result<BTreeMap<Attribute, usize>> {
        let store = self.snapshot()?;
        Ok(stats::missing_values(store.records()))
    }

    /// Listings per week, keyed by the Sunday closing each week.
    pub fn weekly_activity(&self) -> Result<BTreeMap<NaiveDate, usize>> {
        let store = self.snapshot()?;
        Ok(stats::weekly_activity(store.records()))
    }

    /// Median of each attribute over the records matching `filter`.
    ///
    /// Used to compare a brand or segment against the rest of the market.
    pub fn profile(
        &self,
        filter: &FilterSpec,
        attributes: &[Attribute],
    ) -> Result<BTreeMap<Attribute, Option<f64>>> {
        let results = self.search(filter)?;
        stats::profile(results.iter(), attributes)
    }

    /// Pairwise correlation of numeric attributes.
    pub fn correlation_matrix(
        &self,
        attributes: &[Attribute],
    ) -> Result<BTreeMap<(Attribute, Attribute), Option<f64>>> {
        let store = self.snapshot()?;
        stats::correlation_matrix(store.records(), attributes)
    }
}

/// Rows selected by a query, pinned to the snapshot they were read from
#[derive(Debug, Clone)]
pub struct ResultSet {
    store: Arc<RecordStore>,
    ids: Vec<RecordId>,
}

impl ResultSet {
    fn from_query(store: Arc<RecordStore>, query: &Query) -> Self {
        let ids = Executor::new(&store)
            .execute(query)
            .into_iter()
            .map(|row| row.id)
            .collect();
        ResultSet { store, ids }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns whether no rows matched.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Row identities, in result order.
    pub fn ids(&self) -> &[RecordId] {
        &self.ids
    }

    /// The snapshot these rows belong to.
    pub fn snapshot(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The record at `position` in result order.
    pub fn get(&self, position: usize) -> Option<&VehicleRecord> {
        self.ids.get(position).and_then(|id| self.store.get(*id))
    }

    /// Records in result order.
    pub fn iter(&self) -> impl Iterator<Item = &VehicleRecord> + '_ {
        self.ids.iter().filter_map(move |id| self.store.get(*id))
    }

    /// Rows with their identities, in result order.
    pub fn rows(&self) -> Vec<Row<'_>> {
        self.ids
            .iter()
            .filter_map(|id| self.store.get(*id).map(|record| Row { id: *id, record }))
            .collect()
    }

    /// Owned copies of the records, in result order.
    pub fn to_records(&self) -> Vec<VehicleRecord> {
        self.iter().cloned().collect()
    }

    /// Applies a further query to these rows only.
    pub fn refine(&self, query: &Query) -> ResultSet {
        let ids = Executor::new(&self.store)
            .execute_over(self.rows(), query)
            .into_iter()
            .map(|row| row.id)
            .collect();
        ResultSet {
            store: Arc::clone(&self.store),
            ids,
        }
    }
}
