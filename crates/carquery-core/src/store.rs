//! Immutable in-memory record store.

use crate::error::{Error, Result};
use crate::record::{Attribute, VehicleRecord};
use std::fmt;
use std::ops::RangeInclusive;
use std::sync::Arc;

/// Identity of a record: its position in the store it was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordId(pub usize);

impl RecordId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Validation rules applied when a store is built.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordPolicy {
    /// Plausible manufacturing years
    pub years: RangeInclusive<i32>,
}

impl Default for RecordPolicy {
    fn default() -> Self {
        Self { years: 1886..=2100 }
    }
}

impl RecordPolicy {
    /// Policy with a custom year window.
    pub fn with_years(years: RangeInclusive<i32>) -> Self {
        Self { years }
    }

    /// Check that the policy itself is usable.
    pub fn validate(&self) -> Result<()> {
        if self.years.is_empty() {
            return Err(Error::config(format!(
                "year window {}..={} is empty",
                self.years.start(),
                self.years.end()
            )));
        }
        Ok(())
    }

    /// Check one record against the store invariants.
    pub fn check(&self, index: usize, record: &VehicleRecord) -> Result<()> {
        if let Some(year) = record.year {
            if !self.years.contains(&year) {
                return Err(Error::InvalidRecord(format!(
                    "record {}: year {} outside {}..={}",
                    index,
                    year,
                    self.years.start(),
                    self.years.end()
                )));
            }
        }

        if let Some(mileage) = record.mileage_km {
            if mileage < 0 {
                return Err(Error::InvalidRecord(format!(
                    "record {}: {} must be non-negative, got {}",
                    index,
                    Attribute::MileageKm,
                    mileage
                )));
            }
        }

        let decimals = [
            (Attribute::Price, record.price),
            (Attribute::EnginePowerHp, record.engine_power_hp),
            (Attribute::EngineSizeCc, record.engine_size_cc),
        ];
        for (attribute, value) in decimals {
            // NaN is treated as missing, like an empty cell
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                if v < 0.0 || v.is_infinite() {
                    return Err(Error::InvalidRecord(format!(
                        "record {}: {} must be a non-negative finite number, got {}",
                        index, attribute, v
                    )));
                }
            }
        }

        Ok(())
    }
}

/// An ordered, immutable sequence of vehicle records.
///
/// Cloning is cheap: clones share the same records. A store is never mutated
/// after it is built; refreshing data means building a new store.
#[derive(Debug, Clone)]
pub struct RecordStore {
    records: Arc<[VehicleRecord]>,
}

impl RecordStore {
    /// Build a store with the default [`RecordPolicy`].
    pub fn new(records: Vec<VehicleRecord>) -> Result<Self> {
        Self::with_policy(records, &RecordPolicy::default())
    }

    /// Build a store, validating every record against `policy`.
    pub fn with_policy(records: Vec<VehicleRecord>, policy: &RecordPolicy) -> Result<Self> {
        policy.validate()?;
        for (index, record) in records.iter().enumerate() {
            policy.check(index, record)?;
        }
        tracing::debug!(records = records.len(), "Built record store");
        Ok(Self {
            records: records.into(),
        })
    }

    /// A store with no records.
    pub fn empty() -> Self {
        Self {
            records: Arc::from(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: RecordId) -> Option<&VehicleRecord> {
        self.records.get(id.0)
    }

    /// All records in store order.
    pub fn records(&self) -> &[VehicleRecord] {
        &self.records
    }

    /// Records paired with their identity, in store order.
    pub fn iter(&self) -> impl Iterator<Item = (RecordId, &VehicleRecord)> + '_ {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (RecordId(i), record))
    }

    /// Whether two handles share the same underlying records.
    pub fn same_snapshot(&self, other: &RecordStore) -> bool {
        Arc::ptr_eq(&self.records, &other.records)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::empty()
    }
}
