/// Grouped aggregation and pivot tables
///
/// An [`AggregationSpec`] names one or two group keys, a measured attribute
/// and an aggregate function. One key yields a grouped mapping; two keys yield
/// a pivot, computed as an independent single-key aggregation per outer group.
use super::stats;
use crate::error::{Error, Result};
use crate::record::{Attribute, AttributeKind, Value, VehicleRecord};
use crate::store::RecordStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateFunction {
    /// Number of non-null measured values
    Count,
    Sum,
    Mean,
    Median,
    Min,
    Max,
}

impl AggregateFunction {
    fn requires_numeric(&self) -> bool {
        !matches!(self, AggregateFunction::Count)
    }

    /// Reduce one group's values.
    ///
    /// `present` is the number of non-null measured values, `values` their
    /// numeric form (empty for non-numeric measures).
    fn reduce(&self, present: usize, values: &[f64]) -> Option<f64> {
        match self {
            AggregateFunction::Count => Some(present as f64),
            AggregateFunction::Sum => {
                if values.is_empty() {
                    None
                } else {
                    Some(values.iter().sum())
                }
            }
            AggregateFunction::Mean => stats::mean(values),
            AggregateFunction::Median => stats::median(values),
            AggregateFunction::Min => values.iter().copied().reduce(f64::min),
            AggregateFunction::Max => values.iter().copied().reduce(f64::max),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Count => write!(f, "COUNT"),
            AggregateFunction::Sum => write!(f, "SUM"),
            AggregateFunction::Mean => write!(f, "MEAN"),
            AggregateFunction::Median => write!(f, "MEDIAN"),
            AggregateFunction::Min => write!(f, "MIN"),
            AggregateFunction::Max => write!(f, "MAX"),
        }
    }
}

impl FromStr for AggregateFunction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "count" | "size" => Ok(AggregateFunction::Count),
            "sum" => Ok(AggregateFunction::Sum),
            "mean" | "avg" | "average" => Ok(AggregateFunction::Mean),
            "median" => Ok(AggregateFunction::Median),
            "min" => Ok(AggregateFunction::Min),
            "max" => Ok(AggregateFunction::Max),
            other => Err(Error::config(format!(
                "unknown aggregate function '{}'",
                other
            ))),
        }
    }
}

/// Value of a group-by attribute
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GroupKey {
    Text(String),
    Integer(i64),
    Date(NaiveDate),
}

impl GroupKey {
    /// Group key of a value; `None` for nulls and decimals.
    pub fn from_value(value: Value<'_>) -> Option<Self> {
        match value {
            Value::Text(s) => Some(GroupKey::Text(s.to_string())),
            Value::Integer(i) => Some(GroupKey::Integer(i)),
            Value::Date(d) => Some(GroupKey::Date(d)),
            Value::Decimal(_) | Value::Null => None,
        }
    }

    pub(crate) fn require_groupable(attribute: Attribute) -> Result<()> {
        if attribute.kind() == AttributeKind::Decimal {
            return Err(Error::config(format!(
                "{} is a decimal attribute and cannot be used as a group key",
                attribute
            )));
        }
        Ok(())
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        GroupKey::Text(s.to_string())
    }
}

impl From<i64> for GroupKey {
    fn from(i: i64) -> Self {
        GroupKey::Integer(i)
    }
}

impl From<NaiveDate> for GroupKey {
    fn from(d: NaiveDate) -> Self {
        GroupKey::Date(d)
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Text(s) => write!(f, "{}", s),
            GroupKey::Integer(i) => write!(f, "{}", i),
            GroupKey::Date(d) => write!(f, "{}", d),
        }
    }
}

/// Requested aggregation, with attribute names still unresolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationSpec {
    /// One key for a grouped result, two for a pivot (index, columns)
    pub group_by: Vec<String>,
    pub measure: String,
    pub function: AggregateFunction,
}

impl AggregationSpec {
    /// `GROUP BY key` over `measure`.
    pub fn grouped(key: &str, measure: &str, function: AggregateFunction) -> Self {
        Self {
            group_by: vec![key.to_string()],
            measure: measure.to_string(),
            function,
        }
    }

    /// Pivot table with `index` rows and `columns` columns.
    pub fn pivot(index: &str, columns: &str, measure: &str, function: AggregateFunction) -> Self {
        Self {
            group_by: vec![index.to_string(), columns.to_string()],
            measure: measure.to_string(),
            function,
        }
    }

    /// Frequency table of `index` x `columns`.
    pub fn crosstab(index: &str, columns: &str) -> Self {
        Self::pivot(index, columns, columns, AggregateFunction::Count)
    }

    /// Resolve names and check kinds.
    pub fn validate(&self) -> Result<Aggregator> {
        if self.group_by.is_empty() || self.group_by.len() > 2 {
            return Err(Error::config(format!(
                "aggregation needs one or two group keys, got {}",
                self.group_by.len()
            )));
        }

        let keys = self
            .group_by
            .iter()
            .map(|name| {
                let attribute = Attribute::resolve(name)?;
                GroupKey::require_groupable(attribute)?;
                Ok(attribute)
            })
            .collect::<Result<Vec<_>>>()?;

        let measure = Attribute::resolve(&self.measure)?;
        if self.function.requires_numeric() && !measure.kind().is_numeric() {
            return Err(Error::config(format!(
                "{} needs a numeric measure, {} is {}",
                self.function,
                measure,
                measure.kind()
            )));
        }

        Ok(Aggregator {
            outer: keys[0],
            inner: keys.get(1).copied(),
            measure,
            function: self.function,
        })
    }
}

impl fmt::Display for AggregationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) GROUP BY {}",
            self.function,
            self.measure,
            self.group_by.join(", ")
        )
    }
}

/// Group key -> aggregated value; `None` marks a group with no measured values
pub type Groups = BTreeMap<GroupKey, Option<f64>>;

/// Result of an aggregation
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    Grouped(Groups),
    /// Outer key -> inner key -> value. Unobserved combinations are absent.
    Pivot(BTreeMap<GroupKey, Groups>),
}

impl Aggregation {
    /// True when no group was observed.
    pub fn is_empty(&self) -> bool {
        match self {
            Aggregation::Grouped(groups) => groups.is_empty(),
            Aggregation::Pivot(table) => table.is_empty(),
        }
    }

    pub fn as_grouped(&self) -> Option<&Groups> {
        match self {
            Aggregation::Grouped(groups) => Some(groups),
            Aggregation::Pivot(_) => None,
        }
    }

    pub fn as_pivot(&self) -> Option<&BTreeMap<GroupKey, Groups>> {
        match self {
            Aggregation::Pivot(table) => Some(table),
            Aggregation::Grouped(_) => None,
        }
    }

    /// Value of one group of a grouped result.
    pub fn get(&self, key: &GroupKey) -> Option<f64> {
        self.as_grouped()?.get(key).copied().flatten()
    }

    /// Value of one cell of a pivot.
    pub fn cell(&self, outer: &GroupKey, inner: &GroupKey) -> Option<f64> {
        self.as_pivot()?.get(outer)?.get(inner).copied().flatten()
    }

    /// Inner keys observed in any outer group of a pivot, sorted.
    pub fn columns(&self) -> Vec<GroupKey> {
        let mut columns: Vec<GroupKey> = match self {
            Aggregation::Pivot(table) => table.values().flat_map(|g| g.keys().cloned()).collect(),
            Aggregation::Grouped(_) => Vec::new(),
        };
        columns.sort();
        columns.dedup();
        columns
    }
}

/// A validated aggregation, ready to run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aggregator {
    outer: Attribute,
    inner: Option<Attribute>,
    measure: Attribute,
    function: AggregateFunction,
}

#[derive(Default)]
struct Bucket {
    present: usize,
    values: Vec<f64>,
}

impl Aggregator {
    /// Aggregate every record of a store.
    pub fn run(&self, store: &RecordStore) -> Aggregation {
        self.aggregate(store.records())
    }

    /// Aggregate an arbitrary record sequence (for example a query result).
    pub fn aggregate<'a>(&self, records: impl IntoIterator<Item = &'a VehicleRecord>) -> Aggregation {
        let result = match self.inner {
            None => Aggregation::Grouped(self.group(records, self.outer)),
            Some(inner) => {
                let mut partitions: BTreeMap<GroupKey, Vec<&VehicleRecord>> = BTreeMap::new();
                for record in records {
                    if let Some(key) = GroupKey::from_value(record.value(self.outer)) {
                        partitions.entry(key).or_default().push(record);
                    }
                }
                Aggregation::Pivot(
                    partitions
                        .into_iter()
                        .map(|(key, rows)| (key, self.group(rows, inner)))
                        .collect(),
                )
            }
        };
        let groups = match &result {
            Aggregation::Grouped(g) => g.len(),
            Aggregation::Pivot(t) => t.len(),
        };
        tracing::debug!(function = %self.function, measure = %self.measure, groups, "Aggregated records");
        result
    }

    fn group<'a>(&self, records: impl IntoIterator<Item = &'a VehicleRecord>, key: Attribute) -> Groups {
        let mut buckets: BTreeMap<GroupKey, Bucket> = BTreeMap::new();
        for record in records {
            let Some(group) = GroupKey::from_value(record.value(key)) else {
                continue;
            };
            let bucket = buckets.entry(group).or_default();
            let measured = record.value(self.measure);
            if !measured.is_null() {
                bucket.present += 1;
                if let Some(n) = measured.as_number() {
                    bucket.values.push(n);
                }
            }
        }
        buckets
            .into_iter()
            .map(|(group, bucket)| (group, self.function.reduce(bucket.present, &bucket.values)))
            .collect()
    }
}

/// Validate `spec` and aggregate the whole store.
pub fn aggregate(store: &RecordStore, spec: &AggregationSpec) -> Result<Aggregation> {
    Ok(spec.validate()?.run(store))
}
