/// Query executor
///
/// Runs a [`Query`] over a record store: filter, then stable sort, then limit.
use super::predicate::Predicate;
use crate::error::Result;
use crate::record::{Attribute, VehicleRecord};
use crate::store::{RecordId, RecordStore};
use std::cmp::Ordering;
use std::fmt;

/// A record in a query result, borrowed from the store it came from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Row<'s> {
    pub id: RecordId,
    pub record: &'s VehicleRecord,
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Sort key for query results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub attribute: Attribute,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(attribute: Attribute) -> Self {
        Self {
            attribute,
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(attribute: Attribute) -> Self {
        Self {
            attribute,
            direction: SortDirection::Desc,
        }
    }

    /// Resolve a sort key from an attribute name.
    pub fn parse(name: &str, direction: SortDirection) -> Result<Self> {
        Ok(Self {
            attribute: Attribute::resolve(name)?,
            direction,
        })
    }

    /// Compare two records. Missing values sort last in either direction.
    pub fn compare(&self, a: &VehicleRecord, b: &VehicleRecord) -> Ordering {
        let a = a.value(self.attribute);
        let b = b.value(self.attribute);
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => {
                let ordering = a.compare(&b).unwrap_or(Ordering::Equal);
                match self.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            }
        }
    }
}

/// A filter with an optional sort key and row limit
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub predicate: Predicate,
    pub order_by: Option<SortKey>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new(predicate: Predicate) -> Self {
        Self {
            predicate,
            ..Default::default()
        }
    }

    /// Query matching every record.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn order_by(mut self, key: SortKey) -> Self {
        self.order_by = Some(key);
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }
}

/// Query executor over one store snapshot
pub struct Executor<'s> {
    store: &'s RecordStore,
}

impl<'s> Executor<'s> {
    pub fn new(store: &'s RecordStore) -> Self {
        Self { store }
    }

    /// Every record of the store, in store order.
    pub fn scan(&self) -> Vec<Row<'s>> {
        self.store
            .iter()
            .map(|(id, record)| Row { id, record })
            .collect()
    }

    /// Execute a query against the whole store.
    pub fn execute(&self, query: &Query) -> Vec<Row<'s>> {
        self.execute_over(self.scan(), query)
    }

    /// Execute a query against an earlier result.
    pub fn execute_over(&self, rows: Vec<Row<'s>>, query: &Query) -> Vec<Row<'s>> {
        let scanned = rows.len();
        let mut rows = self.execute_filter(rows, &query.predicate);
        let matched = rows.len();

        if let Some(key) = &query.order_by {
            self.execute_sort(&mut rows, key);
        }
        if let Some(count) = query.limit {
            rows.truncate(count);
        }

        tracing::debug!(scanned, matched, returned = rows.len(), "Executed query");
        rows
    }

    fn execute_filter(&self, rows: Vec<Row<'s>>, predicate: &Predicate) -> Vec<Row<'s>> {
        if predicate.is_vacuous() {
            return rows;
        }
        rows.into_iter()
            .filter(|row| predicate.matches(row.record))
            .collect()
    }

    fn execute_sort(&self, rows: &mut [Row<'s>], key: &SortKey) {
        // sort_by is stable: equal keys keep their relative order
        rows.sort_by(|a, b| key.compare(a.record, b.record));
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => write!(f, "ASC"),
            SortDirection::Desc => write!(f, "DESC"),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.attribute, self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::filter::FilterSpec;

    fn store() -> RecordStore {
        let listing = |brand: &str, year: i32, price: Option<f64>| VehicleRecord {
            brand: Some(brand.to_string()),
            year: Some(year),
            price,
            ..Default::default()
        };
        RecordStore::new(vec![
            listing("BMW", 2020, Some(40_000.0)),
            listing("Audi", 2019, Some(35_000.0)),
            listing("Kia", 2020, None),
            listing("Seat", 2021, Some(35_000.0)),
            listing("BMW", 2018, Some(60_000.0)),
        ])
        .unwrap()
    }

    fn ids(rows: &[Row<'_>]) -> Vec<usize> {
        rows.iter().map(|r| r.id.index()).collect()
    }

    #[test]
    fn test_filter_preserves_store_order() {
        let store = store();
        let predicate = Predicate::build(&FilterSpec::new().at_least("Year", 2020)).unwrap();
        let rows = Executor::new(&store).execute(&Query::new(predicate));
        assert_eq!(ids(&rows), vec![0, 2, 3]);
    }

    #[test]
    fn test_sort_is_stable_with_nulls_last() {
        let store = store();
        let executor = Executor::new(&store);

        let rows = executor.execute(&Query::all().order_by(SortKey::asc(Attribute::Price)));
        assert_eq!(ids(&rows), vec![1, 3, 0, 4, 2]);

        let rows = executor.execute(&Query::all().order_by(SortKey::desc(Attribute::Price)));
        assert_eq!(ids(&rows), vec![4, 0, 1, 3, 2]);
    }

    #[test]
    fn test_limit() {
        let store = store();
        let rows = Executor::new(&store).execute(
            &Query::all()
                .order_by(SortKey::desc(Attribute::Year))
                .limit(2),
        );
        assert_eq!(ids(&rows), vec![3, 0]);
    }

    #[test]
    fn test_refilter_is_idempotent() {
        let store = store();
        let executor = Executor::new(&store);
        let query = Query::new(
            Predicate::build(&FilterSpec::new().at_most("Price", 40_000)).unwrap(),
        );

        let once = executor.execute(&query);
        let twice = executor.execute_over(once.clone(), &query);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_empty_store() {
        let store = RecordStore::empty();
        let rows = Executor::new(&store).execute(&Query::all().order_by(SortKey::asc(Attribute::Price)));
        assert!(rows.is_empty());
    }

    #[test]
    fn test_parse_sort_key() {
        let key = SortKey::parse("Mileage(km)", SortDirection::Asc).unwrap();
        assert_eq!(key.attribute, Attribute::MileageKm);
        assert_eq!(key.to_string(), "Mileage(km) ASC");
        assert!(SortKey::parse("Colour", SortDirection::Desc).is_err());
    }
}
