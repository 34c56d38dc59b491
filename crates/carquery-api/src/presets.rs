//! Ready-made searches and recommendation rules for the listing dashboard.

use crate::config::DEFAULT_DREAM_GARAGE_PRICE_CAP;
use carquery_core::query::{FilterSpec, Predicate, Query, SortKey};
use carquery_core::{Attribute, Result, TagRule};

/// Name of the [`powerful_german`] rule
pub const POWERFUL_GERMAN: &str = "Powerful German";
/// Name of the [`efficient_compact`] rule
pub const EFFICIENT_COMPACT: &str = "Efficient Compact";
/// Name of the [`dream_garage`] rule
pub const DREAM_GARAGE: &str = "Dream Garage";

/// German premium brands with more than 300 hp.
pub fn powerful_german() -> TagRule {
    TagRule::new(
        POWERFUL_GERMAN,
        FilterSpec::new()
            .one_of("Brand", ["BMW", "Mercedes", "Audi"])
            .greater_than("EnginePower(HP)", 300),
    )
}

/// Hybrid or electric hatchbacks under 30 000.
pub fn efficient_compact() -> TagRule {
    TagRule::new(
        EFFICIENT_COMPACT,
        FilterSpec::new()
            .equals("BodyType", "Hatchback")
            .one_of("FuelType", ["Hybrid", "BEV"])
            .less_than("Price", 30_000),
    )
}

/// Both built-in rules, in registration order.
pub fn default_rules() -> Vec<TagRule> {
    vec![powerful_german(), efficient_compact()]
}

/// A personal shortlist: preferred brands and body types priced at or under a cap.
///
/// An empty brand or body type list places no restriction on that attribute.
pub fn dream_garage(brands: &[String], body_types: &[String], price_cap: f64) -> TagRule {
    TagRule::new(
        DREAM_GARAGE,
        FilterSpec::new()
            .one_of("Brand", brands.iter().map(String::as_str))
            .one_of("BodyType", body_types.iter().map(String::as_str))
            .at_most("Price", price_cap),
    )
}

/// [`dream_garage`] with the default price cap.
pub fn dream_garage_default(brands: &[String], body_types: &[String]) -> TagRule {
    dream_garage(brands, body_types, DEFAULT_DREAM_GARAGE_PRICE_CAP)
}

/// Split comma-separated input into trimmed, non-blank entries.
///
/// ```
/// use carquery::presets::parse_list;
///
/// assert_eq!(parse_list(" BMW, Audi ,,"), vec!["BMW", "Audi"]);
/// assert!(parse_list("   ").is_empty());
/// ```
pub fn parse_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// The `n` cheapest listings.
pub fn cheapest(n: usize) -> Query {
    Query::all().order_by(SortKey::asc(Attribute::Price)).limit(n)
}

/// The `n` most recently manufactured listings.
pub fn newest(n: usize) -> Query {
    Query::all().order_by(SortKey::desc(Attribute::Year)).limit(n)
}

/// The `n` listings with the lowest mileage.
pub fn lowest_mileage(n: usize) -> Query {
    Query::all().order_by(SortKey::asc(Attribute::MileageKm)).limit(n)
}

/// Parameters of the guided search, all optional
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchParams {
    /// Oldest acceptable manufacturing year
    pub min_year: Option<i32>,
    /// Highest acceptable price
    pub max_price: Option<f64>,
    /// Highest acceptable mileage in km
    pub max_mileage: Option<i64>,
    /// Exact fuel type
    pub fuel_type: Option<String>,
}

impl SearchParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_year(mut self, year: i32) -> Self {
        self.min_year = Some(year);
        self
    }

    pub fn max_price(mut self, price: f64) -> Self {
        self.max_price = Some(price);
        self
    }

    pub fn max_mileage(mut self, km: i64) -> Self {
        self.max_mileage = Some(km);
        self
    }

    pub fn fuel_type(mut self, fuel: impl Into<String>) -> Self {
        self.fuel_type = Some(fuel.into());
        self
    }

    /// Inclusive bounds for every parameter that is set.
    pub fn to_filter(&self) -> FilterSpec {
        let mut spec = FilterSpec::new();
        if let Some(year) = self.min_year {
            spec = spec.at_least("Year", year);
        }
        if let Some(price) = self.max_price {
            spec = spec.at_most("Price", price);
        }
        if let Some(km) = self.max_mileage {
            spec = spec.at_most("Mileage(km)", km);
        }
        if let Some(fuel) = &self.fuel_type {
            spec = spec.equals("FuelType", fuel.as_str());
        }
        spec
    }

    /// The search as a query, cheapest first.
    pub fn to_query(&self) -> Result<Query> {
        let predicate = Predicate::build(&self.to_filter())?;
        Ok(Query::new(predicate).order_by(SortKey::asc(Attribute::Price)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carquery_core::query::Constraint;

    #[test]
    fn test_parse_list() {
        assert_eq!(parse_list("BMW,Audi"), vec!["BMW", "Audi"]);
        assert_eq!(parse_list("  SUV , Sedan  "), vec!["SUV", "Sedan"]);
        assert!(parse_list("").is_empty());
        assert!(parse_list(" , ,").is_empty());
    }

    #[test]
    fn test_preset_rules_compile() {
        for rule in default_rules() {
            assert!(Predicate::build(&rule.filter).is_ok(), "{}", rule.name);
        }
        let rule = dream_garage_default(&["Kia".to_string()], &[]);
        assert_eq!(rule.name, DREAM_GARAGE);
        assert!(Predicate::build(&rule.filter).is_ok());
    }

    #[test]
    fn test_dream_garage_cap_is_inclusive() {
        let rule = dream_garage(&[], &[], 50_000.0);
        let predicate = Predicate::build(&rule.filter).unwrap();
        let priced = |price: f64| carquery_core::VehicleRecord {
            price: Some(price),
            ..Default::default()
        };
        assert!(predicate.matches(&priced(50_000.0)));
        assert!(!predicate.matches(&priced(50_000.5)));
    }

    #[test]
    fn test_empty_search_params() {
        let params = SearchParams::new();
        assert!(params.to_filter().is_empty());
        assert!(params.to_query().is_ok());
    }

    #[test]
    fn test_search_params_filter() {
        let params = SearchParams::new()
            .min_year(2020)
            .max_price(30_000.0)
            .fuel_type("Hybrid");
        let spec = params.to_filter();
        let attributes: Vec<&str> = spec.constraints().iter().map(Constraint::attribute).collect();
        assert_eq!(attributes, vec!["Year", "Price", "FuelType"]);
    }
}
