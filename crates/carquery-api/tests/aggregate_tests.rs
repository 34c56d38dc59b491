/// Tests for grouped aggregation, pivots and descriptive statistics
mod common;

use carquery::{
    AggregateFunction, AggregationSpec, Attribute, Engine, FilterSpec, GroupKey, VehicleRecord,
};
use chrono::NaiveDate;
use common::engine;

fn key(s: &str) -> GroupKey {
    GroupKey::from(s)
}

#[test]
fn test_mean_price_by_brand() {
    let engine = engine();
    let result = engine
        .aggregate(&AggregationSpec::grouped("Brand", "Price", AggregateFunction::Mean))
        .unwrap();

    assert_eq!(result.get(&key("BMW")), Some(55_000.0));
    assert_eq!(result.get(&key("Audi")), Some(58_250.0));
    assert_eq!(result.get(&key("Mercedes")), Some(34_500.0));
    // The Sportage has no price
    assert_eq!(result.get(&key("Kia")), Some(29_900.0));
    assert_eq!(result.as_grouped().unwrap().len(), 6);
}

#[test]
fn test_mean_ignores_missing_values() {
    let engine = Engine::new(
        [Some(100.0), None, Some(200.0)]
            .into_iter()
            .map(|price| VehicleRecord {
                brand: Some("Dacia".to_string()),
                price,
                ..Default::default()
            })
            .collect(),
    )
    .unwrap();

    let mean = engine
        .aggregate(&AggregationSpec::grouped("Brand", "Price", AggregateFunction::Mean))
        .unwrap();
    assert_eq!(mean.get(&key("Dacia")), Some(150.0));

    let count = engine
        .aggregate(&AggregationSpec::grouped("Brand", "Price", AggregateFunction::Count))
        .unwrap();
    assert_eq!(count.get(&key("Dacia")), Some(2.0));
}

#[test]
fn test_group_without_measured_values_is_absent() {
    let engine = Engine::new(vec![VehicleRecord {
        brand: Some("Lada".to_string()),
        ..Default::default()
    }])
    .unwrap();

    let result = engine
        .aggregate(&AggregationSpec::grouped("Brand", "Price", AggregateFunction::Median))
        .unwrap();
    let groups = result.as_grouped().unwrap();
    assert_eq!(groups.get(&key("Lada")), Some(&None));
}

#[test]
fn test_median_mileage_by_fuel() {
    let engine = engine();
    let result = engine
        .aggregate(&AggregationSpec::grouped(
            "FuelType",
            "Mileage(km)",
            AggregateFunction::Median,
        ))
        .unwrap();

    assert_eq!(result.get(&key("Petrol")), Some(50_000.0));
    assert_eq!(result.get(&key("Diesel")), Some(64_000.0));
    assert_eq!(result.get(&key("Hybrid")), Some(23_500.0));
    assert_eq!(result.get(&key("BEV")), Some(11_500.0));
}

#[test]
fn test_sum_min_max() {
    let engine = engine();

    let sum = engine
        .aggregate(&AggregationSpec::grouped("City", "Price", AggregateFunction::Sum))
        .unwrap();
    assert_eq!(sum.get(&key("Berlin")), Some(71_900.0));
    assert_eq!(sum.get(&key("Munich")), Some(206_000.0));
    assert_eq!(sum.get(&key("Cologne")), Some(29_900.0));

    let oldest = engine
        .aggregate(&AggregationSpec::grouped("BodyType", "Year", AggregateFunction::Min))
        .unwrap();
    let newest = engine
        .aggregate(&AggregationSpec::grouped("BodyType", "Year", AggregateFunction::Max))
        .unwrap();
    assert_eq!(oldest.get(&key("Hatchback")), Some(2017.0));
    assert_eq!(newest.get(&key("Hatchback")), Some(2023.0));
}

#[test]
fn test_group_by_integer_attribute() {
    let engine = engine();
    let result = engine
        .aggregate(&AggregationSpec::grouped("Year", "Price", AggregateFunction::Count))
        .unwrap();
    assert_eq!(result.get(&GroupKey::from(2021i64)), Some(1.0));
    assert_eq!(result.get(&GroupKey::from(2022i64)), Some(2.0));
}

#[test]
fn test_pivot_mean_price() {
    let engine = engine();
    let result = engine
        .aggregate(&AggregationSpec::pivot(
            "Brand",
            "FuelType",
            "Price",
            AggregateFunction::Mean,
        ))
        .unwrap();

    assert_eq!(result.cell(&key("BMW"), &key("Petrol")), Some(55_000.0));
    assert_eq!(result.cell(&key("Audi"), &key("Hybrid")), Some(27_500.0));
    assert_eq!(result.cell(&key("Audi"), &key("Petrol")), Some(89_000.0));

    let table = result.as_pivot().unwrap();
    // Observed combination without prices
    assert_eq!(table[&key("Kia")].get(&key("Diesel")), Some(&None));
    // Unobserved combination is not zero-filled
    assert!(!table[&key("BMW")].contains_key(&key("Diesel")));

    assert_eq!(
        result.columns(),
        vec![key("BEV"), key("Diesel"), key("Hybrid"), key("Petrol")]
    );
}

#[test]
fn test_pivot_rows_match_restricted_grouping() {
    let engine = engine();
    let pivot = engine
        .aggregate(&AggregationSpec::pivot(
            "Brand",
            "FuelType",
            "Price",
            AggregateFunction::Median,
        ))
        .unwrap();
    let by_fuel = AggregationSpec::grouped("FuelType", "Price", AggregateFunction::Median);

    for (brand, row) in pivot.as_pivot().unwrap() {
        let GroupKey::Text(name) = brand else {
            panic!("brand keys are text");
        };
        let subset = engine
            .search(&FilterSpec::new().equals("Brand", name.as_str()))
            .unwrap();
        let restricted = engine.aggregate_results(&subset, &by_fuel).unwrap();
        assert_eq!(restricted.as_grouped().unwrap(), row, "{}", name);
    }
}

#[test]
fn test_crosstab_counts() {
    let engine = engine();
    let result = engine
        .aggregate(&AggregationSpec::crosstab("Brand", "BodyType"))
        .unwrap();

    assert_eq!(result.cell(&key("BMW"), &key("Sedan")), Some(2.0));
    assert_eq!(result.cell(&key("Audi"), &key("Wagon")), Some(1.0));
    assert_eq!(result.cell(&key("Kia"), &key("SUV")), Some(1.0));
    assert_eq!(result.cell(&key("Seat"), &key("SUV")), None);
}

#[test]
fn test_empty_store_aggregates_to_empty_mapping() {
    let engine = Engine::new(Vec::new()).unwrap();
    let grouped = engine
        .aggregate(&AggregationSpec::grouped("Brand", "Price", AggregateFunction::Mean))
        .unwrap();
    assert!(grouped.is_empty());

    let pivot = engine
        .aggregate(&AggregationSpec::crosstab("Brand", "FuelType"))
        .unwrap();
    assert!(pivot.is_empty());
}

#[test]
fn test_invalid_aggregations() {
    let engine = engine();

    let decimal_key = AggregationSpec::grouped("Price", "Year", AggregateFunction::Count);
    assert!(engine.aggregate(&decimal_key).unwrap_err().is_configuration());

    let text_mean = AggregationSpec::grouped("Brand", "Model", AggregateFunction::Mean);
    assert!(engine.aggregate(&text_mean).unwrap_err().is_configuration());

    let unknown = AggregationSpec::grouped("Brand", "Horsepower", AggregateFunction::Max);
    assert!(engine.aggregate(&unknown).unwrap_err().is_configuration());

    let three_keys = AggregationSpec {
        group_by: vec!["Brand".into(), "City".into(), "FuelType".into()],
        measure: "Price".into(),
        function: AggregateFunction::Mean,
    };
    assert!(engine.aggregate(&three_keys).unwrap_err().is_configuration());
}

#[test]
fn test_function_names() {
    assert_eq!(
        "median".parse::<AggregateFunction>().unwrap(),
        AggregateFunction::Median
    );
    assert_eq!(
        "AVG".parse::<AggregateFunction>().unwrap(),
        AggregateFunction::Mean
    );
    assert!("mode".parse::<AggregateFunction>().is_err());
}

#[test]
fn test_value_counts() {
    let engine = engine();
    let counts = engine.value_counts("Brand").unwrap();

    let order: Vec<String> = counts.entries().iter().map(|(k, _)| k.to_string()).collect();
    assert_eq!(order, vec!["BMW", "Audi", "Mercedes", "Kia", "Toyota", "Seat"]);
    assert_eq!(counts.get(&key("Kia")), 2);
    assert_eq!(counts.total(), 10);

    let top = counts.top(2);
    assert_eq!(top.len(), 2);

    assert!(engine.value_counts("Price").is_err());
}

#[test]
fn test_describe_price() {
    let engine = engine();
    let summary = engine.describe("Price").unwrap();

    assert_eq!(summary.count, 9);
    assert_eq!(summary.min, Some(9_900.0));
    assert_eq!(summary.q25, Some(24_000.0));
    assert_eq!(summary.median, Some(29_900.0));
    assert_eq!(summary.q75, Some(45_000.0));
    assert_eq!(summary.max, Some(89_000.0));
    assert!((summary.mean.unwrap() - 353_800.0 / 9.0).abs() < 1e-6);

    assert!(engine.describe("Brand").unwrap_err().is_configuration());
}

#[test]
fn test_weekly_activity() {
    let engine = engine();
    let weeks = engine.weekly_activity().unwrap();
    let date = |d| NaiveDate::from_ymd_opt(2024, 3, d).unwrap();

    let expected: Vec<(NaiveDate, usize)> =
        vec![(date(10), 3), (date(17), 3), (date(24), 2), (date(31), 1)];
    assert_eq!(weeks.into_iter().collect::<Vec<_>>(), expected);
}

#[test]
fn test_weekly_activity_near_the_last_date() {
    let engine = Engine::new(vec![VehicleRecord {
        listing_date: Some(NaiveDate::MAX),
        ..Default::default()
    }])
    .unwrap();
    let weeks = engine.weekly_activity().unwrap();
    assert_eq!(weeks.into_iter().collect::<Vec<_>>(), vec![(NaiveDate::MAX, 1)]);
}

#[test]
fn test_missing_values_per_attribute() {
    let engine = engine();
    let missing = engine.missing_values().unwrap();

    assert_eq!(missing.len(), Attribute::ALL.len());
    assert_eq!(missing[&Attribute::Brand], 0);
    assert_eq!(missing[&Attribute::Price], 1);
    assert_eq!(missing[&Attribute::ListingDate], 1);
    assert_eq!(missing[&Attribute::DriveTrain], 10);
    assert_eq!(missing[&Attribute::EngineSizeCc], 10);
}

#[test]
fn test_brand_profile() {
    let engine = engine();
    let profile = engine
        .profile(
            &FilterSpec::new().equals("Brand", "BMW"),
            &[Attribute::Price, Attribute::EnginePowerHp],
        )
        .unwrap();

    assert_eq!(profile[&Attribute::Price], Some(55_000.0));
    assert_eq!(profile[&Attribute::EnginePowerHp], Some(429.0));
}

#[test]
fn test_correlation_matrix() {
    let engine = engine();
    let matrix = engine
        .correlation_matrix(&[Attribute::Year, Attribute::MileageKm])
        .unwrap();

    let diagonal = matrix[&(Attribute::Year, Attribute::Year)].unwrap();
    assert!((diagonal - 1.0).abs() < 1e-9);

    let r = matrix[&(Attribute::Year, Attribute::MileageKm)].unwrap();
    assert!(r < -0.8);
    assert_eq!(matrix[&(Attribute::MileageKm, Attribute::Year)], Some(r));
}
