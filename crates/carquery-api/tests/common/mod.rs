//! Shared listings fixture for integration tests
#![allow(dead_code)]

use carquery::{Engine, EngineConfig, VehicleRecord};
use chrono::NaiveDate;

#[allow(clippy::too_many_arguments)]
pub fn listing(
    brand: &str,
    series: &str,
    body_type: &str,
    fuel_type: &str,
    city: &str,
    year: i32,
    price: Option<f64>,
    mileage_km: i64,
    engine_power_hp: f64,
    listing_date: Option<(i32, u32, u32)>,
) -> VehicleRecord {
    VehicleRecord {
        brand: Some(brand.to_string()),
        series: Some(series.to_string()),
        model: Some(format!("{} {}", brand, series)),
        body_type: Some(body_type.to_string()),
        fuel_type: Some(fuel_type.to_string()),
        city: Some(city.to_string()),
        year: Some(year),
        price,
        mileage_km: Some(mileage_km),
        engine_power_hp: Some(engine_power_hp),
        listing_title: Some(format!("{} {} {}", year, brand, series)),
        listing_date: listing_date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        ..Default::default()
    }
}

/// Ten listings across six brands.
///
/// The Kia Sportage (index 8) has no price and no listing date.
pub fn listings() -> Vec<VehicleRecord> {
    vec![
        listing("BMW", "330i", "Sedan", "Petrol", "Berlin", 2021, Some(38_000.0), 25_000, 258.0, Some((2024, 3, 4))),
        listing("BMW", "M5", "Sedan", "Petrol", "Munich", 2020, Some(72_000.0), 40_000, 600.0, Some((2024, 3, 5))),
        listing("Audi", "A3", "Hatchback", "Hybrid", "Hamburg", 2022, Some(27_500.0), 12_000, 204.0, Some((2024, 3, 6))),
        listing("Audi", "RS6", "Wagon", "Petrol", "Munich", 2019, Some(89_000.0), 60_000, 600.0, Some((2024, 3, 11))),
        listing("Mercedes", "C 200", "Sedan", "Diesel", "Berlin", 2018, Some(24_000.0), 98_000, 204.0, Some((2024, 3, 12))),
        listing("Kia", "Niro EV", "Hatchback", "BEV", "Cologne", 2023, Some(29_900.0), 8_000, 204.0, Some((2024, 3, 13))),
        listing("Toyota", "Yaris", "Hatchback", "Hybrid", "Hamburg", 2020, Some(18_500.0), 35_000, 116.0, Some((2024, 3, 20))),
        listing("Seat", "Ibiza", "Hatchback", "Petrol", "Berlin", 2017, Some(9_900.0), 110_000, 95.0, Some((2024, 3, 20))),
        listing("Kia", "Sportage", "SUV", "Diesel", "Cologne", 2021, None, 30_000, 136.0, None),
        listing("Mercedes", "EQA", "SUV", "BEV", "Munich", 2022, Some(45_000.0), 15_000, 190.0, Some((2024, 3, 25))),
    ]
}

pub fn engine() -> Engine {
    Engine::new(listings()).unwrap()
}

pub fn engine_without_rules() -> Engine {
    Engine::with_config(listings(), EngineConfig::default().with_default_rules(false)).unwrap()
}

pub fn series_of<'a>(records: impl IntoIterator<Item = &'a VehicleRecord>) -> Vec<String> {
    records
        .into_iter()
        .map(|r| r.series.clone().unwrap_or_default())
        .collect()
}
