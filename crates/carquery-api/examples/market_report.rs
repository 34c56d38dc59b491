/// Example walking through searches, pivots and recommendations in CarQuery
use carquery::logging::LogConfig;
use carquery::presets::{parse_list, DREAM_GARAGE, POWERFUL_GERMAN};
use carquery::{
    AggregateFunction, AggregationSpec, Aggregation, Attribute, Engine, FilterSpec, ResultSet,
    SearchParams, SortKey, VehicleRecord,
};
use chrono::NaiveDate;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = LogConfig::warn().init()?;

    println!("CarQuery Market Report Demo");
    println!("===========================\n");

    let engine = Engine::new(sample_listings())?;
    println!("Loaded {} listings\n", engine.len()?);

    // Example 1: Guided search
    println!("1. Guided search - 2020 or newer, at most 30 000, cheapest first:");
    let params = SearchParams::new().min_year(2020).max_price(30_000.0);
    print_results(&engine.search_params(&params)?);
    println!();

    // Example 2: Grouped statistics
    println!("2. Median price by brand:");
    let medians =
        engine.aggregate(&AggregationSpec::grouped("Brand", "Price", AggregateFunction::Median))?;
    print_aggregation(&medians);
    println!();

    // Example 3: Pivot table
    println!("3. Mean price by body type and fuel:");
    let pivot = engine.aggregate(&AggregationSpec::pivot(
        "BodyType",
        "FuelType",
        "Price",
        AggregateFunction::Mean,
    ))?;
    print_aggregation(&pivot);
    println!();

    // Example 4: Cross-tab
    println!("4. Listings per city and seller type:");
    print_aggregation(&engine.aggregate(&AggregationSpec::crosstab("City", "SellerType"))?);
    println!();

    // Example 5: Price summary
    println!("5. Price summary:");
    let summary = engine.describe("Price")?;
    println!(
        "   count={} mean={:.0} median={:.0} min={:.0} max={:.0}",
        summary.count,
        summary.mean.unwrap_or_default(),
        summary.median.unwrap_or_default(),
        summary.min.unwrap_or_default(),
        summary.max.unwrap_or_default()
    );
    let missing = engine.missing_values()?;
    println!(
        "   missing: price {} | seller type {} | engine size {}",
        missing[&Attribute::Price],
        missing[&Attribute::SellerType],
        missing[&Attribute::EngineSizeCc]
    );
    println!();

    // Example 6: Weekly listing activity
    println!("6. Listings per week:");
    for (week, count) in engine.weekly_activity()? {
        println!("   week ending {}: {}", week, count);
    }
    println!();

    // Example 7: Brand profile against the market
    println!("7. BMW against the whole market (medians):");
    let attributes = [Attribute::Price, Attribute::MileageKm, Attribute::EnginePowerHp];
    let bmw = engine.profile(&FilterSpec::new().equals("Brand", "BMW"), &attributes)?;
    let market = engine.profile(&FilterSpec::new(), &attributes)?;
    for attribute in attributes {
        println!(
            "   {:<16} BMW {:>10.0}   market {:>10.0}",
            attribute.to_string(),
            bmw[&attribute].unwrap_or_default(),
            market[&attribute].unwrap_or_default()
        );
    }
    println!();

    // Example 8: Recommendations
    println!("8. Powerful German cars, strongest first:");
    print_results(&engine.tagged(POWERFUL_GERMAN, Some(SortKey::desc(Attribute::EnginePowerHp)))?);
    println!();

    println!("9. Dream garage - BMW or Audi, any body type, under 50 000:");
    engine.register_dream_garage(&parse_list("BMW, Audi"), &parse_list(""))?;
    print_results(&engine.tagged(DREAM_GARAGE, Some(SortKey::desc(Attribute::EnginePowerHp)))?);
    println!();

    println!("10. Tag counts:");
    let table = engine.tag()?;
    for rule in table.rules() {
        println!("   {:<20} {}", rule, table.count(rule));
    }

    Ok(())
}

fn print_results(results: &ResultSet) {
    if results.is_empty() {
        println!("   (no listings)");
        return;
    }
    for row in results.rows() {
        let car = row.record;
        println!(
            "   {} {} {} | {} | {:.0} | {} km | {} hp",
            row.id,
            car.brand.as_deref().unwrap_or("?"),
            car.series.as_deref().unwrap_or("?"),
            car.year.map(|y| y.to_string()).unwrap_or_default(),
            car.price.unwrap_or_default(),
            car.mileage_km.unwrap_or_default(),
            car.engine_power_hp.unwrap_or_default()
        );
    }
}

fn print_aggregation(result: &Aggregation) {
    let show = |value: &Option<f64>| match value {
        Some(v) => format!("{:.0}", v),
        None => "-".to_string(),
    };
    match result {
        Aggregation::Grouped(groups) => {
            for (key, value) in groups {
                println!("   {:<12} {}", key.to_string(), show(value));
            }
        }
        Aggregation::Pivot(table) => {
            let columns = result.columns();
            let header: Vec<String> = columns.iter().map(|c| format!("{:>10}", c.to_string())).collect();
            println!("   {:<12}{}", "", header.join(""));
            for (key, row) in table {
                let cells: Vec<String> = columns
                    .iter()
                    .map(|c| format!("{:>10}", row.get(c).map(show).unwrap_or_default()))
                    .collect();
                println!("   {:<12}{}", key.to_string(), cells.join(""));
            }
        }
    }
}

fn sample_listings() -> Vec<VehicleRecord> {
    let car = |brand: &str,
               series: &str,
               body: &str,
               fuel: &str,
               city: &str,
               seller: &str,
               year: i32,
               price: f64,
               km: i64,
               hp: f64,
               day: u32| VehicleRecord {
        brand: Some(brand.to_string()),
        series: Some(series.to_string()),
        body_type: Some(body.to_string()),
        fuel_type: Some(fuel.to_string()),
        city: Some(city.to_string()),
        seller_type: Some(seller.to_string()),
        year: Some(year),
        price: Some(price),
        mileage_km: Some(km),
        engine_power_hp: Some(hp),
        listing_date: NaiveDate::from_ymd_opt(2024, 3, day),
        ..Default::default()
    };

    vec![
        car("BMW", "330i", "Sedan", "Petrol", "Berlin", "Dealer", 2021, 38_000.0, 25_000, 258.0, 4),
        car("BMW", "M5", "Sedan", "Petrol", "Munich", "Dealer", 2020, 72_000.0, 40_000, 600.0, 5),
        car("BMW", "i3", "Hatchback", "BEV", "Berlin", "Private", 2019, 19_900.0, 48_000, 170.0, 6),
        car("Audi", "A3", "Hatchback", "Hybrid", "Hamburg", "Private", 2022, 27_500.0, 12_000, 204.0, 6),
        car("Audi", "RS6", "Wagon", "Petrol", "Munich", "Dealer", 2019, 89_000.0, 60_000, 600.0, 11),
        car("Mercedes", "C 200", "Sedan", "Diesel", "Berlin", "Private", 2018, 24_000.0, 98_000, 204.0, 12),
        car("Mercedes", "AMG GT", "Coupe", "Petrol", "Munich", "Dealer", 2021, 115_000.0, 9_000, 530.0, 13),
        car("Kia", "Niro EV", "Hatchback", "BEV", "Cologne", "Dealer", 2023, 29_900.0, 8_000, 204.0, 13),
        car("Toyota", "Yaris", "Hatchback", "Hybrid", "Hamburg", "Private", 2020, 18_500.0, 35_000, 116.0, 20),
        car("Seat", "Ibiza", "Hatchback", "Petrol", "Berlin", "Private", 2017, 9_900.0, 110_000, 95.0, 20),
        car("Skoda", "Octavia", "Wagon", "Diesel", "Cologne", "Dealer", 2021, 23_400.0, 54_000, 150.0, 22),
        car("Mercedes", "EQA", "SUV", "BEV", "Munich", "Dealer", 2022, 45_000.0, 15_000, 190.0, 25),
    ]
}
