//! Vehicle listing records and their attributes.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// The kind of data an attribute holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Text,
    Integer,
    Decimal,
    Date,
}

impl AttributeKind {
    /// Integer and decimal attributes.
    pub fn is_numeric(&self) -> bool {
        matches!(self, AttributeKind::Integer | AttributeKind::Decimal)
    }
}

impl fmt::Display for AttributeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeKind::Text => write!(f, "text"),
            AttributeKind::Integer => write!(f, "integer"),
            AttributeKind::Decimal => write!(f, "decimal"),
            AttributeKind::Date => write!(f, "date"),
        }
    }
}

/// One attribute of a [`VehicleRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Brand,
    Series,
    Model,
    BodyType,
    FuelType,
    DriveTrain,
    TransmissionType,
    City,
    SellerType,
    Year,
    Price,
    MileageKm,
    EnginePowerHp,
    EngineSizeCc,
    ListingTitle,
    ListingDate,
}

impl Attribute {
    /// Every attribute, in dataset column order.
    pub const ALL: [Attribute; 16] = [
        Attribute::Brand,
        Attribute::Series,
        Attribute::Model,
        Attribute::BodyType,
        Attribute::FuelType,
        Attribute::DriveTrain,
        Attribute::TransmissionType,
        Attribute::City,
        Attribute::SellerType,
        Attribute::Year,
        Attribute::Price,
        Attribute::MileageKm,
        Attribute::EnginePowerHp,
        Attribute::EngineSizeCc,
        Attribute::ListingTitle,
        Attribute::ListingDate,
    ];

    /// Column name used by the listings dataset.
    pub fn column_name(&self) -> &'static str {
        match self {
            Attribute::Brand => "Brand",
            Attribute::Series => "Series",
            Attribute::Model => "Model",
            Attribute::BodyType => "BodyType",
            Attribute::FuelType => "FuelType",
            Attribute::DriveTrain => "DriveTrain",
            Attribute::TransmissionType => "TransmissionType",
            Attribute::City => "City",
            Attribute::SellerType => "SellerType",
            Attribute::Year => "Year",
            Attribute::Price => "Price",
            Attribute::MileageKm => "Mileage(km)",
            Attribute::EnginePowerHp => "EnginePower(HP)",
            Attribute::EngineSizeCc => "EngineSize(cc)",
            Attribute::ListingTitle => "ListingTitle",
            Attribute::ListingDate => "ListingDate",
        }
    }

    /// snake_case alias accepted by [`Attribute::from_str`].
    pub fn alias(&self) -> &'static str {
        match self {
            Attribute::Brand => "brand",
            Attribute::Series => "series",
            Attribute::Model => "model",
            Attribute::BodyType => "body_type",
            Attribute::FuelType => "fuel_type",
            Attribute::DriveTrain => "drive_train",
            Attribute::TransmissionType => "transmission_type",
            Attribute::City => "city",
            Attribute::SellerType => "seller_type",
            Attribute::Year => "year",
            Attribute::Price => "price",
            Attribute::MileageKm => "mileage_km",
            Attribute::EnginePowerHp => "engine_power_hp",
            Attribute::EngineSizeCc => "engine_size_cc",
            Attribute::ListingTitle => "listing_title",
            Attribute::ListingDate => "listing_date",
        }
    }

    pub fn kind(&self) -> AttributeKind {
        match self {
            Attribute::Year | Attribute::MileageKm => AttributeKind::Integer,
            Attribute::Price | Attribute::EnginePowerHp | Attribute::EngineSizeCc => {
                AttributeKind::Decimal
            }
            Attribute::ListingDate => AttributeKind::Date,
            _ => AttributeKind::Text,
        }
    }

    /// Resolve a user-supplied attribute name, failing with a configuration error.
    pub fn resolve(name: &str) -> Result<Self> {
        name.parse()
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self> {
        let wanted = name.trim();
        Attribute::ALL
            .iter()
            .copied()
            .find(|attr| {
                attr.column_name().eq_ignore_ascii_case(wanted)
                    || attr.alias().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| Error::config(format!("unknown attribute '{}'", name)))
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

/// Borrowed view of one attribute value of a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Text(&'a str),
    Integer(i64),
    Decimal(f64),
    Date(NaiveDate),
    Null,
}

impl<'a> Value<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of integer and decimal values.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Decimal(d) if !d.is_nan() => Some(*d),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&'a str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Ordering between two non-null values of the same kind.
    ///
    /// Nulls and mixed kinds are unordered.
    pub fn compare(&self, other: &Value<'_>) -> Option<Ordering> {
        match (self, other) {
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            _ => match (self.as_number(), other.as_number()) {
                (Some(a), Some(b)) => a.partial_cmp(&b),
                _ => None,
            },
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => write!(f, "{}", s),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Date(d) => write!(f, "{}", d),
            Value::Null => write!(f, "NULL"),
        }
    }
}

/// One vehicle-for-sale listing.
///
/// Every attribute is nullable; a missing value never fails a query, it only
/// excludes the record from constraints and statistics on that attribute.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleRecord {
    pub brand: Option<String>,
    pub series: Option<String>,
    pub model: Option<String>,
    pub body_type: Option<String>,
    pub fuel_type: Option<String>,
    pub drive_train: Option<String>,
    pub transmission_type: Option<String>,
    pub city: Option<String>,
    pub seller_type: Option<String>,
    pub year: Option<i32>,
    pub price: Option<f64>,
    pub mileage_km: Option<i64>,
    pub engine_power_hp: Option<f64>,
    pub engine_size_cc: Option<f64>,
    pub listing_title: Option<String>,
    pub listing_date: Option<NaiveDate>,
}

impl VehicleRecord {
    /// Read one attribute.
    pub fn value(&self, attribute: Attribute) -> Value<'_> {
        fn text(v: &Option<String>) -> Value<'_> {
            v.as_deref().map_or(Value::Null, Value::Text)
        }
        fn decimal(v: Option<f64>) -> Value<'static> {
            match v {
                Some(d) if !d.is_nan() => Value::Decimal(d),
                _ => Value::Null,
            }
        }

        match attribute {
            Attribute::Brand => text(&self.brand),
            Attribute::Series => text(&self.series),
            Attribute::Model => text(&self.model),
            Attribute::BodyType => text(&self.body_type),
            Attribute::FuelType => text(&self.fuel_type),
            Attribute::DriveTrain => text(&self.drive_train),
            Attribute::TransmissionType => text(&self.transmission_type),
            Attribute::City => text(&self.city),
            Attribute::SellerType => text(&self.seller_type),
            Attribute::Year => self.year.map_or(Value::Null, |y| Value::Integer(y as i64)),
            Attribute::Price => decimal(self.price),
            Attribute::MileageKm => self.mileage_km.map_or(Value::Null, Value::Integer),
            Attribute::EnginePowerHp => decimal(self.engine_power_hp),
            Attribute::EngineSizeCc => decimal(self.engine_size_cc),
            Attribute::ListingTitle => text(&self.listing_title),
            Attribute::ListingDate => self.listing_date.map_or(Value::Null, Value::Date),
        }
    }

    /// Numeric value of an attribute, `None` if null or not numeric.
    pub fn number(&self, attribute: Attribute) -> Option<f64> {
        self.value(attribute).as_number()
    }

    /// Age of the vehicle in years relative to `reference_year`.
    pub fn age(&self, reference_year: i32) -> Option<i32> {
        self.year.map(|year| reference_year - year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_column_names_and_aliases() {
        assert_eq!(Attribute::resolve("Brand").unwrap(), Attribute::Brand);
        assert_eq!(
            Attribute::resolve("EnginePower(HP)").unwrap(),
            Attribute::EnginePowerHp
        );
        assert_eq!(
            Attribute::resolve("mileage_km").unwrap(),
            Attribute::MileageKm
        );
        assert_eq!(Attribute::resolve(" fueltype ").unwrap(), Attribute::FuelType);
    }

    #[test]
    fn test_unknown_attribute() {
        let err = Attribute::resolve("Colour").unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("Colour"));
    }

    #[test]
    fn test_every_attribute_round_trips_through_its_names() {
        for attr in Attribute::ALL {
            assert_eq!(Attribute::resolve(attr.column_name()).unwrap(), attr);
            assert_eq!(Attribute::resolve(attr.alias()).unwrap(), attr);
        }
    }

    #[test]
    fn test_record_values() {
        let record = VehicleRecord {
            brand: Some("BMW".to_string()),
            year: Some(2021),
            price: Some(40_000.0),
            engine_power_hp: Some(f64::NAN),
            ..Default::default()
        };

        assert_eq!(record.value(Attribute::Brand), Value::Text("BMW"));
        assert_eq!(record.value(Attribute::Year), Value::Integer(2021));
        assert_eq!(record.number(Attribute::Price), Some(40_000.0));
        assert!(record.value(Attribute::EnginePowerHp).is_null());
        assert!(record.value(Attribute::City).is_null());
        assert_eq!(record.age(2025), Some(4));
    }

    #[test]
    fn test_value_compare() {
        assert_eq!(
            Value::Integer(3).compare(&Value::Decimal(2.5)),
            Some(Ordering::Greater)
        );
        assert_eq!(Value::Text("a").compare(&Value::Text("b")), Some(Ordering::Less));
        assert_eq!(Value::Null.compare(&Value::Integer(1)), None);
        assert_eq!(Value::Text("1").compare(&Value::Integer(1)), None);
    }
}
