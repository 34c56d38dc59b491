/// Predicate builder
///
/// Compiles a [`FilterSpec`] into a [`Predicate`]. All validation happens
/// here, so evaluating a built predicate against a record cannot fail.
use super::filter::{Bound, Constraint, FilterSpec, Literal};
use crate::error::{Error, Result};
use crate::record::{Attribute, AttributeKind, Value, VehicleRecord};
use chrono::NaiveDate;
use std::cmp::Ordering;

/// Constraint operand resolved against the attribute kind
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Number(f64),
    Text(String),
    Date(NaiveDate),
}

impl Operand {
    fn resolve(attribute: Attribute, literal: &Literal) -> Result<Self> {
        let kind = attribute.kind();
        let operand = match (kind, literal) {
            (AttributeKind::Integer | AttributeKind::Decimal, Literal::Integer(i)) => {
                Operand::Number(*i as f64)
            }
            (AttributeKind::Integer | AttributeKind::Decimal, Literal::Float(f))
                if !f.is_nan() =>
            {
                Operand::Number(*f)
            }
            (AttributeKind::Text, Literal::Text(s)) => Operand::Text(s.clone()),
            (AttributeKind::Date, Literal::Date(d)) => Operand::Date(*d),
            (AttributeKind::Date, Literal::Text(s)) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map(Operand::Date)
                .map_err(|e| {
                    Error::config(format!("invalid date '{}' for {}: {}", s, attribute, e))
                })?,
            _ => {
                return Err(Error::config(format!(
                    "{} is a {} attribute and cannot be compared with {}",
                    attribute, kind, literal
                )))
            }
        };
        Ok(operand)
    }

    fn compare(&self, value: &Value<'_>) -> Option<Ordering> {
        match self {
            Operand::Number(n) => value.as_number().and_then(|v| v.partial_cmp(n)),
            Operand::Text(s) => value.as_text().map(|v| v.cmp(s.as_str())),
            Operand::Date(d) => match value {
                Value::Date(v) => Some(v.cmp(d)),
                _ => None,
            },
        }
    }

    fn equals(&self, value: &Value<'_>) -> bool {
        match self {
            Operand::Number(n) => value
                .as_number()
                .is_some_and(|v| (v - n).abs() < f64::EPSILON),
            _ => self.compare(value) == Some(Ordering::Equal),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Limit {
    operand: Operand,
    inclusive: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Check {
    Range {
        attribute: Attribute,
        min: Option<Limit>,
        max: Option<Limit>,
    },
    OneOf {
        attribute: Attribute,
        values: Vec<Operand>,
    },
    Equals {
        attribute: Attribute,
        value: Operand,
    },
}

impl Check {
    fn build(constraint: &Constraint) -> Result<Option<Self>> {
        let attribute = Attribute::resolve(constraint.attribute())?;
        let check = match constraint {
            Constraint::Range { min, max, .. } => {
                if attribute.kind() == AttributeKind::Text {
                    return Err(Error::config(format!(
                        "range constraint on {} requires a numeric or date attribute",
                        attribute
                    )));
                }
                let min = Self::limit(attribute, min.as_ref())?;
                let max = Self::limit(attribute, max.as_ref())?;
                if let (Some(lo), Some(hi)) = (&min, &max) {
                    if Self::operand_order(&lo.operand, &hi.operand) == Some(Ordering::Greater) {
                        return Err(Error::config(format!(
                            "malformed range on {}: min exceeds max ({})",
                            attribute, constraint
                        )));
                    }
                }
                if min.is_none() && max.is_none() {
                    return Ok(None);
                }
                Check::Range {
                    attribute,
                    min,
                    max,
                }
            }
            Constraint::OneOf { values, .. } => {
                // An empty set means "no preference", not "match nothing"
                if values.is_empty() {
                    return Ok(None);
                }
                let values = values
                    .iter()
                    .map(|v| Operand::resolve(attribute, v))
                    .collect::<Result<Vec<_>>>()?;
                Check::OneOf { attribute, values }
            }
            Constraint::Equals { value, .. } => Check::Equals {
                attribute,
                value: Operand::resolve(attribute, value)?,
            },
        };
        Ok(Some(check))
    }

    fn limit(attribute: Attribute, bound: Option<&Bound>) -> Result<Option<Limit>> {
        bound
            .map(|b| {
                Ok(Limit {
                    operand: Operand::resolve(attribute, &b.value)?,
                    inclusive: b.inclusive,
                })
            })
            .transpose()
    }

    fn operand_order(a: &Operand, b: &Operand) -> Option<Ordering> {
        match (a, b) {
            (Operand::Number(a), Operand::Number(b)) => a.partial_cmp(b),
            (Operand::Date(a), Operand::Date(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn matches(&self, record: &VehicleRecord) -> bool {
        match self {
            Check::Range {
                attribute,
                min,
                max,
            } => {
                let value = record.value(*attribute);
                // A missing value never satisfies a range
                if value.is_null() {
                    return false;
                }
                let above_min = min.as_ref().map_or(true, |lo| {
                    matches!(
                        (lo.operand.compare(&value), lo.inclusive),
                        (Some(Ordering::Greater), _) | (Some(Ordering::Equal), true)
                    )
                });
                let below_max = max.as_ref().map_or(true, |hi| {
                    matches!(
                        (hi.operand.compare(&value), hi.inclusive),
                        (Some(Ordering::Less), _) | (Some(Ordering::Equal), true)
                    )
                });
                above_min && below_max
            }
            Check::OneOf { attribute, values } => {
                let value = record.value(*attribute);
                values.iter().any(|v| v.equals(&value))
            }
            Check::Equals { attribute, value } => value.equals(&record.value(*attribute)),
        }
    }
}

/// A pure boolean function over a record: the conjunction of its checks.
///
/// A predicate with no checks matches every record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    checks: Vec<Check>,
}

impl Predicate {
    /// Build a predicate, failing fast on unknown attributes, mismatched
    /// operand kinds and malformed ranges.
    pub fn build(spec: &FilterSpec) -> Result<Self> {
        let mut checks = Vec::with_capacity(spec.constraints.len());
        for constraint in &spec.constraints {
            if let Some(check) = Check::build(constraint)? {
                checks.push(check);
            }
        }
        tracing::debug!(filter = %spec, checks = checks.len(), "Built predicate");
        Ok(Self { checks })
    }

    /// The vacuous predicate.
    pub fn always() -> Self {
        Self::default()
    }

    /// True if this predicate matches every record.
    pub fn is_vacuous(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn matches(&self, record: &VehicleRecord) -> bool {
        self.checks.iter().all(|check| check.matches(record))
    }

    /// Logical AND of two predicates.
    pub fn and(mut self, other: Predicate) -> Self {
        self.checks.extend(other.checks);
        self
    }

    /// Borrow the predicate as a plain closure.
    pub fn as_fn(&self) -> impl Fn(&VehicleRecord) -> bool + '_ {
        move |record| self.matches(record)
    }
}
