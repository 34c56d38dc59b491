/// Filter specification types
///
/// A [`FilterSpec`] is plain data: attribute names are kept as strings and
/// only resolved when a predicate is built from the spec.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Constraint operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Integer(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Integer(v)
    }
}

impl From<i32> for Literal {
    fn from(v: i32) -> Self {
        Literal::Integer(v as i64)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Text(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Text(v)
    }
}

impl From<NaiveDate> for Literal {
    fn from(v: NaiveDate) -> Self {
        Literal::Date(v)
    }
}

/// One end of a range constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bound {
    pub value: Literal,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(value: impl Into<Literal>) -> Self {
        Self {
            value: value.into(),
            inclusive: true,
        }
    }

    pub fn exclusive(value: impl Into<Literal>) -> Self {
        Self {
            value: value.into(),
            inclusive: false,
        }
    }
}

/// A single named constraint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Constraint {
    /// `min <= attribute <= max`; either end may be absent
    Range {
        attribute: String,
        min: Option<Bound>,
        max: Option<Bound>,
    },
    /// `attribute IN (values)`; an empty set is skipped
    OneOf {
        attribute: String,
        values: Vec<Literal>,
    },
    /// `attribute = value`
    Equals { attribute: String, value: Literal },
}

impl Constraint {
    pub fn attribute(&self) -> &str {
        match self {
            Constraint::Range { attribute, .. }
            | Constraint::OneOf { attribute, .. }
            | Constraint::Equals { attribute, .. } => attribute,
        }
    }
}

/// A conjunction of constraints. No constraints matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterSpec {
    pub constraints: Vec<Constraint>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Add an arbitrary constraint.
    pub fn with(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Add a range constraint with explicit bounds.
    pub fn range(self, attribute: &str, min: Option<Bound>, max: Option<Bound>) -> Self {
        self.with(Constraint::Range {
            attribute: attribute.to_string(),
            min,
            max,
        })
    }

    /// `attribute >= min AND attribute <= max`
    pub fn between(
        self,
        attribute: &str,
        min: impl Into<Literal>,
        max: impl Into<Literal>,
    ) -> Self {
        self.range(
            attribute,
            Some(Bound::inclusive(min)),
            Some(Bound::inclusive(max)),
        )
    }

    /// `attribute >= min`
    pub fn at_least(self, attribute: &str, min: impl Into<Literal>) -> Self {
        self.range(attribute, Some(Bound::inclusive(min)), None)
    }

    /// `attribute <= max`
    pub fn at_most(self, attribute: &str, max: impl Into<Literal>) -> Self {
        self.range(attribute, None, Some(Bound::inclusive(max)))
    }

    /// `attribute > min`
    pub fn greater_than(self, attribute: &str, min: impl Into<Literal>) -> Self {
        self.range(attribute, Some(Bound::exclusive(min)), None)
    }

    /// `attribute < max`
    pub fn less_than(self, attribute: &str, max: impl Into<Literal>) -> Self {
        self.range(attribute, None, Some(Bound::exclusive(max)))
    }

    /// `attribute IN (values)`
    pub fn one_of<I, V>(self, attribute: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Literal>,
    {
        self.with(Constraint::OneOf {
            attribute: attribute.to_string(),
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    /// `attribute = value`
    pub fn equals(self, attribute: &str, value: impl Into<Literal>) -> Self {
        self.with(Constraint::Equals {
            attribute: attribute.to_string(),
            value: value.into(),
        })
    }

    /// Conjunction of two specs.
    pub fn and(mut self, other: FilterSpec) -> Self {
        self.constraints.extend(other.constraints);
        self
    }
}

// Display implementations for logging and error messages

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(fl) => write!(f, "{}", fl),
            Literal::Text(s) => write!(f, "'{}'", s),
            Literal::Date(d) => write!(f, "{}", d),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Range {
                attribute,
                min,
                max,
            } => {
                let mut first = true;
                if let Some(min) = min {
                    let op = if min.inclusive { ">=" } else { ">" };
                    write!(f, "{} {} {}", attribute, op, min.value)?;
                    first = false;
                }
                if let Some(max) = max {
                    if !first {
                        write!(f, " AND ")?;
                    }
                    let op = if max.inclusive { "<=" } else { "<" };
                    write!(f, "{} {} {}", attribute, op, max.value)?;
                    first = false;
                }
                if first {
                    write!(f, "{} IS ANY", attribute)?;
                }
                Ok(())
            }
            Constraint::OneOf { attribute, values } => {
                write!(f, "{} IN (", attribute)?;
                for (i, val) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", val)?;
                }
                write!(f, ")")
            }
            Constraint::Equals { attribute, value } => write!(f, "{} = {}", attribute, value),
        }
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraints.is_empty() {
            return write!(f, "TRUE");
        }
        for (i, constraint) in self.constraints.iter().enumerate() {
            if i > 0 {
                write!(f, " AND ")?;
            }
            write!(f, "({})", constraint)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_collects_constraints() {
        let spec = FilterSpec::new()
            .at_least("Year", 2020)
            .at_most("Price", 30_000.0)
            .one_of("FuelType", ["Hybrid", "BEV"]);

        assert_eq!(spec.constraints().len(), 3);
        assert_eq!(spec.constraints()[2].attribute(), "FuelType");
        assert!(FilterSpec::new().is_empty());
    }

    #[test]
    fn test_display() {
        let spec = FilterSpec::new()
            .greater_than("EnginePower(HP)", 300)
            .one_of("Brand", ["BMW", "Audi"]);
        assert_eq!(
            spec.to_string(),
            "(EnginePower(HP) > 300) AND (Brand IN ('BMW', 'Audi'))"
        );
        assert_eq!(FilterSpec::new().to_string(), "TRUE");
    }

    #[test]
    fn test_and_concatenates() {
        let a = FilterSpec::new().equals("Brand", "BMW");
        let b = FilterSpec::new().less_than("Price", 50_000.0);
        assert_eq!(a.and(b).constraints().len(), 2);
    }
}
