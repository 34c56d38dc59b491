//! Error types for CarQuery.

use std::fmt;

/// The main error type for CarQuery operations.
///
/// Every variant is raised while a spec or a store is being built. Once a
/// predicate, query or aggregation has been validated, running it against a
/// store cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A filter, sort, aggregation or tag rule is invalid (unknown attribute,
    /// operand of the wrong kind, `min > max`, duplicate rule name, ...)
    Configuration(String),

    /// A record violates the store invariants (negative price, implausible year, ...)
    InvalidRecord(String),

    /// A lock was poisoned (internal error)
    LockPoisoned,
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    /// Returns true if this error was caused by an invalid spec.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            Error::InvalidRecord(msg) => write!(f, "Invalid record: {}", msg),
            Error::LockPoisoned => write!(f, "Lock poisoned"),
        }
    }
}

impl std::error::Error for Error {}

/// A specialized `Result` type for CarQuery operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::config("unknown attribute 'Colour'");
        assert_eq!(
            err.to_string(),
            "Configuration error: unknown attribute 'Colour'"
        );
        assert!(err.is_configuration());
        assert!(!Error::LockPoisoned.is_configuration());
    }
}
