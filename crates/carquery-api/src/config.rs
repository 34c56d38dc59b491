//! Engine configuration.

use carquery_core::{Error, RecordPolicy, Result};
use std::ops::RangeInclusive;

/// Price ceiling applied by the dream garage rule unless configured otherwise
pub const DEFAULT_DREAM_GARAGE_PRICE_CAP: f64 = 50_000.0;

/// Configuration for an [`Engine`](crate::Engine)
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Validation applied to every record when a store is built
    pub record_policy: RecordPolicy,
    /// Pre-register the "Powerful German" and "Efficient Compact" rules
    pub default_rules: bool,
    /// Maximum price for dream garage recommendations
    pub dream_garage_price_cap: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            record_policy: RecordPolicy::default(),
            default_rules: true,
            dream_garage_price_cap: DEFAULT_DREAM_GARAGE_PRICE_CAP,
        }
    }
}

impl EngineConfig {
    /// Restrict plausible manufacturing years
    pub fn with_years(mut self, years: RangeInclusive<i32>) -> Self {
        self.record_policy = RecordPolicy::with_years(years);
        self
    }

    /// Enable or disable the built-in tag rules
    pub fn with_default_rules(mut self, enabled: bool) -> Self {
        self.default_rules = enabled;
        self
    }

    /// Set the dream garage price ceiling
    pub fn with_dream_garage_price_cap(mut self, cap: f64) -> Self {
        self.dream_garage_price_cap = cap;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        self.record_policy.validate()?;

        if !self.dream_garage_price_cap.is_finite() || self.dream_garage_price_cap <= 0.0 {
            return Err(Error::Configuration(format!(
                "dream_garage_price_cap must be a positive number, got {}",
                self.dream_garage_price_cap
            )));
        }

        Ok(())
    }
}
