//! Stress scenario definitions.
//!
//! A stress scenario combines a hypothetical market sell of the risk asset
//! with a multiplicative shock to the external quote-asset price. Scenario
//! sets are plain configuration values constructed by the caller; there is
//! no process-wide scenario registry.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// STRESS SCENARIO
// ═══════════════════════════════════════════════════════════════════════════════

/// One adversarial market scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Human-readable scenario name
    pub name: String,
    /// Risk-asset market sell size, zero for a pure price shock
    pub sell_amount: f64,
    /// Multiplicative shock applied to the external quote-asset price
    pub price_multiplier: f64,
    /// Reported for visibility but excluded from the safety gate
    #[serde(default)]
    pub warning_only: bool,
}

impl StressScenario {
    /// Create a gating scenario
    pub fn new(name: impl Into<String>, sell_amount: f64, price_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            sell_amount,
            price_multiplier,
            warning_only: false,
        }
    }

    /// Create a warning-only scenario
    pub fn warning(name: impl Into<String>, sell_amount: f64, price_multiplier: f64) -> Self {
        Self {
            name: name.into(),
            sell_amount,
            price_multiplier,
            warning_only: true,
        }
    }

    /// Validate the scenario parameters
    pub fn validate(&self) -> Result<()> {
        if !self.sell_amount.is_finite() || self.sell_amount < 0.0 {
            return Err(Error::InvalidAmount {
                name: "sell_amount",
                value: self.sell_amount,
            });
        }
        if !self.price_multiplier.is_finite() || self.price_multiplier <= 0.0 {
            return Err(Error::InvalidPriceMultiplier {
                scenario: self.name.clone(),
                value: self.price_multiplier,
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT BATTERY
// ═══════════════════════════════════════════════════════════════════════════════

/// Default scenario battery sized for the default pool configuration
///
/// Sell sizes are absolute risk-asset amounts; recalibrate them when the
/// configured pool depth differs from the default.
pub fn default_battery() -> Vec<StressScenario> {
    vec![
        StressScenario::new("baseline", 0.0, 1.0),
        StressScenario::new("moderate selloff", 50.0, 0.9),
        StressScenario::new("heavy selloff", 150.0, 0.75),
        StressScenario::new("price crash", 0.0, 0.5),
        StressScenario::new("combined stress", 150.0, 0.7),
        StressScenario::warning("black swan", 400.0, 0.3),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_validation() {
        assert!(StressScenario::new("ok", 0.0, 1.0).validate().is_ok());
        assert!(StressScenario::new("ok", 100.0, 0.5).validate().is_ok());

        assert!(StressScenario::new("bad sell", -1.0, 1.0).validate().is_err());
        assert!(StressScenario::new("bad mult", 0.0, 0.0).validate().is_err());
        assert!(StressScenario::new("bad mult", 0.0, -0.5).validate().is_err());
        assert!(StressScenario::new("bad mult", 0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn test_default_battery() {
        let battery = default_battery();
        assert!(!battery.is_empty());
        assert!(battery.iter().all(|s| s.validate().is_ok()));
        // Exactly one warning-only scenario in the default set
        assert_eq!(battery.iter().filter(|s| s.warning_only).count(), 1);
    }

    #[test]
    fn test_serde_defaults_warning_flag() {
        let json = r#"{"name": "x", "sell_amount": 10.0, "price_multiplier": 0.8}"#;
        let scenario: StressScenario = serde_json::from_str(json).unwrap();
        assert!(!scenario.warning_only);
    }
}
