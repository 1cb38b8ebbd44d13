//! Solver configuration and parameters.
//!
//! All tunable knobs of the borrow solver live here as an explicit
//! configuration value constructed by the caller. Module-level defaults
//! are provided as named constants; nothing in the crate reads global
//! state.

use serde::{Deserialize, Serialize};

use crate::core::pool::PoolState;
use crate::core::position::{validate_ltv, Position};
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// DEFAULT CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default borrow resolution in debt-asset units
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// Default upper bound on any candidate borrow
pub const DEFAULT_SUPPLY_CAP: f64 = 1_000_000.0;

/// Default lower bound of the LTV sweep
pub const DEFAULT_LTV_MIN: f64 = 0.10;

/// Default upper bound of the LTV sweep
pub const DEFAULT_LTV_MAX: f64 = 0.80;

/// Reference LTV sweep step
pub const DEFAULT_LTV_STEP: f64 = 0.05;

/// Default liquidation LTV assigned to the candidate borrow
pub const DEFAULT_LIQUIDATION_LTV: f64 = 0.80;

/// Hard cap on binary-search iterations before reporting non-convergence
pub const DEFAULT_MAX_ITERATIONS: u32 = 256;

/// Default external quote-asset price
pub const DEFAULT_EXTERNAL_SPOT_PRICE: f64 = 2_000.0;

/// Default pool risk-asset reserve
pub const DEFAULT_RESERVE_RISK: f64 = 1_000.0;

/// Default pool quote-asset reserve
pub const DEFAULT_RESERVE_QUOTE: f64 = 100.0;

// ═══════════════════════════════════════════════════════════════════════════════
// LTV RANGE
// ═══════════════════════════════════════════════════════════════════════════════

/// Inclusive LTV sweep range with a fixed step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtvRange {
    /// Smallest candidate LTV, inclusive
    pub min: f64,
    /// Largest candidate LTV, inclusive
    pub max: f64,
    /// Sweep step
    pub step: f64,
}

impl Default for LtvRange {
    fn default() -> Self {
        Self {
            min: DEFAULT_LTV_MIN,
            max: DEFAULT_LTV_MAX,
            step: DEFAULT_LTV_STEP,
        }
    }
}

impl LtvRange {
    /// Number of candidate LTVs in the sweep, boundary inclusive
    pub fn count(&self) -> usize {
        ((self.max - self.min) / self.step + 1e-9) as usize + 1
    }

    /// Candidate LTV at sweep index `i`
    ///
    /// Index-based stepping avoids the drift of repeated floating-point
    /// accumulation, which can skip or duplicate the boundary value.
    pub fn at(&self, i: usize) -> f64 {
        self.min + (i as f64) * self.step
    }

    /// Validate range consistency
    pub fn validate(&self) -> Result<()> {
        validate_ltv(self.min, "ltv_range.min")?;
        validate_ltv(self.max, "ltv_range.max")?;
        if self.min > self.max {
            return Err(Error::InvalidParameter {
                name: "ltv_range",
                reason: format!("min {} above max {}", self.min, self.max),
            });
        }
        if !self.step.is_finite() || self.step <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "ltv_range.step",
                reason: format!("step {} must be finite and positive", self.step),
            });
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOLVER CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Complete configuration of one solver run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Borrow resolution: the binary search stops once the bracketing
    /// interval is at most this wide, in debt-asset units
    pub tolerance: f64,

    /// Upper bound on any candidate borrow
    pub supply_cap: f64,

    /// Candidate LTV sweep range
    pub ltv_range: LtvRange,

    /// Liquidation LTV assigned to the candidate borrow position
    pub liquidation_ltv: f64,

    /// Binary-search iteration cap; exceeding it is a
    /// [`Error::NonConvergence`], never a silently wrong answer
    pub max_iterations: u32,

    /// Probe one borrow below each per-LTV maximum and surface a warning
    /// when the monotonicity assumption is violated
    pub verify_monotonicity: bool,

    /// Existing positions evaluated alongside the candidate borrow
    pub positions: Vec<Position>,

    /// Current external quote-asset price
    pub external_spot_price: f64,

    /// Starting pool state; never mutated by the solver
    pub pool: PoolState,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            supply_cap: DEFAULT_SUPPLY_CAP,
            ltv_range: LtvRange::default(),
            liquidation_ltv: DEFAULT_LIQUIDATION_LTV,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verify_monotonicity: true,
            positions: Vec::new(),
            external_spot_price: DEFAULT_EXTERNAL_SPOT_PRICE,
            pool: PoolState::new(DEFAULT_RESERVE_RISK, DEFAULT_RESERVE_QUOTE)
                .expect("default reserves are valid"),
        }
    }
}

impl SolverConfig {
    /// Validate the full configuration
    pub fn validate(&self) -> Result<()> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                reason: format!("{} must be finite and positive", self.tolerance),
            });
        }
        if !self.supply_cap.is_finite() || self.supply_cap <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "supply_cap",
                reason: format!("{} must be finite and positive", self.supply_cap),
            });
        }
        self.ltv_range.validate()?;
        validate_ltv(self.liquidation_ltv, "liquidation_ltv")?;
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".into(),
            });
        }
        if !self.external_spot_price.is_finite() || self.external_spot_price <= 0.0 {
            return Err(Error::InvalidPrice {
                name: "external_spot_price",
                value: self.external_spot_price,
            });
        }
        for position in &self.positions {
            position.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SolverConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ltv_range_count_is_boundary_inclusive() {
        let range = LtvRange { min: 0.10, max: 0.80, step: 0.05 };
        assert_eq!(range.count(), 15);
        assert!((range.at(0) - 0.10).abs() < 1e-12);
        assert!((range.at(range.count() - 1) - 0.80).abs() < 1e-9);
    }

    #[test]
    fn test_ltv_range_single_value() {
        let range = LtvRange { min: 0.40, max: 0.40, step: 0.05 };
        assert_eq!(range.count(), 1);
        assert_eq!(range.at(0), 0.40);
    }

    #[test]
    fn test_ltv_range_validation() {
        assert!(LtvRange { min: 0.5, max: 0.4, step: 0.05 }.validate().is_err());
        assert!(LtvRange { min: 0.0, max: 0.4, step: 0.05 }.validate().is_err());
        assert!(LtvRange { min: 0.1, max: 0.4, step: 0.0 }.validate().is_err());
        assert!(LtvRange { min: 0.1, max: 1.2, step: 0.05 }.validate().is_err());
    }

    #[test]
    fn test_config_field_validation() {
        let mut config = SolverConfig::default();
        config.tolerance = 0.0;
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter { name: "tolerance", .. })
        ));

        let mut config = SolverConfig::default();
        config.supply_cap = f64::INFINITY;
        assert!(config.validate().is_err());

        let mut config = SolverConfig::default();
        config.external_spot_price = -1.0;
        assert!(config.validate().is_err());

        let mut config = SolverConfig::default();
        config.positions.push(Position {
            collateral_amount: 1.0,
            debt_amount: 1.0,
            liquidation_ltv: 2.0,
            exposure_amount: 0.0,
            entry_price: 0.0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_serde_fills_defaults() {
        let config: SolverConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SolverConfig::default());

        let config: SolverConfig =
            serde_json::from_str(r#"{"supply_cap": 50000.0}"#).unwrap();
        assert_eq!(config.supply_cap, 50_000.0);
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
    }
}
