//! Positions and solvency scoring.
//!
//! This module implements the per-position health calculator:
//! - LTV against pool-derived collateral value
//! - Health score (liquidation LTV over current LTV)
//! - Liquidation price
//!
//! Zero debt and zero collateral are meaningful financial states, not
//! errors: they resolve to IEEE-754 sentinel values (`+inf` health for a
//! risk-free position, `0` health for certain liquidation).

use serde::{Deserialize, Serialize};

use crate::core::pool::PoolState;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// A collateralized borrow position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Collateral in risk-asset units
    pub collateral_amount: f64,
    /// Debt in debt-asset units
    pub debt_amount: f64,
    /// LTV at which the position becomes liquidatable, in (0, 1]
    pub liquidation_ltv: f64,
    /// External-asset exposure, tracking-only
    #[serde(default)]
    pub exposure_amount: f64,
    /// Price at which the exposure was entered, tracking-only
    #[serde(default)]
    pub entry_price: f64,
}

impl Position {
    /// Create a new position
    pub fn new(collateral_amount: f64, debt_amount: f64, liquidation_ltv: f64) -> Result<Self> {
        if !collateral_amount.is_finite() || collateral_amount < 0.0 {
            return Err(Error::InvalidAmount {
                name: "collateral_amount",
                value: collateral_amount,
            });
        }
        if !debt_amount.is_finite() || debt_amount < 0.0 {
            return Err(Error::InvalidAmount {
                name: "debt_amount",
                value: debt_amount,
            });
        }
        validate_ltv(liquidation_ltv, "liquidation_ltv")?;

        Ok(Self {
            collateral_amount,
            debt_amount,
            liquidation_ltv,
            exposure_amount: 0.0,
            entry_price: 0.0,
        })
    }

    /// Attach tracking-only exposure figures
    pub fn with_exposure(mut self, exposure_amount: f64, entry_price: f64) -> Self {
        self.exposure_amount = exposure_amount;
        self.entry_price = entry_price;
        self
    }

    /// Check if the position carries any debt
    pub fn has_debt(&self) -> bool {
        self.debt_amount > 0.0
    }

    /// Validate field invariants, for positions built outside [`Position::new`]
    pub fn validate(&self) -> Result<()> {
        Self::new(self.collateral_amount, self.debt_amount, self.liquidation_ltv)?;
        Ok(())
    }
}

/// Validate an LTV-like parameter is in (0, 1]
pub fn validate_ltv(value: f64, name: &'static str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(Error::InvalidLtv { name, value });
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH POLICY
// ═══════════════════════════════════════════════════════════════════════════════

/// Policy knobs for the health calculation
///
/// Whether external-asset exposure counts toward collateral is an explicit
/// toggle. The default excludes it: exposure and entry price are carried
/// through untouched and never enter the solvency math.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthPolicy {
    /// Credit `exposure_amount * external_price` to collateral value
    #[serde(default)]
    pub count_exposure: bool,
}

// ═══════════════════════════════════════════════════════════════════════════════
// POSITION METRICS
// ═══════════════════════════════════════════════════════════════════════════════

/// A position together with its derived solvency figures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionMetrics {
    /// The underlying position, carried through unmodified
    pub position: Position,
    /// Current loan-to-value; `+inf` when collateral value is zero
    pub ltv: f64,
    /// Liquidation LTV over current LTV; safe iff at least 1
    pub health_score: f64,
    /// Risk-asset price at which the position liquidates
    pub liquidation_price: f64,
}

impl PositionMetrics {
    /// Safe iff the health score is at least 1, boundary inclusive
    pub fn is_safe(&self) -> bool {
        self.health_score >= 1.0
    }
}

/// Compute solvency metrics for one position against a pool and an
/// external quote-asset price
///
/// Pure function of its inputs; nothing is mutated or cached.
pub fn compute_metrics(
    pool: &PoolState,
    external_price: f64,
    position: &Position,
) -> PositionMetrics {
    compute_metrics_with_policy(pool, external_price, position, HealthPolicy::default())
}

/// [`compute_metrics`] with an explicit [`HealthPolicy`]
pub fn compute_metrics_with_policy(
    pool: &PoolState,
    external_price: f64,
    position: &Position,
    policy: HealthPolicy,
) -> PositionMetrics {
    let risk_price = pool.price_in_external_units(external_price);
    let mut collateral_value = position.collateral_amount * risk_price;
    if policy.count_exposure {
        collateral_value += position.exposure_amount * external_price;
    }

    if position.debt_amount == 0.0 {
        // Risk-free: no debt can never liquidate
        return PositionMetrics {
            position: position.clone(),
            ltv: 0.0,
            health_score: f64::INFINITY,
            liquidation_price: 0.0,
        };
    }

    // IEEE-754 semantics: zero collateral value gives ltv = +inf,
    // health 0 (certain liquidation) and liquidation price +inf
    let ltv = position.debt_amount / collateral_value;
    let health_score = position.liquidation_ltv / ltv;
    let liquidation_price =
        position.debt_amount / (position.liquidation_ltv * position.collateral_amount);

    PositionMetrics {
        position: position.clone(),
        ltv,
        health_score,
        liquidation_price,
    }
}
