//! Constant-product pool model.
//!
//! This module implements the `x * y = k` pool the solver stresses:
//! - Market sells in both directions
//! - Liquidity mutation
//! - Spot and external-unit pricing
//!
//! Every mutating operation recomputes the invariant `k`, and both swap
//! directions use the same semantics: the input reserve grows by the input
//! amount and the opposite reserve is solved from the invariant. Trials
//! always operate on a value copy of the pool, never on a shared reference.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// POOL STATE
// ═══════════════════════════════════════════════════════════════════════════════

/// Serialized form of a pool: reserves only, invariant rebuilt on load
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPool {
    /// Risk-asset reserve
    reserve_risk: f64,
    /// Quote-asset reserve
    reserve_quote: f64,
}

impl From<PoolState> for RawPool {
    fn from(pool: PoolState) -> Self {
        Self {
            reserve_risk: pool.reserve_risk,
            reserve_quote: pool.reserve_quote,
        }
    }
}

impl TryFrom<RawPool> for PoolState {
    type Error = Error;

    fn try_from(raw: RawPool) -> Result<Self> {
        PoolState::new(raw.reserve_risk, raw.reserve_quote)
    }
}

/// State of a constant-product AMM pool
///
/// Reserves are kept private so the invariant `k = reserve_risk *
/// reserve_quote` can only change through the validated operations below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPool", into = "RawPool")]
pub struct PoolState {
    /// Risk-asset reserve, strictly positive
    reserve_risk: f64,
    /// Quote-asset reserve, strictly positive
    reserve_quote: f64,
    /// Product invariant, recomputed after every mutation
    k: f64,
}

impl PoolState {
    /// Create a new pool from its two reserves
    pub fn new(reserve_risk: f64, reserve_quote: f64) -> Result<Self> {
        validate_reserve(reserve_risk, "reserve_risk")?;
        validate_reserve(reserve_quote, "reserve_quote")?;

        let k = reserve_risk * reserve_quote;
        if !k.is_finite() {
            return Err(Error::InvalidParameter {
                name: "reserves",
                reason: format!(
                    "product of reserves {} * {} is not finite",
                    reserve_risk, reserve_quote
                ),
            });
        }

        Ok(Self {
            reserve_risk,
            reserve_quote,
            k,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Risk-asset reserve
    pub fn reserve_risk(&self) -> f64 {
        self.reserve_risk
    }

    /// Quote-asset reserve
    pub fn reserve_quote(&self) -> f64 {
        self.reserve_quote
    }

    /// Product invariant
    pub fn k(&self) -> f64 {
        self.k
    }

    /// Spot price of the risk asset in quote-asset units
    pub fn spot_price(&self) -> f64 {
        self.reserve_quote / self.reserve_risk
    }

    /// Price of the risk asset in external-currency units, given the
    /// external price of the quote asset
    pub fn price_in_external_units(&self, external_price: f64) -> f64 {
        self.spot_price() * external_price
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SWAPS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Execute a market sell of `amount` risk asset into the pool
    ///
    /// The risk reserve grows by `amount`, the quote reserve is solved from
    /// the invariant, and the quote paid out to the seller is returned.
    /// The risk price falls as a result.
    pub fn sell_risk(&mut self, amount: f64) -> Result<f64> {
        validate_amount(amount, "sell_amount")?;
        if amount >= self.reserve_risk {
            return Err(Error::SellExceedsReserve {
                requested: amount,
                available: self.reserve_risk,
            });
        }

        let new_risk = self.reserve_risk + amount;
        let new_quote = self.k / new_risk;
        let quote_out = self.reserve_quote - new_quote;

        self.reserve_risk = new_risk;
        self.reserve_quote = new_quote;
        self.k = self.reserve_risk * self.reserve_quote;

        Ok(quote_out)
    }

    /// Execute a market sell of `amount` quote asset into the pool
    ///
    /// Exact mirror of [`PoolState::sell_risk`]: the quote reserve grows by
    /// `amount`, the risk reserve is solved from the invariant, and the
    /// risk paid out is returned. The risk price rises as a result.
    pub fn sell_quote(&mut self, amount: f64) -> Result<f64> {
        validate_amount(amount, "sell_amount")?;
        if amount >= self.reserve_quote {
            return Err(Error::SellExceedsReserve {
                requested: amount,
                available: self.reserve_quote,
            });
        }

        let new_quote = self.reserve_quote + amount;
        let new_risk = self.k / new_quote;
        let risk_out = self.reserve_risk - new_risk;

        self.reserve_quote = new_quote;
        self.reserve_risk = new_risk;
        self.k = self.reserve_risk * self.reserve_quote;

        Ok(risk_out)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LIQUIDITY
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit liquidity into both reserves
    ///
    /// Adding in the exact ratio of the current spot price leaves the spot
    /// price unchanged while increasing pool depth.
    pub fn add_liquidity(&mut self, risk_amount: f64, quote_amount: f64) -> Result<()> {
        validate_amount(risk_amount, "risk_amount")?;
        validate_amount(quote_amount, "quote_amount")?;

        self.reserve_risk += risk_amount;
        self.reserve_quote += quote_amount;
        self.k = self.reserve_risk * self.reserve_quote;

        Ok(())
    }

    /// Withdraw liquidity from both reserves
    pub fn remove_liquidity(&mut self, risk_amount: f64, quote_amount: f64) -> Result<()> {
        validate_amount(risk_amount, "risk_amount")?;
        validate_amount(quote_amount, "quote_amount")?;

        if risk_amount >= self.reserve_risk {
            return Err(Error::RemovalExceedsReserve {
                name: "reserve_risk",
                requested: risk_amount,
                remaining: self.reserve_risk - risk_amount,
            });
        }
        if quote_amount >= self.reserve_quote {
            return Err(Error::RemovalExceedsReserve {
                name: "reserve_quote",
                requested: quote_amount,
                remaining: self.reserve_quote - quote_amount,
            });
        }

        self.reserve_risk -= risk_amount;
        self.reserve_quote -= quote_amount;
        self.k = self.reserve_risk * self.reserve_quote;

        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALIDATION HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn validate_reserve(value: f64, name: &'static str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidReserve { name, value });
    }
    Ok(())
}

fn validate_amount(value: f64, name: &'static str) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(Error::InvalidAmount { name, value });
    }
    Ok(())
}
