//! Scenario evaluator.
//!
//! Evaluates one stress scenario against one candidate borrow. The
//! evaluation is a pure function: the starting pool is cloned, the
//! candidate borrow (if any) deepens the clone with price-neutral paired
//! liquidity, the market stress is applied, and every position is scored
//! against the post-stress state. No input is ever mutated, so concurrent
//! or repeated evaluations cannot interfere.

use serde::{Deserialize, Serialize};

use crate::core::config::SolverConfig;
use crate::core::pool::PoolState;
use crate::core::position::{
    compute_metrics_with_policy, validate_ltv, HealthPolicy, Position, PositionMetrics,
};
use crate::core::scenario::StressScenario;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION REQUEST
// ═══════════════════════════════════════════════════════════════════════════════

/// Shared context for evaluating candidate borrows
///
/// Bundles everything that stays fixed while the solver varies the borrow
/// size and the scenario.
#[derive(Debug, Clone)]
pub struct EvaluationRequest<'a> {
    /// Existing positions, evaluated alongside any candidate borrow
    pub positions: &'a [Position],
    /// Current external quote-asset price
    pub external_spot_price: f64,
    /// Target LTV of the candidate borrow
    pub target_ltv: f64,
    /// Liquidation LTV assigned to the candidate borrow
    pub liquidation_ltv: f64,
    /// Starting pool; cloned for every evaluation, never mutated
    pub pool: &'a PoolState,
    /// Health-calculation policy
    pub policy: HealthPolicy,
}

impl<'a> EvaluationRequest<'a> {
    /// Build a request from a solver configuration and a candidate LTV
    pub fn from_config(config: &'a SolverConfig, target_ltv: f64) -> Self {
        Self {
            positions: &config.positions,
            external_spot_price: config.external_spot_price,
            target_ltv,
            liquidation_ltv: config.liquidation_ltv,
            pool: &config.pool,
            policy: HealthPolicy::default(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SCENARIO OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of evaluating one scenario at one candidate borrow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    /// Minimum health across all evaluated positions; `+inf` for an empty
    /// book (vacuous safety)
    pub min_health: f64,
    /// Per-position metrics against the post-stress pool
    pub metrics: Vec<PositionMetrics>,
    /// The pool after borrow injection and market stress
    pub resulting_pool: PoolState,
    /// External price after the scenario's multiplicative shock
    pub shocked_external_price: f64,
}

impl ScenarioOutcome {
    /// Safe iff the worst position is at or above the liquidation boundary
    pub fn is_safe(&self) -> bool {
        self.min_health >= 1.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Evaluate one stress scenario at one candidate borrow size
///
/// Execution order is fixed: clone the pool, inject the candidate borrow
/// as price-neutral paired liquidity (the risk leg is newly minted, never
/// bought on the open market), apply the market sell, shock the external
/// price, then score every position.
///
/// # Errors
///
/// Invalid inputs (negative borrow, non-positive multiplier, sell at least
/// as large as the pool reserve, out-of-range LTVs) abort this one
/// evaluation loudly rather than clamping into a silently wrong answer.
pub fn evaluate(
    request: &EvaluationRequest<'_>,
    borrow: f64,
    scenario: &StressScenario,
) -> Result<ScenarioOutcome> {
    scenario.validate()?;
    if !borrow.is_finite() || borrow < 0.0 {
        return Err(Error::InvalidAmount {
            name: "borrow",
            value: borrow,
        });
    }
    if !request.external_spot_price.is_finite() || request.external_spot_price <= 0.0 {
        return Err(Error::InvalidPrice {
            name: "external_spot_price",
            value: request.external_spot_price,
        });
    }

    let mut pool = request.pool.clone();
    let mut working: Vec<Position> = request.positions.to_vec();

    if borrow > 0.0 {
        validate_ltv(request.target_ltv, "target_ltv")?;
        validate_ltv(request.liquidation_ltv, "liquidation_ltv")?;

        let risk_price = pool.price_in_external_units(request.external_spot_price);
        let collateral = borrow / (request.target_ltv * risk_price);
        let exposure = borrow / request.external_spot_price;
        let minted_risk = borrow / risk_price;

        // Paired 1:1 in external-currency notional; matches the spot ratio,
        // so pool depth grows while the price stays put
        pool.add_liquidity(minted_risk, exposure)?;

        working.push(
            Position::new(collateral, borrow, request.liquidation_ltv)?
                .with_exposure(exposure, risk_price),
        );
    }

    if scenario.sell_amount > 0.0 {
        pool.sell_risk(scenario.sell_amount)?;
    }

    let shocked_external_price = request.external_spot_price * scenario.price_multiplier;

    let metrics: Vec<PositionMetrics> = working
        .iter()
        .map(|position| {
            compute_metrics_with_policy(&pool, shocked_external_price, position, request.policy)
        })
        .collect();

    let min_health = metrics
        .iter()
        .map(|m| m.health_score)
        .fold(f64::INFINITY, f64::min);

    Ok(ScenarioOutcome {
        min_health,
        metrics,
        resulting_pool: pool,
        shocked_external_price,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_pool() -> PoolState {
        PoolState::new(1000.0, 100.0).unwrap()
    }

    fn request<'a>(positions: &'a [Position], pool: &'a PoolState) -> EvaluationRequest<'a> {
        EvaluationRequest {
            positions,
            external_spot_price: 2000.0,
            target_ltv: 0.4,
            liquidation_ltv: 0.8,
            pool,
            policy: HealthPolicy::default(),
        }
    }

    #[test]
    fn test_empty_book_is_vacuously_safe() {
        let pool = reference_pool();
        let req = request(&[], &pool);
        let scenario = StressScenario::new("baseline", 0.0, 1.0);

        let outcome = evaluate(&req, 0.0, &scenario).unwrap();

        assert_eq!(outcome.min_health, f64::INFINITY);
        assert!(outcome.metrics.is_empty());
        assert!(outcome.is_safe());
    }

    #[test]
    fn test_borrow_injection_deepens_pool_price_neutrally() {
        // Borrow 10000 at target LTV 0.4 and risk price 200: collateral
        // 125, exposure 5 quote, minted risk 50
        let pool = reference_pool();
        let req = request(&[], &pool);
        let scenario = StressScenario::new("baseline", 0.0, 1.0);

        let outcome = evaluate(&req, 10_000.0, &scenario).unwrap();

        assert_eq!(outcome.resulting_pool.reserve_risk(), 1050.0);
        assert_eq!(outcome.resulting_pool.reserve_quote(), 105.0);
        assert!((outcome.resulting_pool.spot_price() - 0.1).abs() < 1e-12);

        let injected = &outcome.metrics[0];
        assert!((injected.position.collateral_amount - 125.0).abs() < 1e-9);
        assert_eq!(injected.position.debt_amount, 10_000.0);
        assert!((injected.position.exposure_amount - 5.0).abs() < 1e-12);
        assert!((injected.position.entry_price - 200.0).abs() < 1e-12);
        assert!((injected.ltv - 0.4).abs() < 1e-12);
        assert!((injected.health_score - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_sell_applies_after_borrow_injection() {
        let pool = reference_pool();
        let req = request(&[], &pool);
        let scenario = StressScenario::new("selloff", 150.0, 1.0);

        let outcome = evaluate(&req, 10_000.0, &scenario).unwrap();

        // Sell hits the deepened pool: 1050 + 150 risk, quote solved from
        // the deepened invariant
        assert_eq!(outcome.resulting_pool.reserve_risk(), 1200.0);
        let expected_quote = 1050.0 * 105.0 / 1200.0;
        assert!((outcome.resulting_pool.reserve_quote() - expected_quote).abs() < 1e-9);
    }

    #[test]
    fn test_price_shock_applies_to_external_price() {
        let pool = reference_pool();
        let positions = [Position::new(100.0, 15000.0, 0.8).unwrap()];
        let req = request(&positions, &pool);
        let scenario = StressScenario::new("crash", 0.0, 0.5);

        let outcome = evaluate(&req, 0.0, &scenario).unwrap();

        assert_eq!(outcome.shocked_external_price, 1000.0);
        // Halved price doubles the LTV: 0.75 -> 1.5
        assert!((outcome.metrics[0].ltv - 1.5).abs() < 1e-12);
        assert!(!outcome.is_safe());
    }

    #[test]
    fn test_min_health_is_worst_position() {
        let pool = reference_pool();
        let positions = [
            Position::new(100.0, 5000.0, 0.8).unwrap(),
            Position::new(100.0, 15000.0, 0.8).unwrap(),
        ];
        let req = request(&positions, &pool);
        let scenario = StressScenario::new("baseline", 0.0, 1.0);

        let outcome = evaluate(&req, 0.0, &scenario).unwrap();

        let worst = outcome
            .metrics
            .iter()
            .map(|m| m.health_score)
            .fold(f64::INFINITY, f64::min);
        assert_eq!(outcome.min_health, worst);
        assert!((outcome.min_health - 0.8 / 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_inputs_are_never_mutated() {
        let pool = reference_pool();
        let positions = vec![Position::new(100.0, 15000.0, 0.8).unwrap()];
        let req = request(&positions, &pool);
        let scenario = StressScenario::new("stress", 200.0, 0.7);

        evaluate(&req, 50_000.0, &scenario).unwrap();

        assert_eq!(pool.reserve_risk(), 1000.0);
        assert_eq!(pool.reserve_quote(), 100.0);
        assert_eq!(positions.len(), 1);
        assert_eq!(positions[0].debt_amount, 15000.0);
    }

    #[test]
    fn test_invalid_inputs_abort_loudly() {
        let pool = reference_pool();
        let req = request(&[], &pool);

        let bad_mult = StressScenario::new("bad", 0.0, -1.0);
        assert!(evaluate(&req, 0.0, &bad_mult).is_err());

        let ok = StressScenario::new("ok", 0.0, 1.0);
        assert!(matches!(
            evaluate(&req, -5.0, &ok),
            Err(Error::InvalidAmount { name: "borrow", .. })
        ));

        let oversized = StressScenario::new("oversized", 1_000_000.0, 1.0);
        assert!(matches!(
            evaluate(&req, 0.0, &oversized),
            Err(Error::SellExceedsReserve { .. })
        ));
    }

    #[test]
    fn test_zero_target_ltv_rejected_only_when_borrowing() {
        let pool = reference_pool();
        let mut req = request(&[], &pool);
        req.target_ltv = 0.0;
        let scenario = StressScenario::new("baseline", 0.0, 1.0);

        // No borrow: target LTV is unused
        assert!(evaluate(&req, 0.0, &scenario).is_ok());
        // Borrowing: division by a zero target LTV must be refused
        assert!(matches!(
            evaluate(&req, 1000.0, &scenario),
            Err(Error::InvalidLtv { name: "target_ltv", .. })
        ));
    }
}
