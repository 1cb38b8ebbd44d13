//! Borrow solver.
//!
//! Sweeps candidate LTVs, binary-searches the maximum safe borrow at each,
//! and reports the global optimum plus full per-scenario diagnostics.
//!
//! The inner search exploits a modeling assumption: for a fixed LTV,
//! safety is non-increasing as the borrow grows. This is a documented
//! precondition, not a proven property of arbitrary scenario sets, so the
//! solver can probe one sample below each discovered maximum and surface
//! violations as diagnostic warnings rather than trusting silently.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::config::SolverConfig;
use crate::core::pool::PoolState;
use crate::core::position::PositionMetrics;
use crate::core::scenario::StressScenario;
use crate::engine::evaluator::{evaluate, EvaluationRequest};
use crate::engine::gate::is_safe;
use crate::error::{Error, Result};

// ═══════════════════════════════════════════════════════════════════════════════
// DIAGNOSTICS
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-scenario diagnostic recomputed at the discovered optimum
///
/// Warning-only scenarios are included here purely for reporting; they
/// never participated in the safety gate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioDiagnostic {
    /// Scenario name, in configuration order
    pub scenario_name: String,
    /// Whether the scenario was excluded from gating
    pub warning_only: bool,
    /// Minimum health across all positions under this scenario
    pub min_health: f64,
    /// Per-position metrics under this scenario
    pub metrics: Vec<PositionMetrics>,
    /// External price after the scenario's shock
    pub shocked_external_price: f64,
    /// Pool state after borrow injection and market stress
    pub resulting_pool: PoolState,
}

/// Non-fatal findings surfaced alongside the solver result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SolverWarning {
    /// A borrow below the discovered maximum failed the gate, violating
    /// the monotonicity assumption the binary search relies on
    MonotonicityViolation {
        /// Candidate LTV at which the violation was observed
        ltv: f64,
        /// Borrow the search reported as safe
        safe_borrow: f64,
        /// Smaller borrow that failed the gate
        probe_borrow: f64,
    },
}

/// Result of a full solver run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Maximum borrow that passed every gating scenario; zero means "no
    /// safe borrow", not an error
    pub max_safe_borrow: f64,
    /// LTV at which the maximum was found; smallest LTV wins ties
    pub optimal_ltv: f64,
    /// Per-scenario diagnostics at the optimum, warning-only included,
    /// in configuration order
    pub diagnostics: Vec<ScenarioDiagnostic>,
    /// Non-fatal findings from the sweep
    pub warnings: Vec<SolverWarning>,
}

impl SolveOutcome {
    /// The discovered borrow floored to a whole debt-asset unit, for
    /// reporting collaborators
    pub fn max_safe_borrow_floor(&self) -> u64 {
        self.max_safe_borrow.max(0.0).floor() as u64
    }

    /// True when no LTV admitted any safe nonzero borrow
    pub fn is_degenerate(&self) -> bool {
        self.max_safe_borrow == 0.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOLVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Find the maximum safe borrow and its optimal LTV
///
/// The outer sweep walks the configured LTV range by index-based stepping
/// (`min + i * step`), so repeated floating-point accumulation can never
/// skip or duplicate the boundary value. An LTV whose zero-borrow gate
/// already fails is skipped outright. Ties between LTVs keep the first,
/// smallest one, since the sweep ascends.
///
/// # Errors
///
/// Configuration and scenario validation failures, and
/// [`Error::NonConvergence`] when a binary search exceeds its iteration
/// cap without shrinking below tolerance.
pub fn solve(scenarios: &[StressScenario], config: &SolverConfig) -> Result<SolveOutcome> {
    config.validate()?;
    for scenario in scenarios {
        scenario.validate()?;
        // Sells are checked against the starting reserve up front: borrow
        // injection only deepens the pool, so a sell valid here stays
        // valid in every evaluation below
        if scenario.sell_amount >= config.pool.reserve_risk() {
            return Err(Error::SellExceedsReserve {
                requested: scenario.sell_amount,
                available: config.pool.reserve_risk(),
            });
        }
    }

    let mut best_borrow = 0.0_f64;
    let mut best_ltv = config.ltv_range.min;
    let mut warnings = Vec::new();

    for i in 0..config.ltv_range.count() {
        let ltv = config.ltv_range.at(i).min(config.ltv_range.max);
        let request = EvaluationRequest::from_config(config, ltv);

        // Fast-reject: under the monotonicity assumption no borrow can be
        // safe at this LTV if zero already fails
        if !is_safe(&request, scenarios, 0.0)? {
            debug!(ltv, "zero borrow already unsafe, skipping LTV");
            continue;
        }

        let candidate = max_safe_borrow_at(&request, scenarios, config)?;
        debug!(ltv, candidate, "max safe borrow at LTV");

        if config.verify_monotonicity && candidate > config.tolerance {
            let probe = candidate / 2.0;
            if !is_safe(&request, scenarios, probe)? {
                warn!(ltv, candidate, probe, "monotonicity assumption violated");
                warnings.push(SolverWarning::MonotonicityViolation {
                    ltv,
                    safe_borrow: candidate,
                    probe_borrow: probe,
                });
            }
        }

        if candidate > best_borrow {
            best_borrow = candidate;
            best_ltv = ltv;
        }
    }

    info!(
        max_safe_borrow = best_borrow,
        optimal_ltv = best_ltv,
        "sweep complete"
    );

    // Full diagnostics at the optimum, warning-only scenarios included
    let request = EvaluationRequest::from_config(config, best_ltv);
    let mut diagnostics = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        let outcome = evaluate(&request, best_borrow, scenario)?;
        diagnostics.push(ScenarioDiagnostic {
            scenario_name: scenario.name.clone(),
            warning_only: scenario.warning_only,
            min_health: outcome.min_health,
            metrics: outcome.metrics,
            shocked_external_price: outcome.shocked_external_price,
            resulting_pool: outcome.resulting_pool,
        });
    }

    Ok(SolveOutcome {
        max_safe_borrow: best_borrow,
        optimal_ltv: best_ltv,
        diagnostics,
        warnings,
    })
}

/// Binary-search the maximum safe borrow in `[0, supply_cap]` at one LTV
///
/// The caller has already established that borrow zero is safe. Terminates
/// when the bracketing interval is at most `tolerance` wide; hitting the
/// iteration cap first is a [`Error::NonConvergence`].
fn max_safe_borrow_at(
    request: &EvaluationRequest<'_>,
    scenarios: &[StressScenario],
    config: &SolverConfig,
) -> Result<f64> {
    if is_safe(request, scenarios, config.supply_cap)? {
        return Ok(config.supply_cap);
    }

    let mut lo = 0.0_f64;
    let mut hi = config.supply_cap;
    let mut iterations = 0_u32;

    while hi - lo > config.tolerance {
        if iterations >= config.max_iterations {
            return Err(Error::NonConvergence {
                iterations,
                interval_width: hi - lo,
                tolerance: config.tolerance,
            });
        }

        let mid = 0.5 * (lo + hi);
        if is_safe(request, scenarios, mid)? {
            lo = mid;
        } else {
            hi = mid;
        }
        iterations += 1;
    }

    Ok(lo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::LtvRange;
    use crate::core::pool::PoolState;
    use crate::core::position::Position;

    fn base_config() -> SolverConfig {
        SolverConfig {
            pool: PoolState::new(1000.0, 100.0).unwrap(),
            external_spot_price: 2000.0,
            supply_cap: 100_000.0,
            tolerance: 1.0,
            ..SolverConfig::default()
        }
    }

    #[test]
    fn test_benign_battery_reaches_supply_cap_at_first_ltv() {
        // With no existing positions and a baseline-only battery, every
        // swept LTV admits the cap; the tie goes to the smallest LTV
        let config = base_config();
        let scenarios = vec![StressScenario::new("baseline", 0.0, 1.0)];

        let outcome = solve(&scenarios, &config).unwrap();

        assert_eq!(outcome.max_safe_borrow, config.supply_cap);
        assert_eq!(outcome.optimal_ltv, config.ltv_range.min);
        assert!(!outcome.is_degenerate());
        assert_eq!(outcome.max_safe_borrow_floor(), 100_000);
    }

    #[test]
    fn test_underwater_book_yields_degenerate_zero() {
        // Existing position is already past its liquidation LTV, so even
        // borrow zero fails the baseline gate at every LTV
        let mut config = base_config();
        config.positions = vec![Position::new(100.0, 17_000.0, 0.8).unwrap()];
        let scenarios = vec![StressScenario::new("baseline", 0.0, 1.0)];

        let outcome = solve(&scenarios, &config).unwrap();

        assert_eq!(outcome.max_safe_borrow, 0.0);
        assert_eq!(outcome.optimal_ltv, config.ltv_range.min);
        assert!(outcome.is_degenerate());
        // Diagnostics are still produced for the full battery
        assert_eq!(outcome.diagnostics.len(), 1);
        assert!(outcome.diagnostics[0].min_health < 1.0);
    }

    #[test]
    fn test_unsafe_at_every_size_converges_to_zero() {
        // Health of the injected position under a pure price crash is
        // liquidation_ltv * multiplier / ltv, independent of size; at
        // ltv 0.5 and multiplier 0.4 every nonzero borrow fails while
        // borrow zero passes vacuously
        let mut config = base_config();
        config.ltv_range = LtvRange { min: 0.5, max: 0.5, step: 0.05 };
        config.verify_monotonicity = false;
        let scenarios = vec![StressScenario::new("crash", 0.0, 0.4)];

        let outcome = solve(&scenarios, &config).unwrap();

        assert!(outcome.max_safe_borrow <= config.tolerance);
        assert!(outcome.is_degenerate() || outcome.max_safe_borrow_floor() <= 1);
    }

    #[test]
    fn test_result_non_decreasing_in_supply_cap() {
        let scenarios = vec![
            StressScenario::new("baseline", 0.0, 1.0),
            StressScenario::new("combined", 150.0, 0.6),
        ];

        let mut low_cap = base_config();
        low_cap.supply_cap = 10_000.0;
        let mut high_cap = base_config();
        high_cap.supply_cap = 50_000.0;

        let low = solve(&scenarios, &low_cap).unwrap();
        let high = solve(&scenarios, &high_cap).unwrap();

        assert!(high.max_safe_borrow >= low.max_safe_borrow);
    }

    #[test]
    fn test_warning_scenarios_never_gate_but_appear_in_diagnostics() {
        let config = base_config();
        let scenarios = vec![
            StressScenario::new("baseline", 0.0, 1.0),
            StressScenario::warning("black swan", 0.0, 0.05),
        ];

        let outcome = solve(&scenarios, &config).unwrap();

        // The brutal warning scenario did not stop the solver
        assert_eq!(outcome.max_safe_borrow, config.supply_cap);

        assert_eq!(outcome.diagnostics.len(), 2);
        let swan = &outcome.diagnostics[1];
        assert_eq!(swan.scenario_name, "black swan");
        assert!(swan.warning_only);
        assert!(swan.min_health < 1.0);
    }

    #[test]
    fn test_monotonicity_probe_flags_violation() {
        // A huge sell against a shallow pool: small borrows leave the pool
        // too thin to absorb it (unsafe), large borrows deepen it enough
        // to pass. The cap is safe, the half-cap probe is not.
        let mut config = base_config();
        config.ltv_range = LtvRange { min: 0.5, max: 0.5, step: 0.05 };
        config.supply_cap = 700_000.0;
        let scenarios = vec![StressScenario::new("liquidity wall", 800.0, 1.0)];

        let outcome = solve(&scenarios, &config).unwrap();

        assert_eq!(outcome.max_safe_borrow, 700_000.0);
        assert!(matches!(
            outcome.warnings.as_slice(),
            [SolverWarning::MonotonicityViolation { .. }]
        ));
    }

    #[test]
    fn test_non_convergence_is_distinguishable() {
        let mut config = base_config();
        config.max_iterations = 1;
        config.ltv_range = LtvRange { min: 0.5, max: 0.5, step: 0.05 };
        config.verify_monotonicity = false;
        // Unsafe at the cap, so the search must actually bisect
        let scenarios = vec![StressScenario::new("crash", 0.0, 0.4)];

        let result = solve(&scenarios, &config);

        assert!(matches!(result, Err(Error::NonConvergence { .. })));
    }

    #[test]
    fn test_oversized_scenario_sell_rejected_up_front() {
        let config = base_config();
        let scenarios = vec![StressScenario::new("drain", 1_000.0, 1.0)];

        assert!(matches!(
            solve(&scenarios, &config),
            Err(Error::SellExceedsReserve { .. })
        ));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = base_config();
        config.tolerance = -1.0;

        assert!(solve(&[], &config).is_err());
    }

    #[test]
    fn test_diagnostics_preserve_configuration_order() {
        let config = base_config();
        let scenarios = vec![
            StressScenario::new("c", 0.0, 1.0),
            StressScenario::warning("a", 0.0, 0.9),
            StressScenario::new("b", 10.0, 0.95),
        ];

        let outcome = solve(&scenarios, &config).unwrap();

        let names: Vec<&str> = outcome
            .diagnostics
            .iter()
            .map(|d| d.scenario_name.as_str())
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }
}
