//! Safety gate.
//!
//! Reduces a scenario battery to one verdict: is this borrow size safe
//! everywhere that matters. Warning-only scenarios inform but never block,
//! so the gate skips them without evaluating; the first failing gating
//! scenario short-circuits the rest.

use tracing::debug;

use crate::core::scenario::StressScenario;
use crate::engine::evaluator::{evaluate, EvaluationRequest};
use crate::error::Result;

/// Check whether a candidate borrow survives every gating scenario
///
/// Scenarios are visited in the given order. Deterministic and
/// side-effect-free: every evaluation runs on its own pool clone.
///
/// # Errors
///
/// Propagates the first evaluation error; an invalid scenario aborts the
/// gate rather than being skipped.
pub fn is_safe(
    request: &EvaluationRequest<'_>,
    scenarios: &[StressScenario],
    borrow: f64,
) -> Result<bool> {
    for scenario in scenarios {
        if scenario.warning_only {
            continue;
        }

        let outcome = evaluate(request, borrow, scenario)?;
        if !outcome.is_safe() {
            debug!(
                scenario = %scenario.name,
                borrow,
                min_health = outcome.min_health,
                "gate failed"
            );
            return Ok(false);
        }
    }

    Ok(true)
}
