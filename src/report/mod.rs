//! Report rendering for solver results.
//!
//! Presentation only: severity tags are derived here, never embedded in
//! the engine's output types, and health figures are consumed verbatim
//! from the diagnostics rather than re-derived.

use chrono::{DateTime, Utc};
use console::style;
use serde::{Deserialize, Serialize};

use crate::engine::solver::{ScenarioDiagnostic, SolveOutcome, SolverWarning};

// ═══════════════════════════════════════════════════════════════════════════════
// SEVERITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Display severity of one scenario diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioSeverity {
    /// Minimum health at or above the liquidation boundary
    Pass,
    /// Below the boundary, but the scenario never gated
    Warning,
    /// Below the boundary on a gating scenario
    Fail,
}

impl ScenarioSeverity {
    /// Derive the severity for one diagnostic
    pub fn for_diagnostic(diagnostic: &ScenarioDiagnostic) -> Self {
        if diagnostic.min_health >= 1.0 {
            ScenarioSeverity::Pass
        } else if diagnostic.warning_only {
            ScenarioSeverity::Warning
        } else {
            ScenarioSeverity::Fail
        }
    }

    /// Get display string
    pub fn as_str(&self) -> &'static str {
        match self {
            ScenarioSeverity::Pass => "PASS",
            ScenarioSeverity::Warning => "WARN",
            ScenarioSeverity::Fail => "FAIL",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOLVE REPORT
// ═══════════════════════════════════════════════════════════════════════════════

/// A timestamped, render-ready view of a solver outcome
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// The solver outcome being presented
    pub outcome: SolveOutcome,
}

impl SolveReport {
    /// Wrap a solver outcome for rendering
    pub fn new(outcome: SolveOutcome) -> Self {
        Self {
            generated_at: Utc::now(),
            outcome,
        }
    }

    /// Render as a JSON document
    pub fn render_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Render as colored (or plain) terminal text
    ///
    /// `detailed` adds the per-position metrics under each scenario.
    pub fn render_text(&self, color: bool, detailed: bool) -> String {
        let mut out = String::new();

        let headline = if self.outcome.is_degenerate() {
            "No safe borrow under the configured battery".to_string()
        } else {
            format!(
                "Max safe borrow: {} at LTV {:.2}",
                self.outcome.max_safe_borrow_floor(),
                self.outcome.optimal_ltv
            )
        };
        if color {
            out.push_str(&format!("{}\n", style(&headline).bold()));
        } else {
            out.push_str(&headline);
            out.push('\n');
        }

        for warning in &self.outcome.warnings {
            let line = match warning {
                SolverWarning::MonotonicityViolation {
                    ltv,
                    safe_borrow,
                    probe_borrow,
                } => format!(
                    "monotonicity violated at LTV {:.2}: {} safe but {} failed",
                    ltv, safe_borrow, probe_borrow
                ),
            };
            if color {
                out.push_str(&format!("{} {}\n", style("⚠").yellow(), line));
            } else {
                out.push_str(&format!("WARNING: {}\n", line));
            }
        }

        out.push('\n');
        out.push_str(&format!(
            "{:<20} {:<6} {:>12} {:>14}\n",
            "scenario", "status", "min health", "stress price"
        ));

        for diagnostic in &self.outcome.diagnostics {
            let severity = ScenarioSeverity::for_diagnostic(diagnostic);
            let status = if color {
                match severity {
                    ScenarioSeverity::Pass => style(severity.as_str()).green().to_string(),
                    ScenarioSeverity::Warning => style(severity.as_str()).yellow().to_string(),
                    ScenarioSeverity::Fail => style(severity.as_str()).red().bold().to_string(),
                }
            } else {
                severity.as_str().to_string()
            };

            // Display price of the risk asset after the stress, derived
            // from the resulting pool and the shocked external price
            let stress_price = diagnostic
                .resulting_pool
                .price_in_external_units(diagnostic.shocked_external_price);

            out.push_str(&format!(
                "{:<20} {:<6} {:>12} {:>14}\n",
                diagnostic.scenario_name,
                status,
                fmt_health(diagnostic.min_health),
                format!("{:.2}", stress_price),
            ));

            if detailed {
                for metrics in &diagnostic.metrics {
                    out.push_str(&format!(
                        "    collateral {:>12.4}  debt {:>12.2}  ltv {:>8}  health {:>8}\n",
                        metrics.position.collateral_amount,
                        metrics.position.debt_amount,
                        fmt_health(metrics.ltv),
                        fmt_health(metrics.health_score),
                    ));
                }
            }
        }

        out
    }
}

/// Format a health-like figure, keeping IEEE sentinels readable
fn fmt_health(value: f64) -> String {
    if value.is_infinite() {
        if value > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        format!("{:.4}", value)
    }
}
