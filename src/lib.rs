//! # stresscap
//!
//! Estimates how much new stable-asset debt can be safely issued against a
//! volatile-asset collateral position backed by a constant-product AMM pool,
//! across a battery of adversarial market scenarios.
//!
//! ## Architecture
//!
//! The crate consists of several core modules:
//!
//! - **Core**: the pool model, positions, health scoring, stress scenarios,
//!   and solver configuration
//! - **Engine**: the scenario evaluator, the safety gate, and the nested
//!   max-borrow search
//! - **Report**: severity tagging and terminal/JSON rendering of solver
//!   diagnostics
//! - **Cli**: the analysis file consumed by the `stresscap` binary
//!
//! ## Design Principles
//!
//! - **Immutable inputs**: every speculative evaluation works on a cloned
//!   pool; the caller's live state is never touched
//! - **Loud failures**: invalid inputs abort the evaluation with an error
//!   instead of being clamped into a silently wrong answer
//! - **Meaningful sentinels**: zero debt and zero collateral resolve to
//!   IEEE-754 `+inf`/`0` health values, not errors
//!
//! ## Example
//!
//! ```rust,ignore
//! use stresscap::prelude::*;
//!
//! let config = SolverConfig::default();
//! let scenarios = default_battery();
//!
//! let outcome = solve(&scenarios, &config)?;
//! println!("max safe borrow: {}", outcome.max_safe_borrow_floor());
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod cli;
pub mod core;
pub mod engine;
pub mod error;
pub mod report;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        config::{LtvRange, SolverConfig},
        pool::PoolState,
        position::{compute_metrics, HealthPolicy, Position, PositionMetrics},
        scenario::{default_battery, StressScenario},
    };
    pub use crate::engine::{
        evaluator::{evaluate, EvaluationRequest, ScenarioOutcome},
        gate::is_safe,
        solver::{solve, ScenarioDiagnostic, SolveOutcome, SolverWarning},
    };
    pub use crate::error::{Error, Result};
    pub use crate::report::{ScenarioSeverity, SolveReport};
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Tool name
pub const TOOL_NAME: &str = "stresscap";
