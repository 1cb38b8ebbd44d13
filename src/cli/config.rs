//! Analysis file handling.
//!
//! The `stresscap` binary reads everything it needs from one JSON
//! analysis file: the solver configuration (pool, positions, knobs) and
//! the scenario battery.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::config::SolverConfig;
use crate::core::position::Position;
use crate::core::scenario::{default_battery, StressScenario};

// ═══════════════════════════════════════════════════════════════════════════════
// ANALYSIS CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Everything one solver run needs, as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Solver configuration: pool, positions, sweep knobs
    pub solver: SolverConfig,
    /// Scenario battery, evaluated in order
    pub scenarios: Vec<StressScenario>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        let mut solver = SolverConfig::default();
        solver.positions = vec![Position::new(100.0, 8_000.0, 0.8)
            .expect("sample position is valid")];

        Self {
            solver,
            scenarios: default_battery(),
        }
    }
}

impl AnalysisConfig {
    /// Load from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Save to a JSON file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::Serialize(e.to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }

        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    /// Validate the solver configuration and every scenario
    pub fn validate(&self) -> crate::error::Result<()> {
        self.solver.validate()?;
        for scenario in &self.scenarios {
            scenario.validate()?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONFIG ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Errors while reading or writing the analysis file
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    /// Filesystem error
    #[error("IO error: {0}")]
    Io(String),
    /// Malformed JSON or invalid values
    #[error("Parse error: {0}")]
    Parse(String),
    /// Serialization failed
    #[error("Serialize error: {0}")]
    Serialize(String),
}
