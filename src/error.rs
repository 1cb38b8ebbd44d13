//! Error types for the stresscap solver.
//!
//! This module defines all error types used throughout the crate,
//! providing clear and actionable error messages.
//!
//! Degenerate math (zero collateral, zero debt) is deliberately absent
//! here: those resolve to IEEE-754 sentinel values in the health
//! calculator because they represent meaningful financial states, not
//! bugs.

use thiserror::Error;

/// Result type alias for stresscap operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the stresscap solver
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Pool Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A pool reserve is zero, negative, or non-finite
    #[error("Invalid reserve {name}: {value} (must be finite and positive)")]
    InvalidReserve {
        /// Reserve name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A swap or liquidity amount is zero, negative, or non-finite
    #[error("Invalid amount {name}: {value} (must be finite and positive)")]
    InvalidAmount {
        /// Amount name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A market sell is at least as large as the reserve of the asset sold
    #[error("Sell size {requested} exceeds available reserve {available}")]
    SellExceedsReserve {
        /// Requested sell size
        requested: f64,
        /// Reserve of the asset being sold
        available: f64,
    },

    /// A liquidity removal would zero or invert a reserve
    #[error("Removing {requested} from reserve {name} would leave {remaining}")]
    RemovalExceedsReserve {
        /// Reserve name
        name: &'static str,
        /// Requested removal
        requested: f64,
        /// Reserve value after removal
        remaining: f64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Evaluation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// An external price is zero, negative, or non-finite
    #[error("Invalid price {name}: {value} (must be finite and positive)")]
    InvalidPrice {
        /// Price name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    /// A scenario price multiplier is zero, negative, or non-finite
    #[error("Invalid price multiplier {value} in scenario {scenario}")]
    InvalidPriceMultiplier {
        /// Scenario name
        scenario: String,
        /// Offending multiplier
        value: f64,
    },

    /// An LTV parameter is outside its valid range
    #[error("Invalid LTV {name}: {value} (must be in (0, 1])")]
    InvalidLtv {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Configuration Errors
    // ═══════════════════════════════════════════════════════════════════

    /// A solver configuration field is inconsistent
    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Solver Errors
    // ═══════════════════════════════════════════════════════════════════

    /// The binary search failed to shrink below tolerance within its cap
    #[error(
        "Binary search did not converge after {iterations} iterations: \
         interval width {interval_width} above tolerance {tolerance}"
    )]
    NonConvergence {
        /// Iterations performed
        iterations: u32,
        /// Interval width when the cap was hit
        interval_width: f64,
        /// Configured tolerance
        tolerance: f64,
    },
}

impl Error {
    /// Returns true if this error is recoverable by fixing the inputs
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::NonConvergence { .. })
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(self, Error::NonConvergence { .. })
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Pool errors: 1xxx
            Error::InvalidReserve { .. } => 1001,
            Error::InvalidAmount { .. } => 1002,
            Error::SellExceedsReserve { .. } => 1003,
            Error::RemovalExceedsReserve { .. } => 1004,

            // Evaluation errors: 2xxx
            Error::InvalidPrice { .. } => 2001,
            Error::InvalidPriceMultiplier { .. } => 2002,
            Error::InvalidLtv { .. } => 2003,

            // Configuration errors: 3xxx
            Error::InvalidParameter { .. } => 3001,

            // Solver errors: 4xxx
            Error::NonConvergence { .. } => 4001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_unique() {
        let codes = vec![
            Error::InvalidReserve { name: "r", value: 0.0 }.code(),
            Error::InvalidAmount { name: "a", value: 0.0 }.code(),
            Error::SellExceedsReserve { requested: 1.0, available: 0.5 }.code(),
            Error::RemovalExceedsReserve { name: "r", requested: 1.0, remaining: -1.0 }.code(),
            Error::InvalidPrice { name: "p", value: 0.0 }.code(),
            Error::InvalidPriceMultiplier { scenario: "s".into(), value: -1.0 }.code(),
            Error::InvalidLtv { name: "ltv", value: 2.0 }.code(),
            Error::InvalidParameter { name: "tolerance", reason: "".into() }.code(),
            Error::NonConvergence { iterations: 0, interval_width: 1.0, tolerance: 0.1 }.code(),
        ];

        let mut unique_codes = codes.clone();
        unique_codes.sort();
        unique_codes.dedup();

        assert_eq!(codes.len(), unique_codes.len(), "Error codes must be unique");
    }

    #[test]
    fn test_error_display() {
        let err = Error::SellExceedsReserve {
            requested: 1500.0,
            available: 1000.0,
        };
        assert!(err.to_string().contains("1500"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_is_recoverable() {
        assert!(Error::InvalidAmount { name: "borrow", value: -1.0 }.is_recoverable());
        assert!(!Error::NonConvergence {
            iterations: 256,
            interval_width: 10.0,
            tolerance: 1.0
        }
        .is_recoverable());
    }

    #[test]
    fn test_is_critical() {
        assert!(Error::NonConvergence {
            iterations: 256,
            interval_width: 10.0,
            tolerance: 1.0
        }
        .is_critical());
        assert!(!Error::InvalidLtv { name: "target_ltv", value: 0.0 }.is_critical());
    }
}
