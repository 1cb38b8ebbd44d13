//! Core modules for the stresscap solver.
//!
//! This module contains the fundamental building blocks:
//! - The constant-product pool model
//! - Positions and health scoring
//! - Stress scenario definitions
//! - Solver configuration

pub mod config;
pub mod pool;
pub mod position;
pub mod scenario;

pub use config::*;
pub use pool::*;
pub use position::*;
pub use scenario::*;
