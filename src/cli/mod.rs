//! CLI support for the stresscap binary.
//!
//! Command parsing and terminal rendering live in the binary itself; this
//! module holds the pieces the library owns:
//! - The analysis file (configuration + scenario battery)

pub mod config;

pub use config::*;
