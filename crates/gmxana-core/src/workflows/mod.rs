//! # Workflows Module
//!
//! High-level entry points that drive registered plugins through their phases.
//!
//! - **Pipeline** ([`pipeline`]) - runs the `run`, `analyze` and `plot` phases for a
//!   selection of plugins, reports progress and optionally exports results as CSV.

pub mod pipeline;
