//! # gmxana Core Library
//!
//! A plugin framework for post-processing Gromacs molecular-dynamics simulations.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture that keeps file handling, the plugin
//! registry and complete procedures apart.
//!
//! - **[`core`]: The Foundation.** Stateless building blocks: the XVG data format, CSV
//!   export, invocation of Gromacs command-line tools, file checks and figure rendering.
//!
//! - **[`engine`]: The Registry.** A [`engine::simulation::Simulation`] knows the input
//!   files of one simulation and owns a set of named [`engine::plugin::Plugin`]s. Every
//!   plugin carries a [`engine::plugin::Worker`] that implements the `run`, `analyze` and
//!   `plot` phases of one analysis.
//!
//! - **[`plugins`]: The Analyses.** The catalog of built-in plugins, addressable by name.
//!
//! - **[`workflows`]: The Public API.** Drives the phases of a set of plugins with progress
//!   reporting.

pub mod core;
pub mod engine;
pub mod plugins;
pub mod workflows;
