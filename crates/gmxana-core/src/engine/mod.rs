//! # Engine Module
//!
//! This module implements the plugin registry that organizes the analysis of a single
//! simulation.
//!
//! ## Overview
//!
//! A [`simulation::Simulation`] is created from a [`config::SimulationConfig`] that names the
//! simulation's input files. Analyses are added as [`plugin::Plugin`]s; each plugin is known
//! under a unique name and owns a [`plugin::Worker`] that does the actual work. Registering a
//! plugin hands the worker the [`context::SimulationContext`], after which it knows where the
//! input files are and where to write its output.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Input files, analysis directory and strictness
//! - **Context** ([`context`]) - What workers may see of the simulation, tool execution
//! - **Plugins** ([`plugin`]) - The `Plugin`/`Worker` pair and the phase options
//! - **Registry** ([`simulation`]) - Plugin lookup, default plugin and phase dispatch
//! - **Progress Monitoring** ([`progress`]) - Progress reporting to front ends
//! - **Error Handling** ([`error`]) - Engine-wide error type

pub mod config;
pub mod context;
pub mod error;
pub mod plugin;
pub mod progress;
pub mod simulation;
