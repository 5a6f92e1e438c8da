//! Built-in analysis plugins.
//!
//! Each plugin is a [`crate::engine::plugin::Worker`] implementation. The [`catalog`]
//! maps plugin type names to constructors so plugins can be created from configuration.

pub mod catalog;
pub mod distances;
