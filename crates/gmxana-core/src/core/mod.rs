//! Stateless foundations shared by the engine and the plugins.

pub mod io;
pub mod plotting;
pub mod tools;
pub mod utils;
