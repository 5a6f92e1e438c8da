//! Invocation of Gromacs command-line tools.
//!
//! Plugins describe a tool call as a [`invocation::ToolInvocation`]; a
//! [`runner::ToolRunner`] turns it into a process. [`runner::SystemRunner`] supports both the
//! `gmx <tool>` driver of current Gromacs releases and the per-tool `g_<tool>` executables of
//! Gromacs 4.

pub mod invocation;
pub mod runner;

pub use invocation::{ArgValue, ToolInvocation};
pub use runner::{GromacsNaming, SystemRunner, ToolError, ToolOutput, ToolRunner};
