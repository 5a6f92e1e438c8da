use super::config::ConfigError;
use crate::core::io::export::CsvExportError;
use crate::core::io::xvg::XvgError;
use crate::core::plotting::PlotError;
use crate::core::tools::ToolError;
use crate::core::utils::files::FileCheckError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    FileCheck(#[from] FileCheckError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Failed to read data file '{path}': {source}", path = path.display())]
    DataFile {
        path: PathBuf,
        #[source]
        source: XvgError,
    },

    #[error("Plotting failed: {0}")]
    Plot(#[from] PlotError),

    #[error("Export failed: {0}")]
    Export(#[from] CsvExportError),

    #[error("Simulation has no '{0}' file")]
    MissingInput(&'static str),

    #[error("plugin_name ('{name}') must be None or one of {available:?}")]
    UnknownPlugin {
        name: String,
        available: Vec<String>,
    },

    #[error("Unknown plugin type '{kind}'; available plugins: {available:?}")]
    UnknownPluginKind {
        kind: String,
        available: Vec<String>,
    },

    #[error("No default plugin was set.")]
    NoDefaultPlugin,

    #[error("Plugin '{0}' is already registered with a simulation")]
    AlreadyRegistered(String),

    #[error("Plugin '{0}' must be registered with a simulation first")]
    NotRegistered(String),

    #[error("Plugin '{plugin}' does not implement the '{phase}' phase")]
    NotImplemented { plugin: String, phase: &'static str },

    #[error("Invalid parameter for plugin '{plugin}': {message}")]
    InvalidParameter { plugin: String, message: String },

    #[error("Plugin '{plugin}' sets option '-{arg}' itself; pass it to the plugin instead")]
    ReservedArgument { plugin: String, arg: String },

    #[error("name = '{name}' not known, choose one of {available:?}")]
    UnknownResult {
        name: String,
        available: Vec<String>,
    },
}
