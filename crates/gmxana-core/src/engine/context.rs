use super::config::SimulationConfig;
use super::error::AnalysisError;
use crate::core::tools::{ToolError, ToolInvocation, ToolOutput, ToolRunner};
use crate::core::utils::files::ensure_parent;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// The part of a simulation that workers can see: input files, the analysis directory and
/// the means to run Gromacs tools.
#[derive(Clone)]
pub struct SimulationContext {
    tpr: Option<PathBuf>,
    xtc: Option<PathBuf>,
    ndx: Option<PathBuf>,
    edr: Option<PathBuf>,
    analysis_dir: PathBuf,
    runner: Arc<dyn ToolRunner>,
}

impl SimulationContext {
    pub fn new(config: &SimulationConfig, runner: Arc<dyn ToolRunner>) -> Self {
        Self {
            tpr: config.tpr.clone(),
            xtc: config.xtc.clone(),
            ndx: config.ndx.clone(),
            edr: config.edr.clone(),
            analysis_dir: config.analysis_dir.clone(),
            runner,
        }
    }

    pub fn tpr(&self) -> Result<&Path, AnalysisError> {
        self.tpr.as_deref().ok_or(AnalysisError::MissingInput("tpr"))
    }

    pub fn xtc(&self) -> Result<&Path, AnalysisError> {
        self.xtc.as_deref().ok_or(AnalysisError::MissingInput("xtc"))
    }

    pub fn ndx(&self) -> Option<&Path> {
        self.ndx.as_deref()
    }

    pub fn edr(&self) -> Option<&Path> {
        self.edr.as_deref()
    }

    pub fn analysis_dir(&self) -> &Path {
        &self.analysis_dir
    }

    /// Returns a path under the analysis directory whose parent directory exists.
    pub fn topdir(&self, path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
        let p = self.analysis_dir.join(path);
        ensure_parent(&p)?;
        Ok(p)
    }

    pub fn run_tool(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        debug!("Running Gromacs tool: {}", invocation);
        self.runner.run(invocation)
    }
}

fn show(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map_or_else(|| "None".to_string(), |p| format!("'{}'", p.display()))
}

impl fmt::Display for SimulationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Simulation(tpr={}, xtc={}, edr={}, ndx={}, analysisdir='{}')",
            show(&self.tpr),
            show(&self.xtc),
            show(&self.edr),
            show(&self.ndx),
            self.analysis_dir.display()
        )
    }
}

impl fmt::Debug for SimulationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
