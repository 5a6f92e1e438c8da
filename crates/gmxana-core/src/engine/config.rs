use crate::core::utils::files::canonical;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
}

/// Input files and layout of one simulation.
///
/// `tpr` and `xtc` are only `None` when the configuration was built with `strict = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationConfig {
    pub tpr: Option<PathBuf>,
    pub xtc: Option<PathBuf>,
    pub ndx: Option<PathBuf>,
    pub edr: Option<PathBuf>,
    pub analysis_dir: PathBuf,
    pub strict: bool,
    pub absolute: bool,
}

#[derive(Debug, Default)]
pub struct SimulationConfigBuilder {
    base_dir: Option<PathBuf>,
    tpr: Option<PathBuf>,
    xtc: Option<PathBuf>,
    ndx: Option<PathBuf>,
    edr: Option<PathBuf>,
    analysis_dir: Option<PathBuf>,
    strict: Option<bool>,
    absolute: Option<bool>,
}

impl SimulationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory that relative paths are resolved against (current directory by default).
    pub fn base_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(path.into());
        self
    }
    pub fn tpr(mut self, path: impl Into<PathBuf>) -> Self {
        self.tpr = Some(path.into());
        self
    }
    pub fn xtc(mut self, path: impl Into<PathBuf>) -> Self {
        self.xtc = Some(path.into());
        self
    }
    pub fn ndx(mut self, path: impl Into<PathBuf>) -> Self {
        self.ndx = Some(path.into());
        self
    }
    pub fn edr(mut self, path: impl Into<PathBuf>) -> Self {
        self.edr = Some(path.into());
        self
    }
    pub fn analysis_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.analysis_dir = Some(path.into());
        self
    }
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = Some(strict);
        self
    }
    pub fn absolute(mut self, absolute: bool) -> Self {
        self.absolute = Some(absolute);
        self
    }

    pub fn build(self) -> Result<SimulationConfig, ConfigError> {
        let strict = self.strict.unwrap_or(true);
        let absolute = self.absolute.unwrap_or(true);
        let base = self.base_dir.as_deref();
        let resolve = |p: Option<PathBuf>| p.map(|p| canonical(base, &p, absolute));

        let required = |value: Option<PathBuf>, name: &'static str| match value {
            Some(path) => Ok(Some(path)),
            None if strict => Err(ConfigError::MissingParameter(name)),
            None => {
                warn!(
                    "Required attribute '{}' not found... continuing because of strict=false",
                    name
                );
                Ok(None)
            }
        };

        let tpr = resolve(required(self.tpr, "tpr")?);
        let xtc = resolve(required(self.xtc, "xtc")?);
        let ndx = resolve(self.ndx);
        let edr = resolve(self.edr);

        let analysis_dir = match self.analysis_dir {
            Some(dir) => canonical(base, &dir, absolute),
            None => tpr
                .as_deref()
                .and_then(Path::parent)
                .filter(|dir| !dir.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| canonical(base, Path::new("."), absolute)),
        };

        Ok(SimulationConfig {
            tpr,
            xtc,
            ndx,
            edr,
            analysis_dir,
            strict,
            absolute,
        })
    }
}
