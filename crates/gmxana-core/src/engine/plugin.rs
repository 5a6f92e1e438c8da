use super::context::SimulationContext;
use super::error::AnalysisError;
use crate::core::io::traits::DataFile;
use crate::core::io::xvg::{XvgData, XvgFile};
use crate::core::plotting::{self, ImageFormat, Panel};
use crate::core::tools::ArgValue;
use crate::core::utils::files::ensure_parent;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const DOC_HEADER: &str = "PLUGIN DOCUMENTATION";

/// Results of the `analyze` phase, keyed by result name.
pub type Results = BTreeMap<String, XvgData>;

/// Options for the `run` phase.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Regenerate data even if output files already exist.
    pub force: bool,
    /// Additional options for the Gromacs tool (e.g. `b`, `e`, `dt`).
    pub extra_args: Vec<(String, ArgValue)>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Skipped { reason: String },
}

/// Where a figure goes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Figure {
    /// The worker's default figure name, once per requested format.
    #[default]
    Default,
    /// This file; the extension selects the format.
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotOptions {
    /// Results to plot; `None` plots all of them.
    pub names: Option<Vec<String>>,
    pub figure: Figure,
    pub formats: Vec<ImageFormat>,
}

impl Default for PlotOptions {
    fn default() -> Self {
        Self {
            names: None,
            figure: Figure::Default,
            formats: ImageFormat::defaults(),
        }
    }
}

/// Parameters shared by all workers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Parameters {
    /// Data files produced by `run`, keyed by result name.
    pub filenames: BTreeMap<String, PathBuf>,
    /// Default figure path without extension.
    pub figname: Option<PathBuf>,
}

/// State every worker carries: its name, where it keeps files, parameters and results.
#[derive(Debug, Clone, Default)]
pub struct WorkerBase {
    plugin_name: String,
    location: String,
    analysis_dir: Option<PathBuf>,
    pub parameters: Parameters,
    pub results: Results,
}

impl WorkerBase {
    pub fn new(plugin_name: impl Into<String>) -> Self {
        let plugin_name = plugin_name.into();
        Self {
            location: plugin_name.clone(),
            plugin_name,
            ..Default::default()
        }
    }

    pub fn plugin_name(&self) -> &str {
        &self.plugin_name
    }

    /// Directory name under the analysis directory.
    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn is_attached(&self) -> bool {
        self.analysis_dir.is_some()
    }

    pub(crate) fn rename(&mut self, name: &str) {
        self.plugin_name = name.to_string();
        self.location = name.to_string();
    }

    pub(crate) fn attach(&mut self, ctx: &SimulationContext) {
        self.analysis_dir = Some(ctx.analysis_dir().to_path_buf());
    }

    fn analysis_dir(&self) -> Result<&Path, AnalysisError> {
        self.analysis_dir
            .as_deref()
            .ok_or_else(|| AnalysisError::NotRegistered(self.plugin_name.clone()))
    }

    /// Returns a path under the analysis directory; its parent directory is created.
    pub fn topdir(&self, path: impl AsRef<Path>) -> Result<PathBuf, AnalysisError> {
        let p = self.analysis_dir()?.join(path);
        ensure_parent(&p)?;
        Ok(p)
    }

    /// Returns a path under the plugin directory.
    pub fn plugindir(&self, path: impl AsRef<Path>) -> Result<PathBuf, AnalysisError> {
        self.topdir(Path::new(&self.location).join(path))
    }

    /// Returns a path under the shared figure directory.
    pub fn figdir(&self, path: impl AsRef<Path>) -> Result<PathBuf, AnalysisError> {
        self.topdir(Path::new("figs").join(path))
    }

    /// Writes `data` to `<plugindir>/<name>.xvg` and records it as result `name`.
    pub fn store_xvg(&mut self, name: &str, data: XvgData) -> Result<PathBuf, AnalysisError> {
        let filename = self.plugindir(format!("{}.xvg", name))?;
        XvgFile::write_to_path(&data, &filename).map_err(|source| AnalysisError::DataFile {
            path: filename.clone(),
            source,
        })?;
        self.results.insert(name.to_string(), data);
        self.parameters
            .filenames
            .insert(name.to_string(), filename.clone());
        Ok(filename)
    }

    /// Loads every file in `parameters.filenames` as XVG into `results`.
    pub fn load_results(&mut self) -> Result<&Results, AnalysisError> {
        let mut results = Results::new();
        for (name, path) in &self.parameters.filenames {
            let data = XvgFile::read_from_path(path).map_err(|source| AnalysisError::DataFile {
                path: path.clone(),
                source,
            })?;
            results.insert(name.clone(), data);
        }
        self.results = results;
        Ok(&self.results)
    }

    /// Renders `panels` according to `opts` and returns the written files.
    pub fn savefig(
        &self,
        panels: &[Panel],
        opts: &PlotOptions,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        let mut written = Vec::new();
        match &opts.figure {
            Figure::File(path) => {
                let format = ImageFormat::from_path(path)?;
                plotting::render(panels, path, format)?;
                written.push(path.clone());
            }
            Figure::Default => {
                let stem = self.parameters.figname.as_deref().ok_or_else(|| {
                    AnalysisError::InvalidParameter {
                        plugin: self.plugin_name.clone(),
                        message: "no default figure name".to_string(),
                    }
                })?;
                for format in &opts.formats {
                    let path = plotting::figure_path(stem, *format);
                    plotting::render(panels, &path, *format)?;
                    written.push(path);
                }
            }
        }
        for path in &written {
            info!("Saved figure as '{}'.", path.display());
        }
        Ok(written)
    }
}

/// The analysis code behind a plugin.
///
/// A worker is created with its parameters but only learns about its simulation when the
/// owning [`Plugin`] is registered. Everything that needs the simulation (file names under
/// the analysis directory, for instance) belongs in [`Worker::register_hook`], not in the
/// constructor.
pub trait Worker: Send + Sync {
    fn base(&self) -> &WorkerBase;
    fn base_mut(&mut self) -> &mut WorkerBase;

    /// Plugin type name, also the default plugin name (e.g. `Distances`).
    fn kind(&self) -> &'static str;

    /// User-facing description of the plugin.
    fn summary(&self) -> &'static str {
        ""
    }

    /// Description of the worker's phases and parameters.
    fn documentation(&self) -> &'static str {
        ""
    }

    /// Called once when the plugin is registered.
    ///
    /// Overriding implementations must call [`attach_base`] before anything else.
    fn register_hook(&mut self, ctx: &SimulationContext) -> Result<(), AnalysisError> {
        attach_base(self, ctx);
        Ok(())
    }

    /// Generates the data files, usually by analyzing the trajectory.
    fn run(
        &mut self,
        _ctx: &SimulationContext,
        _opts: &RunOptions,
    ) -> Result<RunOutcome, AnalysisError> {
        Err(AnalysisError::NotImplemented {
            plugin: self.base().plugin_name().to_string(),
            phase: "run",
        })
    }

    /// Loads and post-processes what `run` produced.
    fn analyze(&mut self, _ctx: &SimulationContext) -> Result<&Results, AnalysisError> {
        Err(AnalysisError::NotImplemented {
            plugin: self.base().plugin_name().to_string(),
            phase: "analyze",
        })
    }

    /// Plots the analyzed results and returns the written figure files.
    fn plot(
        &self,
        _ctx: &SimulationContext,
        _opts: &PlotOptions,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        Err(AnalysisError::NotImplemented {
            plugin: self.base().plugin_name().to_string(),
            phase: "plot",
        })
    }
}

/// Records the simulation in the worker's base; the first step of every registration hook.
pub fn attach_base<W: Worker + ?Sized>(worker: &mut W, ctx: &SimulationContext) {
    worker.base_mut().attach(ctx);
}

/// A named worker that can be registered with a [`crate::engine::simulation::Simulation`].
pub struct Plugin {
    name: String,
    worker: Box<dyn Worker>,
    registered: bool,
}

impl Plugin {
    /// Creates a plugin named after the worker's kind.
    pub fn new(worker: impl Worker + 'static) -> Self {
        Self::from_boxed(Box::new(worker))
    }

    pub fn from_boxed(mut worker: Box<dyn Worker>) -> Self {
        let name = worker.kind().to_string();
        worker.base_mut().rename(&name);
        Self {
            name,
            worker,
            registered: false,
        }
    }

    /// Renames the plugin. Several plugins of the same kind need distinct names.
    pub fn with_name(mut self, name: impl Into<String>) -> Result<Self, AnalysisError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(AnalysisError::InvalidParameter {
                plugin: self.name,
                message: "plugin name must not be empty".to_string(),
            });
        }
        if self.registered {
            return Err(AnalysisError::AlreadyRegistered(self.name));
        }
        self.worker.base_mut().rename(&name);
        self.name = name;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &'static str {
        self.worker.kind()
    }

    pub fn worker(&self) -> &dyn Worker {
        self.worker.as_ref()
    }

    pub fn worker_mut(&mut self) -> &mut dyn Worker {
        self.worker.as_mut()
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    /// Hands the simulation to the worker. A plugin can only be registered once.
    pub fn register(&mut self, ctx: &SimulationContext) -> Result<(), AnalysisError> {
        if self.registered {
            warn!("Plugin '{}' was registered before.", self.name);
            return Err(AnalysisError::AlreadyRegistered(self.name.clone()));
        }
        self.worker.register_hook(ctx)?;
        self.registered = true;
        Ok(())
    }

    /// Plugin description followed by the worker documentation.
    pub fn help(&self) -> String {
        let summary = self.worker.summary().trim();
        let details = self.worker.documentation().trim();
        if details.is_empty() || details.contains(DOC_HEADER) {
            return summary.to_string();
        }
        format!("{}\n\n{}\n\n{}", summary, DOC_HEADER, details)
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} (name {}) Worker>", self.kind(), self.name)
    }
}
