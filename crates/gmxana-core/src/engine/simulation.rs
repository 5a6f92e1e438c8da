use super::config::SimulationConfig;
use super::context::SimulationContext;
use super::error::AnalysisError;
use super::plugin::{Figure, Plugin, PlotOptions, Results, RunOptions, RunOutcome};
use crate::core::tools::{SystemRunner, ToolRunner};
use crate::core::utils::files::{self, Resolve};
use crate::plugins::catalog;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// One simulation and the analysis plugins registered with it.
///
/// Typical use:
///
/// 1. Register plugins with [`Simulation::add_plugin`] and pick the *active plugin* with
///    [`Simulation::set_plugin`].
/// 2. Generate data with [`Simulation::run`].
/// 3. Load the data with [`Simulation::analyze`].
/// 4. Plot the results with [`Simulation::plot`].
///
/// The `*_all` variants apply a phase to every registered plugin.
pub struct Simulation {
    context: SimulationContext,
    plugins: BTreeMap<String, Plugin>,
    default_plugin: Option<String>,
}

impl Simulation {
    /// Sets up a simulation that runs Gromacs tools through the default `gmx` driver.
    pub fn new(config: SimulationConfig) -> Result<Self, AnalysisError> {
        Self::with_runner(config, Arc::new(SystemRunner::default()))
    }

    /// Sets up a simulation with a custom tool runner.
    ///
    /// The `tpr` and `xtc` files must exist; with `strict = false` missing files only log a
    /// warning.
    pub fn with_runner(
        config: SimulationConfig,
        runner: Arc<dyn ToolRunner>,
    ) -> Result<Self, AnalysisError> {
        info!("Loading simulation data");
        let resolve = if config.strict {
            Resolve::Exception
        } else {
            Resolve::Warn
        };
        files::check_file("tpr", config.tpr.as_deref(), resolve)?;
        files::check_file("xtc", config.xtc.as_deref(), resolve)?;

        let simulation = Self {
            context: SimulationContext::new(&config, runner),
            plugins: BTreeMap::new(),
            default_plugin: None,
        };
        info!("Simulation instance initialised: {}", simulation);
        Ok(simulation)
    }

    pub fn context(&self) -> &SimulationContext {
        &self.context
    }

    /// Registers `plugin` and stores it under its name.
    ///
    /// A plugin with the same name is replaced.
    pub fn add_plugin(&mut self, mut plugin: Plugin) -> Result<(), AnalysisError> {
        plugin.register(&self.context)?;
        let name = plugin.name().to_string();
        info!("Registered plugin '{}' ({})", name, plugin.kind());
        if self.plugins.insert(name.clone(), plugin).is_some() {
            warn!("Plugin '{}' replaced an earlier plugin of the same name.", name);
        }
        Ok(())
    }

    /// Registers several plugins. If this leaves exactly one plugin and no default, that
    /// plugin becomes the default.
    pub fn add_plugins(
        &mut self,
        plugins: impl IntoIterator<Item = Plugin>,
    ) -> Result<(), AnalysisError> {
        for plugin in plugins {
            self.add_plugin(plugin)?;
        }
        if self.default_plugin.is_none() && self.plugins.len() == 1 {
            self.default_plugin = self.plugins.keys().next().cloned();
        }
        Ok(())
    }

    /// Creates a plugin of type `kind` from `params` and registers it.
    pub fn add_plugin_by_name(
        &mut self,
        kind: &str,
        name: Option<&str>,
        params: &toml::Table,
    ) -> Result<(), AnalysisError> {
        let plugin = catalog::build(kind, name, params)?;
        self.add_plugin(plugin)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn has_plugin(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// `None` is always valid; a name must belong to a registered plugin.
    pub fn check_plugin_name(&self, name: Option<&str>) -> Result<(), AnalysisError> {
        match name {
            Some(n) if !self.has_plugin(n) => Err(AnalysisError::UnknownPlugin {
                name: n.to_string(),
                available: self.plugins.keys().cloned().collect(),
            }),
            _ => Ok(()),
        }
    }

    /// Sets the plugin used when no name is given; `None` clears it.
    pub fn set_plugin(&mut self, name: Option<&str>) -> Result<Option<&str>, AnalysisError> {
        self.check_plugin_name(name)?;
        self.default_plugin = name.map(str::to_string);
        Ok(self.default_plugin.as_deref())
    }

    pub fn default_plugin_name(&self) -> Option<&str> {
        self.default_plugin.as_deref()
    }

    fn resolve_name(&self, name: Option<&str>) -> Result<String, AnalysisError> {
        self.check_plugin_name(name)?;
        match name {
            Some(n) => Ok(n.to_string()),
            None => self
                .default_plugin
                .clone()
                .ok_or(AnalysisError::NoDefaultPlugin),
        }
    }

    /// Returns the named plugin, or the default plugin for `None`.
    pub fn get_plugin(&self, name: Option<&str>) -> Result<&Plugin, AnalysisError> {
        let name = self.resolve_name(name)?;
        self.plugins
            .get(&name)
            .ok_or_else(|| AnalysisError::UnknownPlugin {
                name,
                available: self.plugins.keys().cloned().collect(),
            })
    }

    pub fn get_plugin_mut(&mut self, name: Option<&str>) -> Result<&mut Plugin, AnalysisError> {
        self.context_and_plugin(name).map(|(_, plugin)| plugin)
    }

    fn context_and_plugin(
        &mut self,
        name: Option<&str>,
    ) -> Result<(&SimulationContext, &mut Plugin), AnalysisError> {
        let name = self.resolve_name(name)?;
        let available: Vec<String> = self.plugins.keys().cloned().collect();
        let plugin = self
            .plugins
            .get_mut(&name)
            .ok_or(AnalysisError::UnknownPlugin { name, available })?;
        Ok((&self.context, plugin))
    }

    /// The active plugin, as set with [`Simulation::set_plugin`].
    pub fn current_plugin(&self) -> Result<&Plugin, AnalysisError> {
        self.get_plugin(None)
    }

    /// Generates data files for the selected plugin.
    pub fn run(
        &mut self,
        name: Option<&str>,
        opts: &RunOptions,
    ) -> Result<RunOutcome, AnalysisError> {
        let (context, plugin) = self.context_and_plugin(name)?;
        plugin.worker_mut().run(context, opts)
    }

    /// Runs the analysis phase of the selected plugin.
    pub fn analyze(&mut self, name: Option<&str>) -> Result<&Results, AnalysisError> {
        let (context, plugin) = self.context_and_plugin(name)?;
        plugin.worker_mut().analyze(context)
    }

    /// Plots the results of the selected plugin.
    pub fn plot(
        &self,
        name: Option<&str>,
        opts: &PlotOptions,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        self.get_plugin(name)?.worker().plot(&self.context, opts)
    }

    /// Executes `run` for all registered plugins.
    #[instrument(skip_all)]
    pub fn run_all(
        &mut self,
        opts: &RunOptions,
    ) -> Result<BTreeMap<String, RunOutcome>, AnalysisError> {
        let context = &self.context;
        self.plugins
            .par_iter_mut()
            .map(|(name, plugin)| {
                plugin
                    .worker_mut()
                    .run(context, opts)
                    .map(|outcome| (name.clone(), outcome))
            })
            .collect()
    }

    /// Executes `analyze` for all registered plugins; returns the result names per plugin.
    #[instrument(skip_all)]
    pub fn analyze_all(&mut self) -> Result<BTreeMap<String, Vec<String>>, AnalysisError> {
        let context = &self.context;
        self.plugins
            .par_iter_mut()
            .map(|(name, plugin)| -> Result<(String, Vec<String>), AnalysisError> {
                let results = plugin.worker_mut().analyze(context)?;
                Ok((name.clone(), results.keys().cloned().collect()))
            })
            .collect()
    }

    /// Executes `plot` for all registered plugins.
    ///
    /// With an explicit figure file and several plugins, each plugin writes
    /// `<stem>-<plugin>.<ext>` next to that file.
    #[instrument(skip_all)]
    pub fn plot_all(
        &self,
        opts: &PlotOptions,
    ) -> Result<BTreeMap<String, Vec<PathBuf>>, AnalysisError> {
        let shared = self.plugins.len() > 1;
        self.plugins
            .par_iter()
            .map(|(name, plugin)| {
                let plugin_opts = match &opts.figure {
                    Figure::File(path) if shared => PlotOptions {
                        figure: Figure::File(per_plugin_figure(path, name)),
                        ..opts.clone()
                    },
                    _ => opts.clone(),
                };
                plugin
                    .worker()
                    .plot(&self.context, &plugin_opts)
                    .map(|paths| (name.clone(), paths))
            })
            .collect()
    }

    /// Returns a path under the analysis directory; parent directories are created.
    pub fn topdir(&self, path: impl AsRef<Path>) -> Result<PathBuf, AnalysisError> {
        Ok(self.context.topdir(path)?)
    }

    /// Directory where the plugin creates and looks for files.
    pub fn plugindir(
        &self,
        plugin: &str,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, AnalysisError> {
        self.get_plugin(Some(plugin))?.worker().base().plugindir(path)
    }

    /// Directory where the plugin saves figures.
    pub fn figdir(&self, plugin: &str, path: impl AsRef<Path>) -> Result<PathBuf, AnalysisError> {
        self.get_plugin(Some(plugin))?.worker().base().figdir(path)
    }

    pub fn check_file(
        &self,
        filetype: &str,
        path: Option<&Path>,
        resolve: Resolve,
    ) -> Result<bool, AnalysisError> {
        Ok(files::check_file(filetype, path, resolve)?)
    }
}

fn per_plugin_figure(path: &Path, plugin: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}-{}.{}", stem, plugin, ext.to_string_lossy()),
        None => format!("{}-{}", stem, plugin),
    };
    path.with_file_name(name)
}

impl fmt::Display for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.context, f)
    }
}

impl fmt::Debug for Simulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.context, f)
    }
}
