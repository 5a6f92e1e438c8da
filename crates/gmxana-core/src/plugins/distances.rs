//! Time series of a selected set of distances.
//!
//! The distances between the centre of mass of a primary index group and each secondary
//! group, together with the number of contacts, are computed for every frame by the Gromacs
//! `mindist` tool and written to `distance.xvg` and `contacts.xvg` in the plugin directory.

use crate::core::plotting::{Panel, Series};
use crate::core::tools::ToolInvocation;
use crate::engine::context::SimulationContext;
use crate::engine::error::AnalysisError;
use crate::engine::plugin::{
    PlotOptions, Results, RunOptions, RunOutcome, Worker, WorkerBase, attach_base,
};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const KIND: &str = "Distances";

pub const SUMMARY: &str = "\
*Distances* plugin.

The distances between the centers of at least two index groups and the number of
contacts are calculated for each time step and written to files.";

pub const DOCUMENTATION: &str = "\
Parameters:
  groups   list of index group names; the first entry is the primary group, all
           others are secondary groups. Distances are measured between the centre
           of mass of the primary group and the centre of mass of each secondary group.
  ndx      index file or list of index files that contain the groups
           (defaults to the simulation's index file)
  cutoff   a contact is recorded if the distance is < cutoff [0.6 nm]

Results:
  distance  distance d/nm against time
  contacts  number of contacts N against time

The run phase does nothing if distance.xvg already exists, unless forced.";

const TOOL: &str = "mindist";
const DEFAULT_CUTOFF_NM: f64 = 0.6;
const PS_PER_NS: f64 = 1000.0;
const COMBINED_INDEX: &str = "groups.ndx";
const DISTANCE: &str = "distance";
const CONTACTS: &str = "contacts";
/// Options the plugin sets itself.
const RESERVED_ARGS: [&str; 7] = ["s", "f", "n", "d", "od", "on", "ng"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum IndexFiles {
    One(PathBuf),
    Many(Vec<PathBuf>),
}

impl IndexFiles {
    pub fn into_vec(self) -> Vec<PathBuf> {
        match self {
            Self::One(path) => vec![path],
            Self::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DistancesParams {
    pub groups: Vec<String>,
    #[serde(default)]
    pub ndx: Option<IndexFiles>,
    #[serde(default)]
    pub cutoff: Option<f64>,
}

#[derive(Debug)]
pub struct Distances {
    base: WorkerBase,
    groups: Vec<String>,
    ndx: Vec<PathBuf>,
    cutoff: f64,
}

fn invalid(message: impl Into<String>) -> AnalysisError {
    AnalysisError::InvalidParameter {
        plugin: KIND.to_string(),
        message: message.into(),
    }
}

fn axis_labels(name: &str) -> (String, String) {
    let y = match name {
        DISTANCE => "distance d/nm".to_string(),
        CONTACTS => "contacts N".to_string(),
        other => other.to_string(),
    };
    ("time t/ns".to_string(), y)
}

impl Distances {
    pub fn new(
        groups: Vec<String>,
        ndx: Vec<PathBuf>,
        cutoff: Option<f64>,
    ) -> Result<Self, AnalysisError> {
        if groups.len() < 2 {
            return Err(invalid(
                "groups must be a list with at least a primary and secondary group",
            ));
        }
        let cutoff = cutoff.unwrap_or(DEFAULT_CUTOFF_NM);
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(invalid(format!("cutoff must be positive, got {}", cutoff)));
        }
        Ok(Self {
            base: WorkerBase::new(KIND),
            groups,
            ndx,
            cutoff,
        })
    }

    pub fn from_params(params: DistancesParams) -> Result<Self, AnalysisError> {
        Self::new(
            params.groups,
            params.ndx.map(IndexFiles::into_vec).unwrap_or_default(),
            params.cutoff,
        )
    }

    pub fn from_table(table: &toml::Table) -> Result<Self, AnalysisError> {
        let params: DistancesParams = toml::Value::Table(table.clone())
            .try_into()
            .map_err(|e: toml::de::Error| invalid(e.message().to_string()))?;
        Self::from_params(params)
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn primary_group(&self) -> &str {
        &self.groups[0]
    }

    pub fn secondary_groups(&self) -> &[String] {
        &self.groups[1..]
    }

    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    fn output_file(&self, name: &str) -> Result<&Path, AnalysisError> {
        self.base
            .parameters
            .filenames
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| AnalysisError::NotRegistered(self.base.plugin_name().to_string()))
    }

    /// The index file handed to `mindist`. Several files are concatenated into one.
    fn index_file(&self, ctx: &SimulationContext) -> Result<Option<PathBuf>, AnalysisError> {
        match self.ndx.as_slice() {
            [] => Ok(ctx.ndx().map(Path::to_path_buf)),
            [single] => Ok(Some(single.clone())),
            many => {
                let combined = self.base.plugindir(COMBINED_INDEX)?;
                let mut content = String::new();
                for path in many {
                    let text = fs::read_to_string(path)?;
                    content.push_str(&text);
                    if !text.ends_with('\n') {
                        content.push('\n');
                    }
                }
                fs::write(&combined, content)?;
                debug!(
                    "Combined {} index files into '{}'.",
                    many.len(),
                    combined.display()
                );
                Ok(Some(combined))
            }
        }
    }

    fn invocation(
        &self,
        ctx: &SimulationContext,
        opts: &RunOptions,
    ) -> Result<ToolInvocation, AnalysisError> {
        let index = self.index_file(ctx)?;
        let mut invocation = ToolInvocation::new(TOOL)
            .arg("s", ctx.tpr()?)
            .arg("f", ctx.xtc()?)
            .opt_arg("n", index.as_deref())
            .arg("d", self.cutoff)
            .arg("od", self.output_file(DISTANCE)?)
            .arg("on", self.output_file(CONTACTS)?)
            .arg("ng", self.secondary_groups().len())
            .stdin_lines(&self.groups);

        for (name, value) in &opts.extra_args {
            let name = name.trim_start_matches('-');
            if RESERVED_ARGS.contains(&name) {
                return Err(AnalysisError::ReservedArgument {
                    plugin: self.base.plugin_name().to_string(),
                    arg: name.to_string(),
                });
            }
            invocation.set(name, value.clone());
        }
        Ok(invocation)
    }

    fn panels(&self, names: Option<&[String]>) -> Result<Vec<Panel>, AnalysisError> {
        let results = &self.base.results;
        let names: Vec<&str> = match names {
            Some(names) => names.iter().map(String::as_str).collect(),
            None => results.keys().map(String::as_str).collect(),
        };
        if names.is_empty() {
            return Err(invalid("no results to plot; run the analyze phase first"));
        }

        names
            .into_iter()
            .map(|name| {
                let mut data = results
                    .get(name)
                    .cloned()
                    .ok_or_else(|| AnalysisError::UnknownResult {
                        name: name.to_string(),
                        available: results.keys().cloned().collect(),
                    })?;
                data.transform_column(0, |t| t / PS_PER_NS);
                let (x_label, y_label) = axis_labels(name);
                let series = (0..data.num_series())
                    .filter_map(|i| {
                        data.series(i).map(|points| Series {
                            label: data.series_label(i),
                            points,
                        })
                    })
                    .collect();
                Ok(Panel {
                    title: Some(name.to_string()),
                    x_label,
                    y_label,
                    series,
                })
            })
            .collect()
    }
}

impl Worker for Distances {
    fn base(&self) -> &WorkerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut WorkerBase {
        &mut self.base
    }

    fn kind(&self) -> &'static str {
        KIND
    }

    fn summary(&self) -> &'static str {
        SUMMARY
    }

    fn documentation(&self) -> &'static str {
        DOCUMENTATION
    }

    fn register_hook(&mut self, ctx: &SimulationContext) -> Result<(), AnalysisError> {
        attach_base(self, ctx);

        let distance = self.base.plugindir("distance.xvg")?;
        let contacts = self.base.plugindir("contacts.xvg")?;
        let figname = self.base.plugindir("distances")?;

        let parameters = &mut self.base.parameters;
        parameters.filenames.insert(DISTANCE.to_string(), distance);
        parameters.filenames.insert(CONTACTS.to_string(), contacts);
        parameters.figname = Some(figname);
        Ok(())
    }

    fn run(
        &mut self,
        ctx: &SimulationContext,
        opts: &RunOptions,
    ) -> Result<RunOutcome, AnalysisError> {
        let distance = self.output_file(DISTANCE)?;
        if distance.is_file() && !opts.force {
            warn!(
                "Output file '{}' already exists; skipping '{}' (use force to regenerate).",
                distance.display(),
                self.base.plugin_name()
            );
            return Ok(RunOutcome::Skipped {
                reason: format!("'{}' exists", distance.display()),
            });
        }

        let invocation = self.invocation(ctx, opts)?;
        info!(
            "Computing distances from '{}' to {} secondary group(s) with cutoff {} nm.",
            self.primary_group(),
            self.secondary_groups().len(),
            self.cutoff
        );
        ctx.run_tool(&invocation)?;
        Ok(RunOutcome::Completed)
    }

    fn analyze(&mut self, _ctx: &SimulationContext) -> Result<&Results, AnalysisError> {
        self.base.load_results()
    }

    fn plot(
        &self,
        _ctx: &SimulationContext,
        opts: &PlotOptions,
    ) -> Result<Vec<PathBuf>, AnalysisError> {
        let panels = self.panels(opts.names.as_deref())?;
        self.base.savefig(&panels, opts)
    }
}
