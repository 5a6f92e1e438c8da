use crate::core::io::export;
use crate::engine::error::AnalysisError;
use crate::engine::plugin::{PlotOptions, RunOptions, RunOutcome};
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::simulation::Simulation;
use std::path::PathBuf;
use tracing::{info, instrument, warn};

/// Which phases to perform. Selected phases always execute in the order run, analyze, plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stages {
    pub run: bool,
    pub analyze: bool,
    pub plot: bool,
}

impl Stages {
    pub fn all() -> Self {
        Self {
            run: true,
            analyze: true,
            plot: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.run || self.analyze || self.plot)
    }
}

impl Default for Stages {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub run: RunOptions,
    pub plot: PlotOptions,
    /// Also write every analyzed result as CSV next to its XVG file.
    pub export_csv: bool,
}

/// What happened to one plugin.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    pub plugin: String,
    pub run: Option<RunOutcome>,
    pub results: Vec<String>,
    pub figures: Vec<PathBuf>,
    pub exported: Vec<PathBuf>,
}

/// Performs the selected `stages` for the plugins named in `selection`, or for every
/// registered plugin when `selection` is empty.
///
/// Reports are returned in selection order. The first failing plugin aborts the pipeline.
#[instrument(skip_all, name = "pipeline_workflow")]
pub fn run(
    simulation: &mut Simulation,
    selection: &[String],
    stages: Stages,
    opts: &PipelineOptions,
    reporter: &ProgressReporter,
) -> Result<Vec<PipelineReport>, AnalysisError> {
    let names = resolve_selection(simulation, selection)?;
    if names.is_empty() {
        warn!("No plugins registered; nothing to do.");
        reporter.report(Progress::Message("No plugins registered.".to_string()));
        return Ok(Vec::new());
    }
    info!(
        "Starting pipeline for {} plugin(s): {}",
        names.len(),
        names.join(", ")
    );

    let mut reports: Vec<PipelineReport> = names
        .iter()
        .map(|name| PipelineReport {
            plugin: name.clone(),
            ..Default::default()
        })
        .collect();

    if stages.run {
        run_phase(simulation, &mut reports, &opts.run, reporter)?;
    }
    if stages.analyze {
        analyze_phase(simulation, &mut reports, opts.export_csv, reporter)?;
    }
    if stages.plot {
        plot_phase(simulation, &mut reports, &opts.plot, reporter)?;
    }

    info!("Pipeline complete.");
    Ok(reports)
}

fn resolve_selection(
    simulation: &Simulation,
    selection: &[String],
) -> Result<Vec<String>, AnalysisError> {
    if selection.is_empty() {
        return Ok(simulation
            .plugin_names()
            .into_iter()
            .map(str::to_string)
            .collect());
    }
    for name in selection {
        simulation.check_plugin_name(Some(name.as_str()))?;
    }
    Ok(selection.to_vec())
}

fn run_phase(
    simulation: &mut Simulation,
    reports: &mut [PipelineReport],
    opts: &RunOptions,
    reporter: &ProgressReporter,
) -> Result<(), AnalysisError> {
    reporter.report(Progress::PhaseStart {
        name: "Generating data",
    });
    reporter.report(Progress::TaskStart {
        total_steps: reports.len() as u64,
    });
    for report in reports.iter_mut() {
        reporter.report(Progress::PluginStart {
            plugin: report.plugin.clone(),
        });
        let outcome = simulation.run(Some(report.plugin.as_str()), opts)?;
        if let RunOutcome::Skipped { reason } = &outcome {
            reporter.report(Progress::Message(format!(
                "{}: skipped ({})",
                report.plugin, reason
            )));
        }
        report.run = Some(outcome);
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(())
}

fn analyze_phase(
    simulation: &mut Simulation,
    reports: &mut [PipelineReport],
    export_csv: bool,
    reporter: &ProgressReporter,
) -> Result<(), AnalysisError> {
    reporter.report(Progress::PhaseStart {
        name: "Analyzing results",
    });
    reporter.report(Progress::TaskStart {
        total_steps: reports.len() as u64,
    });
    for report in reports.iter_mut() {
        reporter.report(Progress::PluginStart {
            plugin: report.plugin.clone(),
        });
        let results = simulation.analyze(Some(report.plugin.as_str()))?;
        report.results = results.keys().cloned().collect();
        if export_csv {
            report.exported = export_results(simulation, &report.plugin)?;
        }
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(())
}

fn export_results(simulation: &Simulation, plugin: &str) -> Result<Vec<PathBuf>, AnalysisError> {
    let base = simulation.get_plugin(Some(plugin))?.worker().base();
    let mut written = Vec::with_capacity(base.results.len());
    for (name, data) in &base.results {
        let path = match base.parameters.filenames.get(name) {
            Some(xvg) => xvg.with_extension("csv"),
            None => base.plugindir(format!("{}.csv", name))?,
        };
        export::write_csv_to_path(data, &path)?;
        info!("Exported result '{}' to '{}'.", name, path.display());
        written.push(path);
    }
    Ok(written)
}

fn plot_phase(
    simulation: &Simulation,
    reports: &mut [PipelineReport],
    opts: &PlotOptions,
    reporter: &ProgressReporter,
) -> Result<(), AnalysisError> {
    reporter.report(Progress::PhaseStart {
        name: "Plotting figures",
    });
    reporter.report(Progress::TaskStart {
        total_steps: reports.len() as u64,
    });
    for report in reports.iter_mut() {
        reporter.report(Progress::PluginStart {
            plugin: report.plugin.clone(),
        });
        report.figures = simulation.plot(Some(report.plugin.as_str()), opts)?;
        reporter.report(Progress::TaskIncrement);
    }
    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);
    Ok(())
}
