use crate::cli::{AnalyzeArgs, Stage};
use crate::config::{self, AppConfig};
use crate::error::{CliError, Result};
use crate::utils::parser;
use crate::utils::progress::CliProgressHandler;
use gmxana::core::tools::SystemRunner;
use gmxana::engine::plugin::{Figure, PlotOptions, RunOptions, RunOutcome};
use gmxana::engine::progress::ProgressReporter;
use gmxana::engine::simulation::Simulation;
use gmxana::workflows::pipeline::{self, PipelineOptions, PipelineReport, Stages};
use std::sync::Arc;
use tracing::info;

pub async fn run(args: AnalyzeArgs) -> Result<()> {
    info!("Merging configuration from project file and CLI arguments...");
    let app = config::build_config(&args)?;
    let stages = stages(&args.stages);
    let opts = pipeline_options(&args, &app)?;
    let selection = args.plugins.clone();

    let mut simulation = setup_simulation(app)?;
    let selected = if selection.is_empty() {
        simulation.plugin_names().len()
    } else {
        selection.len()
    };
    if matches!(opts.plot.figure, Figure::File(_)) && stages.plot && selected != 1 {
        return Err(CliError::Argument(format!(
            "--figure needs exactly one plugin, but {} are selected",
            selected
        )));
    }

    println!("Analyzing {}", simulation);
    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the pipeline workflow...");
    let reports = tokio::task::spawn_blocking(move || {
        pipeline::run(&mut simulation, &selection, stages, &opts, &reporter)
    })
    .await
    .map_err(|e| CliError::Other(anyhow::anyhow!("Analysis task failed: {}", e)))??;

    for report in &reports {
        println!("{}", summarize(report));
    }
    Ok(())
}

fn setup_simulation(app: AppConfig) -> Result<Simulation> {
    let runner = Arc::new(SystemRunner::new(app.naming));
    let mut simulation = Simulation::with_runner(app.simulation, runner)?;
    for spec in &app.plugins {
        simulation.add_plugin_by_name(&spec.kind, spec.name.as_deref(), &spec.params)?;
    }
    if simulation.plugin_names().is_empty() {
        return Err(CliError::Config(
            "No plugins configured. Add a [[plugins]] section to the project file.".to_string(),
        ));
    }
    Ok(simulation)
}

fn stages(selected: &[Stage]) -> Stages {
    if selected.is_empty() {
        return Stages::all();
    }
    Stages {
        run: selected.contains(&Stage::Run),
        analyze: selected.contains(&Stage::Analyze),
        plot: selected.contains(&Stage::Plot),
    }
}

fn pipeline_options(args: &AnalyzeArgs, app: &AppConfig) -> Result<PipelineOptions> {
    let extra_args = args
        .tool_args
        .iter()
        .map(|arg| parser::parse_tool_arg(arg).map_err(|e| CliError::Argument(e.to_string())))
        .collect::<Result<Vec<_>>>()?;

    Ok(PipelineOptions {
        run: RunOptions {
            force: args.force,
            extra_args,
        },
        plot: PlotOptions {
            names: (!args.results.is_empty()).then(|| args.results.clone()),
            figure: args
                .figure
                .clone()
                .map_or(Figure::Default, Figure::File),
            formats: app.formats.clone(),
        },
        export_csv: args.csv,
    })
}

fn summarize(report: &PipelineReport) -> String {
    let run = match &report.run {
        Some(RunOutcome::Completed) => "generated".to_string(),
        Some(RunOutcome::Skipped { reason }) => format!("skipped ({})", reason),
        None => "not run".to_string(),
    };
    let mut line = format!("✓ {}: data {}", report.plugin, run);
    if !report.results.is_empty() {
        line.push_str(&format!(", results [{}]", report.results.join(", ")));
    }
    if !report.exported.is_empty() {
        line.push_str(&format!(", {} CSV file(s)", report.exported.len()));
    }
    for figure in &report.figures {
        line.push_str(&format!("\n    figure: {}", figure.display()));
    }
    line
}
