use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "gmxana - run plugin-based analyses of Gromacs molecular-dynamics simulations.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run, analyze and plot the plugins configured in a project file.
    Analyze(AnalyzeArgs),
    /// List the available plugin types or show the documentation of one.
    Plugins(PluginsArgs),
    /// Write a commented starter project file.
    Init(InitArgs),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Run,
    Analyze,
    Plot,
}

/// Arguments for the `analyze` subcommand.
#[derive(Args, Debug, Default)]
pub struct AnalyzeArgs {
    // --- Project ---
    /// Path to the project file in TOML format. Defaults to ./gmxana.toml if it exists.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Simulation Overrides ---
    /// Override the run input file (tpr).
    #[arg(long, value_name = "PATH")]
    pub tpr: Option<PathBuf>,

    /// Override the trajectory file (xtc or trr).
    #[arg(long, value_name = "PATH")]
    pub xtc: Option<PathBuf>,

    /// Override the index file (ndx).
    #[arg(long, value_name = "PATH")]
    pub ndx: Option<PathBuf>,

    /// Override the energy file (edr).
    #[arg(long, value_name = "PATH")]
    pub edr: Option<PathBuf>,

    /// Override the directory that receives all analysis output.
    #[arg(short = 'A', long, value_name = "DIR")]
    pub analysis_dir: Option<PathBuf>,

    /// Only warn about missing tpr/xtc files instead of failing.
    #[arg(long)]
    pub no_strict: bool,

    // --- Gromacs ---
    /// Gromacs driver binary (e.g. gmx, gmx_mpi, gmx_d).
    #[arg(long, env = "GMXANA_GMX", value_name = "BINARY")]
    pub gmx: Option<String>,

    /// Use Gromacs 4 tool names (g_mindist) instead of a driver binary.
    #[arg(long)]
    pub legacy_tools: bool,

    /// Pass an option to the Gromacs tools. Can be used multiple times.
    /// Example: -T b=1000 -T pbc=false
    #[arg(short = 'T', long = "tool-arg", value_name = "KEY[=VALUE]")]
    pub tool_args: Vec<String>,

    // --- Selection ---
    /// Only process these plugins (by name). Defaults to all configured plugins.
    #[arg(short, long = "plugin", value_name = "NAME")]
    pub plugins: Vec<String>,

    /// Phases to perform. Defaults to all of them.
    #[arg(short, long = "stage", value_enum, value_name = "STAGE")]
    pub stages: Vec<Stage>,

    /// Regenerate data even if output files already exist.
    #[arg(short, long)]
    pub force: bool,

    // --- Output ---
    /// Plot only these results (e.g. distance).
    #[arg(long = "result", value_name = "NAME")]
    pub results: Vec<String>,

    /// Image formats for figures saved under their default name.
    #[arg(long = "format", value_name = "FORMAT", value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Save the figure to this file instead; requires a single plugin.
    #[arg(short = 'o', long, value_name = "PATH")]
    pub figure: Option<PathBuf>,

    /// Also export analyzed results as CSV next to their XVG files.
    #[arg(long)]
    pub csv: bool,

    /// Set a specific configuration value, overriding the project file.
    /// Can be used multiple times. Example: -S simulation.strict=false
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `plugins` subcommand.
#[derive(Args, Debug)]
pub struct PluginsArgs {
    /// Show the full documentation of this plugin type.
    #[arg(value_name = "TYPE")]
    pub name: Option<String>,
}

/// Arguments for the `init` subcommand.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Where to write the project file.
    #[arg(default_value = "gmxana.toml", value_name = "PATH")]
    pub path: PathBuf,

    /// Overwrite an existing file.
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_accepts_repeated_and_delimited_options() {
        let cli = Cli::try_parse_from([
            "gmxana",
            "-vv",
            "analyze",
            "-c",
            "project.toml",
            "-p",
            "Dsite",
            "-s",
            "run",
            "-s",
            "analyze",
            "--format",
            "svg,png",
            "-T",
            "b=100",
            "-S",
            "simulation.strict=false",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.config, Some(PathBuf::from("project.toml")));
        assert_eq!(args.plugins, vec!["Dsite"]);
        assert_eq!(args.stages, vec![Stage::Run, Stage::Analyze]);
        assert_eq!(args.formats, vec!["svg", "png"]);
        assert_eq!(args.tool_args, vec!["b=100"]);
        assert_eq!(args.set_values, vec!["simulation.strict=false"]);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["gmxana", "-q", "-v", "plugins"]).is_err());
    }

    #[test]
    fn init_defaults_to_project_file_name() {
        let cli = Cli::try_parse_from(["gmxana", "init"]).unwrap();
        let Commands::Init(args) = cli.command else {
            panic!("expected init");
        };
        assert_eq!(args.path, PathBuf::from("gmxana.toml"));
        assert!(!args.force);
    }
}
