use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FilePluginConfig};
use super::models::{AppConfig, PluginSpec};
use crate::cli::AnalyzeArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use gmxana::core::plotting::ImageFormat;
use gmxana::core::tools::GromacsNaming;
use gmxana::engine::config::SimulationConfigBuilder;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Plugin parameters that name files; relative values are resolved against the project
/// file's directory.
const PATH_PARAMS: [&str; 1] = ["ndx"];

pub fn build_config(args: &AnalyzeArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let project_file = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let candidate = PathBuf::from(defaults.project_file);
            candidate.is_file().then_some(candidate)
        }
    };
    let (file_config, base_dir) = match &project_file {
        Some(path) => {
            info!("Using project file '{}'.", path.display());
            let base_dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("."));
            (FileConfig::from_file(path)?, base_dir)
        }
        None => {
            debug!("No project file; using command-line arguments only.");
            (FileConfig::default(), PathBuf::from("."))
        }
    };

    let (mut file_config, overrides) = apply_set_values(file_config, &args.set_values)?;

    let sim_file = file_config.simulation.take().unwrap_or_default();
    let from_file = |p: Option<PathBuf>| p.map(|p| base_dir.join(p));

    let mut builder = SimulationConfigBuilder::new()
        .strict(if args.no_strict {
            false
        } else {
            sim_file.strict.unwrap_or(defaults.strict)
        })
        .absolute(sim_file.absolute.unwrap_or(defaults.absolute));
    if let Some(tpr) = args.tpr.clone().or_else(|| from_file(sim_file.tpr)) {
        builder = builder.tpr(tpr);
    }
    if let Some(xtc) = args.xtc.clone().or_else(|| from_file(sim_file.xtc)) {
        builder = builder.xtc(xtc);
    }
    if let Some(ndx) = args.ndx.clone().or_else(|| from_file(sim_file.ndx)) {
        builder = builder.ndx(ndx);
    }
    if let Some(edr) = args.edr.clone().or_else(|| from_file(sim_file.edr)) {
        builder = builder.edr(edr);
    }
    if let Some(dir) = args
        .analysis_dir
        .clone()
        .or(overrides.analysis_dir)
        .or_else(|| from_file(sim_file.analysis_dir))
    {
        builder = builder.analysis_dir(dir);
    }
    let simulation = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let gromacs_file = file_config.gromacs.take().unwrap_or_default();
    let naming = if args.legacy_tools || gromacs_file.legacy_tools.unwrap_or(false) {
        GromacsNaming::legacy()
    } else {
        GromacsNaming::Driver {
            binary: args
                .gmx
                .clone()
                .or(gromacs_file.driver)
                .unwrap_or_else(|| defaults.driver.to_string()),
        }
    };

    let format_names = if args.formats.is_empty() {
        file_config
            .plot
            .take()
            .and_then(|p| p.formats)
            .unwrap_or_default()
    } else {
        args.formats.clone()
    };
    let formats = if format_names.is_empty() {
        ImageFormat::defaults()
    } else {
        parse_formats(&format_names)?
    };

    let plugins = file_config
        .plugins
        .into_iter()
        .map(|p| plugin_spec(p, &base_dir))
        .collect();

    Ok(AppConfig {
        simulation,
        naming,
        plugins,
        formats,
    })
}

fn parse_formats(names: &[String]) -> Result<Vec<ImageFormat>> {
    names
        .iter()
        .map(|name| {
            name.trim()
                .parse()
                .map_err(|e| CliError::Config(format!("{}", e)))
        })
        .collect()
}

fn resolve_path_value(value: &mut toml::Value, base_dir: &Path) {
    match value {
        toml::Value::String(path) => {
            *path = base_dir.join(&*path).display().to_string();
        }
        toml::Value::Array(items) => {
            for item in items {
                resolve_path_value(item, base_dir);
            }
        }
        _ => {}
    }
}

fn plugin_spec(file: FilePluginConfig, base_dir: &Path) -> PluginSpec {
    let mut params = file.params;
    for key in PATH_PARAMS {
        if let Some(value) = params.get_mut(key) {
            resolve_path_value(value, base_dir);
        }
    }
    PluginSpec {
        kind: file.kind,
        name: file.name,
        params,
    }
}

fn invalid_bool(e: parser::ParseError) -> CliError {
    CliError::Config(e.to_string())
}

/// `-S` values that name paths. They come from the command line, so they resolve against
/// the current directory rather than the project file's.
#[derive(Debug, Default)]
struct SetOverrides {
    analysis_dir: Option<PathBuf>,
}

fn apply_set_values(
    mut config: FileConfig,
    set_values: &[String],
) -> Result<(FileConfig, SetOverrides)> {
    let mut overrides = SetOverrides::default();
    for kv_pair in set_values {
        let (key, value) = parser::parse_key_value(kv_pair)
            .map_err(|e| CliError::Config(format!("Invalid --set value: {}", e)))?;

        match key {
            "simulation.strict" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .strict = Some(parser::parse_bool(key, value).map_err(invalid_bool)?);
            }
            "simulation.absolute" => {
                config
                    .simulation
                    .get_or_insert_with(Default::default)
                    .absolute = Some(parser::parse_bool(key, value).map_err(invalid_bool)?);
            }
            "simulation.analysis-dir" => {
                overrides.analysis_dir = Some(PathBuf::from(value));
            }
            "gromacs.driver" => {
                config.gromacs.get_or_insert_with(Default::default).driver =
                    Some(value.to_string());
            }
            "gromacs.legacy-tools" => {
                config
                    .gromacs
                    .get_or_insert_with(Default::default)
                    .legacy_tools = Some(parser::parse_bool(key, value).map_err(invalid_bool)?);
            }
            "plot.formats" => {
                config.plot.get_or_insert_with(Default::default).formats = Some(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(str::to_string)
                        .collect(),
                );
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok((config, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn project(content: &str) -> (TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("md.tpr"), b"").unwrap();
        fs::write(dir.path().join("md.xtc"), b"").unwrap();
        let path = dir.path().join("gmxana.toml");
        fs::write(&path, content).unwrap();
        (dir, path)
    }

    fn args_for(path: &Path) -> AnalyzeArgs {
        AnalyzeArgs {
            config: Some(path.to_path_buf()),
            ..Default::default()
        }
    }

    const PROJECT: &str = r#"
        [simulation]
        tpr = "md.tpr"
        xtc = "md.xtc"
        analysis-dir = "analysis"

        [[plugins]]
        type = "Distances"
        name = "Dsite"
        params = { groups = ["Na1", "Na1_site"], ndx = ["Na1.ndx", "site.ndx"] }
        "#;

    #[test]
    fn relative_paths_resolve_against_project_directory() {
        let (dir, path) = project(PROJECT);
        let app = build_config(&args_for(&path)).unwrap();
        let root = dir.path().canonicalize().unwrap();

        assert_eq!(app.simulation.tpr, Some(root.join("md.tpr")));
        assert_eq!(app.simulation.xtc, Some(root.join("md.xtc")));
        assert!(app.simulation.analysis_dir.ends_with("analysis"));

        let ndx = app.plugins[0].params["ndx"].as_array().unwrap();
        let first = PathBuf::from(ndx[0].as_str().unwrap());
        assert_eq!(first, dir.path().join("Na1.ndx"));
    }

    #[test]
    fn defaults_fill_gromacs_and_plot_settings() {
        let (_dir, path) = project(PROJECT);
        let app = build_config(&args_for(&path)).unwrap();

        assert_eq!(
            app.naming,
            GromacsNaming::Driver {
                binary: "gmx".into()
            }
        );
        assert_eq!(app.formats, ImageFormat::defaults());
        assert!(app.simulation.strict);
        assert_eq!(app.plugins.len(), 1);
        assert_eq!(app.plugins[0].kind, "Distances");
        assert_eq!(app.plugins[0].name.as_deref(), Some("Dsite"));
    }

    #[test]
    fn cli_overrides_file_values() {
        let (dir, path) = project(
            r#"
            [simulation]
            tpr = "missing.tpr"
            xtc = "md.xtc"

            [gromacs]
            driver = "gmx_mpi"

            [plot]
            formats = ["svg"]
            "#,
        );
        let mut args = args_for(&path);
        args.tpr = Some(dir.path().join("md.tpr"));
        args.gmx = Some("gmx_d".into());
        args.formats = vec!["png".into()];

        let app = build_config(&args).unwrap();
        let root = dir.path().canonicalize().unwrap();
        assert_eq!(app.simulation.tpr, Some(root.join("md.tpr")));
        assert_eq!(
            app.naming,
            GromacsNaming::Driver {
                binary: "gmx_d".into()
            }
        );
        assert_eq!(app.formats, vec![ImageFormat::Png]);
    }

    #[test]
    fn set_values_override_file() {
        let (_dir, path) = project(PROJECT);
        let mut args = args_for(&path);
        args.set_values = vec![
            "simulation.strict=false".into(),
            "gromacs.legacy-tools=true".into(),
            "plot.formats=png, svg".into(),
        ];

        let app = build_config(&args).unwrap();
        assert!(!app.simulation.strict);
        assert_eq!(app.naming, GromacsNaming::legacy());
        assert_eq!(app.formats, vec![ImageFormat::Png, ImageFormat::Svg]);
    }

    #[test]
    fn set_analysis_dir_resolves_against_working_directory() {
        let (dir, path) = project(PROJECT);
        let mut args = args_for(&path);
        args.set_values = vec!["simulation.analysis-dir=gmxana-set-analysis-dir".into()];

        let app = build_config(&args).unwrap();
        let expected = std::env::current_dir()
            .unwrap()
            .join("gmxana-set-analysis-dir");
        assert_eq!(app.simulation.analysis_dir, expected);
        assert!(!app.simulation.analysis_dir.starts_with(dir.path()));
    }

    #[test]
    fn unsupported_set_key_is_rejected() {
        let (_dir, path) = project(PROJECT);
        let mut args = args_for(&path);
        args.set_values = vec!["optimization.num-solutions=3".into()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));

        args.set_values = vec!["simulation.strict=perhaps".into()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn unknown_format_is_rejected() {
        let (_dir, path) = project(PROJECT);
        let mut args = args_for(&path);
        args.formats = vec!["gif".into()];
        assert!(matches!(build_config(&args), Err(CliError::Config(_))));
    }

    #[test]
    fn missing_required_file_entry_fails_when_strict() {
        let (_dir, path) = project("[simulation]\ntpr = \"md.tpr\"\n");
        let err = build_config(&args_for(&path)).err().unwrap();
        assert!(err.to_string().contains("xtc"));

        let mut args = args_for(&path);
        args.no_strict = true;
        let app = build_config(&args).unwrap();
        assert!(app.simulation.xtc.is_none());
    }
}
