use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileSimulationConfig {
    pub tpr: Option<PathBuf>,
    pub xtc: Option<PathBuf>,
    pub ndx: Option<PathBuf>,
    pub edr: Option<PathBuf>,
    pub analysis_dir: Option<PathBuf>,
    pub strict: Option<bool>,
    pub absolute: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileGromacsConfig {
    pub driver: Option<String>,
    pub legacy_tools: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePlotConfig {
    pub formats: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FilePluginConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub name: Option<String>,
    #[serde(default)]
    pub params: toml::Table,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub simulation: Option<FileSimulationConfig>,
    pub gromacs: Option<FileGromacsConfig>,
    pub plot: Option<FilePlotConfig>,
    #[serde(default)]
    pub plugins: Vec<FilePluginConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading project file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_str_at(&content, path)
    }

    fn from_str_at(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_all_sections() {
        let toml = r#"
            [simulation]
            tpr = "md.tpr"
            xtc = "md.xtc"
            analysis-dir = "analysis"
            strict = false

            [gromacs]
            driver = "gmx_d"

            [plot]
            formats = ["png"]

            [[plugins]]
            type = "Distances"
            name = "Dsite"
            params = { groups = ["Na1", "Na1_site"], cutoff = 0.5 }
            "#;
        let config = FileConfig::from_str_at(toml, Path::new("gmxana.toml")).unwrap();

        let simulation = config.simulation.unwrap();
        assert_eq!(simulation.tpr, Some(PathBuf::from("md.tpr")));
        assert_eq!(simulation.analysis_dir, Some(PathBuf::from("analysis")));
        assert_eq!(simulation.strict, Some(false));
        assert_eq!(config.gromacs.unwrap().driver.as_deref(), Some("gmx_d"));
        assert_eq!(config.plot.unwrap().formats, Some(vec!["png".to_string()]));

        assert_eq!(config.plugins.len(), 1);
        let plugin = &config.plugins[0];
        assert_eq!(plugin.kind, "Distances");
        assert_eq!(plugin.name.as_deref(), Some("Dsite"));
        assert_eq!(plugin.params["cutoff"].as_float(), Some(0.5));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = FileConfig::from_str_at(
            "[simulation]\ntrajectory = \"md.xtc\"\n",
            Path::new("bad.toml"),
        )
        .unwrap_err();
        assert!(matches!(err, CliError::FileParsing { path, .. } if path.ends_with("bad.toml")));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }
}
