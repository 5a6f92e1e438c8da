use crate::cli::InitArgs;
use crate::error::{CliError, Result};
use std::path::Path;
use tracing::info;

const TEMPLATE: &str = r#"# gmxana project file.
# Relative paths are resolved against the directory of this file.

[simulation]
tpr = "md.tpr"
xtc = "md.xtc"
# ndx = "index.ndx"
# edr = "md.edr"
# Defaults to the directory of the tpr file.
# analysis-dir = "analysis"
# Fail when tpr or xtc are missing (set to false to only warn).
# strict = true

[gromacs]
# Driver binary; the GMXANA_GMX environment variable overrides it.
driver = "gmx"
# Gromacs 4 style tool names (g_mindist).
# legacy-tools = false

[plot]
formats = ["svg", "png"]

# One [[plugins]] section per analysis. 'type' is the plugin type
# ('gmxana plugins' lists them); 'name' defaults to the type.
[[plugins]]
type = "Distances"
name = "Dsite"
params = { groups = ["Na1", "Na1_site"], cutoff = 0.6 }
"#;

pub fn run(args: InitArgs) -> Result<()> {
    write_template(&args.path, args.force)?;
    println!("✓ Project file written to: {}", args.path.display());
    Ok(())
}

fn write_template(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        return Err(CliError::Argument(format!(
            "'{}' already exists; use --force to overwrite it",
            path.display()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, TEMPLATE)?;
    info!("Wrote project template to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::file::FileConfig;

    #[test]
    fn template_is_a_valid_project_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("project/gmxana.toml");
        write_template(&path, false).unwrap();

        let config = FileConfig::from_file(&path).unwrap();
        assert_eq!(config.plugins.len(), 1);
        assert_eq!(config.plugins[0].kind, "Distances");
        assert!(gmxana::plugins::catalog::lookup(&config.plugins[0].kind).is_some());
    }

    #[test]
    fn existing_file_is_kept_unless_forced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gmxana.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        assert!(matches!(
            write_template(&path, false),
            Err(CliError::Argument(_))
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");

        write_template(&path, true).unwrap();
        assert!(std::fs::read_to_string(&path).unwrap().contains("[[plugins]]"));
    }
}
