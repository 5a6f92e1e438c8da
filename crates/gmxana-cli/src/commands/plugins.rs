use crate::cli::PluginsArgs;
use crate::error::{CliError, Result};
use gmxana::plugins::catalog::{self, PluginKind};

pub fn run(args: PluginsArgs) -> Result<()> {
    let text = match args.name.as_deref() {
        Some(name) => describe(name)?,
        None => listing(),
    };
    println!("{}", text);
    Ok(())
}

/// The paragraph after the `*Name* plugin.` title line, joined into one line.
fn description_paragraph(text: &str) -> String {
    text.trim()
        .split("\n\n")
        .nth(1)
        .unwrap_or_default()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One line per plugin type: name and short description.
fn listing() -> String {
    let mut out = String::from("Available plugins:\n");
    for kind in catalog::kinds() {
        out.push_str(&format!(
            "  {:<12} {}\n",
            kind.name(),
            description_paragraph(kind.summary())
        ));
    }
    out.push_str("\nUse 'gmxana plugins <TYPE>' for the full documentation.");
    out
}

fn describe(name: &str) -> Result<String> {
    let kind: PluginKind = catalog::lookup(name).ok_or_else(|| {
        CliError::Argument(format!(
            "Unknown plugin type '{}'; available plugins: {}",
            name,
            catalog::names().join(", ")
        ))
    })?;
    Ok(format!(
        "{}\n\nPLUGIN DOCUMENTATION\n\n{}",
        kind.summary().trim(),
        kind.documentation().trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_names_every_plugin_with_its_description() {
        let text = listing();
        assert!(text.starts_with("Available plugins:"));
        assert!(text.contains("Distances"));
        assert!(text.contains("number of contacts"));
    }

    #[test]
    fn describe_is_case_insensitive_and_includes_documentation() {
        let text = describe("distances").unwrap();
        assert!(text.starts_with("*Distances* plugin."));
        assert_eq!(text.matches("PLUGIN DOCUMENTATION").count(), 1);
        assert!(text.contains("cutoff"));
    }

    #[test]
    fn description_paragraph_skips_the_title_line() {
        let text = "*Example* plugin.\n\nCounts things\nper frame.\n\nMore detail.";
        assert_eq!(description_paragraph(text), "Counts things per frame.");
        assert_eq!(description_paragraph("*Bare* plugin."), "");
    }

    #[test]
    fn describe_rejects_unknown_plugins() {
        assert!(matches!(describe("Template"), Err(CliError::Argument(_))));
    }
}
