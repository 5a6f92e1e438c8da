use super::distances::{self, Distances};
use crate::engine::error::AnalysisError;
use crate::engine::plugin::{Plugin, Worker};
use phf::{Map, phf_map};

/// The plugin types known to gmxana.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Distances,
}

/// Plugin type names in lower case.
static CATALOG: Map<&'static str, PluginKind> = phf_map! {
    "distances" => PluginKind::Distances,
};

impl PluginKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Distances => distances::KIND,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            Self::Distances => distances::SUMMARY,
        }
    }

    pub fn documentation(&self) -> &'static str {
        match self {
            Self::Distances => distances::DOCUMENTATION,
        }
    }

    /// Creates a worker of this kind from its configuration parameters.
    pub fn create(&self, params: &toml::Table) -> Result<Box<dyn Worker>, AnalysisError> {
        match self {
            Self::Distances => Ok(Box::new(Distances::from_table(params)?)),
        }
    }
}

/// Looks up a plugin type; the name is matched case-insensitively.
pub fn lookup(kind: &str) -> Option<PluginKind> {
    CATALOG.get(kind.to_ascii_lowercase().as_str()).copied()
}

/// All plugin types, sorted by name.
pub fn kinds() -> Vec<PluginKind> {
    let mut kinds: Vec<PluginKind> = CATALOG.values().copied().collect();
    kinds.sort_by_key(|k| k.name());
    kinds
}

pub fn names() -> Vec<&'static str> {
    kinds().iter().map(PluginKind::name).collect()
}

/// Creates a plugin of type `kind`, named `name` or after its type.
pub fn build(kind: &str, name: Option<&str>, params: &toml::Table) -> Result<Plugin, AnalysisError> {
    let plugin_kind = lookup(kind).ok_or_else(|| AnalysisError::UnknownPluginKind {
        kind: kind.to_string(),
        available: names().into_iter().map(str::to_string).collect(),
    })?;
    let plugin = Plugin::from_boxed(plugin_kind.create(params)?);
    match name {
        Some(name) => plugin.with_name(name),
        None => Ok(plugin),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> toml::Table {
        toml::from_str(r#"groups = ["Na1", "Na1_site"]"#).unwrap()
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(lookup("Distances"), Some(PluginKind::Distances));
        assert_eq!(lookup("DISTANCES"), Some(PluginKind::Distances));
        assert_eq!(lookup("rmsd"), None);
    }

    #[test]
    fn names_lists_registered_kinds() {
        assert_eq!(names(), vec!["Distances"]);
        assert!(PluginKind::Distances.summary().contains("Distances"));
    }

    #[test]
    fn build_names_plugin_after_kind_by_default() {
        let plugin = build("distances", None, &params()).unwrap();
        assert_eq!(plugin.name(), "Distances");
        assert_eq!(plugin.kind(), "Distances");

        let plugin = build("Distances", Some("Dsite"), &params()).unwrap();
        assert_eq!(plugin.name(), "Dsite");
    }

    #[test]
    fn build_reports_unknown_kind_with_alternatives() {
        let err = build("Template", None, &params()).unwrap_err();
        match err {
            AnalysisError::UnknownPluginKind { kind, available } => {
                assert_eq!(kind, "Template");
                assert_eq!(available, vec!["Distances".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn build_propagates_parameter_errors() {
        let err = build("Distances", None, &toml::Table::new()).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidParameter { .. }));
    }
}
