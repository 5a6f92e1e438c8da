use gmxana::core::plotting::ImageFormat;
use gmxana::core::tools::GromacsNaming;
use gmxana::engine::config::SimulationConfig;

/// A plugin to create through the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginSpec {
    pub kind: String,
    pub name: Option<String>,
    pub params: toml::Table,
}

pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub naming: GromacsNaming,
    pub plugins: Vec<PluginSpec>,
    pub formats: Vec<ImageFormat>,
}
