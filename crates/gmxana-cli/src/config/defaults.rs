pub struct DefaultsConfig {
    pub project_file: &'static str,
    pub driver: &'static str,
    pub strict: bool,
    pub absolute: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            project_file: "gmxana.toml",
            driver: "gmx",
            strict: true,
            absolute: true,
        }
    }
}
