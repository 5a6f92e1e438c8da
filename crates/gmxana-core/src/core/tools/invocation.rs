use std::fmt;
use std::path::Path;

/// Value of a single command-line option of a Gromacs tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Boolean switch: `true` renders `-flag`, `false` renders `-noflag`.
    Flag(bool),
    Value(String),
    Values(Vec<String>),
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Value(value)
    }
}

impl From<&Path> for ArgValue {
    fn from(value: &Path) -> Self {
        Self::Value(value.display().to_string())
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<usize> for ArgValue {
    fn from(value: usize) -> Self {
        Self::Value(value.to_string())
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// A fully specified call of one Gromacs tool, independent of how the tool is spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    /// Tool name without any driver or prefix (e.g. `mindist`).
    pub tool: String,
    /// Options in insertion order; option names are stored without the leading dash.
    pub args: Vec<(String, ArgValue)>,
    /// Text fed to the tool's standard input (interactive group selection).
    pub stdin: Option<String>,
}

impl ToolInvocation {
    pub fn new(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            args: Vec::new(),
            stdin: None,
        }
    }

    /// Sets an option, replacing any earlier value for the same option.
    pub fn arg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets an option when `value` is present.
    pub fn opt_arg<V: Into<ArgValue>>(self, name: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.arg(name, value),
            None => self,
        }
    }

    pub fn stdin_lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut input = String::new();
        for line in lines {
            input.push_str(line.as_ref());
            input.push('\n');
        }
        self.stdin = Some(input);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<ArgValue>) {
        let name = name.into();
        let name = name.trim_start_matches('-').to_string();
        let value = value.into();
        match self.args.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.args.push((name, value)),
        }
    }

    pub fn has_arg(&self, name: &str) -> bool {
        let name = name.trim_start_matches('-');
        self.args.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        let name = name.trim_start_matches('-');
        self.args.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Renders the options as command-line arguments.
    pub fn command_args(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len() * 2);
        for (name, value) in &self.args {
            match value {
                ArgValue::Flag(true) => out.push(format!("-{}", name)),
                ArgValue::Flag(false) => out.push(format!("-no{}", name)),
                ArgValue::Value(v) => {
                    out.push(format!("-{}", name));
                    out.push(v.clone());
                }
                ArgValue::Values(vs) => {
                    out.push(format!("-{}", name));
                    out.extend(vs.iter().cloned());
                }
            }
        }
        out
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tool)?;
        for arg in self.command_args() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
