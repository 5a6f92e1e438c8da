use super::invocation::ToolInvocation;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use thiserror::Error;
use tracing::{debug, instrument};

const STDERR_TAIL_LINES: usize = 20;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Gromacs executable '{program}' not found; is Gromacs installed and on PATH?")]
    NotFound { program: String },

    #[error("Gromacs tool '{tool}' failed with exit code {code:?}:\n{stderr}")]
    Failed {
        tool: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error while running '{tool}': {source}")]
    Io {
        tool: String,
        #[source]
        source: io::Error,
    },
}

/// How Gromacs tool names map to executables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GromacsNaming {
    /// Gromacs 5 and later: one driver binary with the tool as subcommand (`gmx mindist`).
    Driver { binary: String },
    /// Gromacs 4: one executable per tool (`g_mindist`, optionally with a suffix like `_d`).
    Legacy { prefix: String, suffix: String },
}

impl Default for GromacsNaming {
    fn default() -> Self {
        Self::Driver {
            binary: "gmx".to_string(),
        }
    }
}

impl GromacsNaming {
    pub fn legacy() -> Self {
        Self::Legacy {
            prefix: "g_".to_string(),
            suffix: String::new(),
        }
    }

    /// Program and leading arguments that start `tool`.
    pub fn command_for(&self, tool: &str) -> (String, Vec<String>) {
        match self {
            Self::Driver { binary } => (binary.clone(), vec![tool.to_string()]),
            Self::Legacy { prefix, suffix } => (format!("{}{}{}", prefix, tool, suffix), vec![]),
        }
    }
}

/// Captured output of a finished tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Executes Gromacs tools.
///
/// The engine never spawns processes itself; it hands every [`ToolInvocation`] to a runner,
/// which lets tests substitute a fake that writes the expected output files.
pub trait ToolRunner: Send + Sync {
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError>;
}

/// Runs tools as child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    naming: GromacsNaming,
}

impl SystemRunner {
    pub fn new(naming: GromacsNaming) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &GromacsNaming {
        &self.naming
    }
}

fn tail(text: &str, lines: usize) -> String {
    let all: Vec<_> = text.lines().collect();
    all[all.len().saturating_sub(lines)..].join("\n")
}

impl ToolRunner for SystemRunner {
    #[instrument(skip_all, fields(tool = %invocation.tool))]
    fn run(&self, invocation: &ToolInvocation) -> Result<ToolOutput, ToolError> {
        let (program, mut args) = self.naming.command_for(&invocation.tool);
        args.extend(invocation.command_args());
        debug!("Executing: {} {}", program, args.join(" "));

        let io_err = |source| ToolError::Io {
            tool: invocation.tool.clone(),
            source,
        };

        let mut child = Command::new(&program)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ToolError::NotFound {
                    program: program.clone(),
                },
                _ => io_err(e),
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            if let Some(input) = &invocation.stdin {
                match stdin.write_all(input.as_bytes()) {
                    Ok(()) => {}
                    // The tool exited without reading its input; its exit status tells why.
                    Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                        debug!("Tool '{}' closed its input early.", invocation.tool);
                    }
                    Err(e) => return Err(io_err(e)),
                }
            }
        }

        let output = child.wait_with_output().map_err(io_err)?;
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ToolError::Failed {
                tool: invocation.tool.clone(),
                code: output.status.code(),
                stderr: tail(&stderr, STDERR_TAIL_LINES),
            });
        }

        debug!("Tool '{}' finished successfully.", invocation.tool);
        Ok(ToolOutput { stdout, stderr })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_naming_uses_subcommand() {
        let (program, args) = GromacsNaming::default().command_for("mindist");
        assert_eq!(program, "gmx");
        assert_eq!(args, vec!["mindist"]);
    }

    #[test]
    fn legacy_naming_builds_executable_name() {
        let naming = GromacsNaming::Legacy {
            prefix: "g_".into(),
            suffix: "_d".into(),
        };
        let (program, args) = naming.command_for("mindist");
        assert_eq!(program, "g_mindist_d");
        assert!(args.is_empty());
        assert_eq!(GromacsNaming::legacy().command_for("energy").0, "g_energy");
    }

    #[test]
    fn missing_executable_is_reported_as_not_found() {
        let runner = SystemRunner::new(GromacsNaming::Driver {
            binary: "gmxana-definitely-not-installed".into(),
        });
        let err = runner.run(&ToolInvocation::new("mindist")).unwrap_err();
        assert!(matches!(err, ToolError::NotFound { program } if program == "gmxana-definitely-not-installed"));
    }

    #[cfg(unix)]
    #[test]
    fn stdin_is_forwarded_and_stdout_captured() {
        let runner = SystemRunner::new(GromacsNaming::Legacy {
            prefix: String::new(),
            suffix: String::new(),
        });
        let output = runner
            .run(&ToolInvocation::new("cat").stdin_lines(["Protein", "SOL"]))
            .unwrap();
        assert_eq!(output.stdout, "Protein\nSOL\n");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_is_reported_as_failure() {
        let runner = SystemRunner::new(GromacsNaming::Legacy {
            prefix: String::new(),
            suffix: String::new(),
        });
        let err = runner.run(&ToolInvocation::new("false")).unwrap_err();
        assert!(matches!(err, ToolError::Failed { code: Some(1), .. }));
    }

    #[cfg(unix)]
    #[test]
    fn tool_exiting_before_reading_input_reports_exit_status() {
        let runner = SystemRunner::new(GromacsNaming::Legacy {
            prefix: String::new(),
            suffix: String::new(),
        });
        let groups = vec!["Protein_chain_A_and_backbone"; 20_000];
        let err = runner
            .run(&ToolInvocation::new("false").stdin_lines(groups))
            .unwrap_err();
        assert!(matches!(err, ToolError::Failed { code: Some(1), .. }));
    }

    #[test]
    fn tail_keeps_last_lines() {
        assert_eq!(tail("a\nb\nc", 2), "b\nc");
        assert_eq!(tail("a", 5), "a");
    }
}
