use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::{error, warn};

/// What to do when a checked file does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Resolve {
    /// Pretend the file exists.
    Ignore,
    /// Report `false` without logging.
    Indicate,
    /// Report `false` and log a warning.
    Warn,
    /// Fail with [`FileCheckError::NotFound`].
    #[default]
    Exception,
}

#[derive(Debug, Error)]
pub enum FileCheckError {
    #[error("Missing required file '{filetype}', got '{path}'.")]
    NotFound { filetype: String, path: String },
    #[error("Unknown resolution '{0}'; expected one of ignore, indicate, warn, exception")]
    UnknownResolve(String),
}

impl FromStr for Resolve {
    type Err = FileCheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ignore" => Ok(Self::Ignore),
            "indicate" => Ok(Self::Indicate),
            "warn" | "warning" => Ok(Self::Warn),
            "exception" | "raise" => Ok(Self::Exception),
            other => Err(FileCheckError::UnknownResolve(other.to_string())),
        }
    }
}

impl fmt::Display for Resolve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Ignore => "ignore",
            Self::Indicate => "indicate",
            Self::Warn => "warn",
            Self::Exception => "exception",
        };
        f.write_str(name)
    }
}

/// Checks that `path` names an existing regular file.
///
/// `filetype` only appears in messages. A missing `path` counts as a missing file.
pub fn check_file(
    filetype: &str,
    path: Option<&Path>,
    resolve: Resolve,
) -> Result<bool, FileCheckError> {
    if path.is_some_and(Path::is_file) {
        return Ok(true);
    }

    let shown = path.map_or_else(|| "None".to_string(), |p| p.display().to_string());
    match resolve {
        Resolve::Ignore => Ok(true),
        Resolve::Indicate => Ok(false),
        Resolve::Warn => {
            warn!("Missing required file '{}', got '{}'.", filetype, shown);
            Ok(false)
        }
        Resolve::Exception => {
            error!("Missing required file '{}', got '{}'.", filetype, shown);
            Err(FileCheckError::NotFound {
                filetype: filetype.to_string(),
                path: shown,
            })
        }
    }
}

/// Joins `path` onto `base` (when relative) and optionally resolves it to a real path.
///
/// Files that do not exist yet cannot be canonicalized; they are made absolute against the
/// current directory instead.
pub fn canonical(base: Option<&Path>, path: &Path, absolute: bool) -> PathBuf {
    let joined = match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    if !absolute {
        return joined;
    }
    match joined.canonicalize() {
        Ok(real) => real,
        Err(_) => std::env::current_dir()
            .map(|cwd| cwd.join(&joined))
            .unwrap_or(joined),
    }
}

/// Creates the parent directories of `path`. Already existing directories are fine.
pub fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}
