//! Discovery of an interpreter's default module search path.
//!
//! The interpreter is run once, in isolated mode, with a one-line program
//! that prints every `sys.path` entry on its own line.

use std::{
    path::{Path, PathBuf},
    process::Command,
};

use anyhow::Result;
use log::debug;

use crate::error::BundleError;

/// Program passed to `python -E -c`.
pub const PROBE_PROGRAM: &str = "import sys\nfor path in sys.path: print(path)";

/// Source of interpreter-reported search roots.
pub trait SysPathProbe: std::fmt::Debug {
    fn probe(&self) -> Result<Vec<PathBuf>>;
}

/// Probe that asks nothing and reports no paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProbe;

impl SysPathProbe for NoProbe {
    fn probe(&self) -> Result<Vec<PathBuf>> {
        Ok(Vec::new())
    }
}

/// Probe that runs a real interpreter binary as a child process.
#[derive(Debug, Clone)]
pub struct InterpreterProbe {
    binary: PathBuf,
}

impl InterpreterProbe {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn failure(&self, reason: impl Into<String>) -> BundleError {
        BundleError::ProbeFailure {
            binary: self.binary.clone(),
            reason: reason.into(),
        }
    }
}

impl SysPathProbe for InterpreterProbe {
    fn probe(&self) -> Result<Vec<PathBuf>> {
        debug!("Probing sys.path with {}", self.binary.display());
        let output = Command::new(&self.binary)
            .args(["-E", "-c", PROBE_PROGRAM])
            .output()
            .map_err(|err| self.failure(err.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(self
                .failure(format!("exited with {}: {}", output.status, stderr.trim()))
                .into());
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|err| self.failure(format!("output is not valid UTF-8: {err}")))?;
        let paths = parse_probe_output(&stdout);
        debug!("Interpreter reported {} search paths", paths.len());
        Ok(paths)
    }
}

/// Build the probe for an optional interpreter binary.
pub fn probe_for(binary: Option<&Path>) -> Box<dyn SysPathProbe> {
    match binary {
        Some(binary) => Box::new(InterpreterProbe::new(binary)),
        None => Box::new(NoProbe),
    }
}

/// One path per line; surrounding whitespace is trimmed and blank lines
/// are dropped.
pub fn parse_probe_output(stdout: &str) -> Vec<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}
