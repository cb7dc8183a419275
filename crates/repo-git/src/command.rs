//! `git` subprocess runner

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Handle for invoking the `git` binary.
///
/// Every invocation captures stdout and stderr. A non-zero exit becomes
/// [`Error::CommandFailed`] carrying git's own stderr so callers can surface
/// the real diagnostic.
#[derive(Debug, Clone)]
pub struct Git {
    program: PathBuf,
    config: Vec<(String, String)>,
}

impl Default for Git {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
            config: Vec::new(),
        }
    }
}

impl Git {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific git executable instead of the one on `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Pass `-c key=value` to every invocation.
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.push((key.into(), value.into()));
        self
    }

    /// Run git with `args`, optionally inside `dir` (`git -C dir ...`).
    ///
    /// Returns stdout with trailing whitespace removed.
    pub fn run<I, S>(&self, dir: Option<&Path>, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args: Vec<OsString> = args.into_iter().map(|a| a.as_ref().to_os_string()).collect();
        let shown = self.command_line(dir, &args);

        let mut cmd = Command::new(&self.program);
        if let Some(dir) = dir {
            cmd.arg("-C").arg(dir);
        }
        for (key, value) in &self.config {
            cmd.arg("-c").arg(format!("{key}={value}"));
        }
        cmd.args(&args);

        tracing::debug!(command = %shown, "Running git");

        let output = cmd.output().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotInstalled
            } else {
                Error::Io {
                    path: self.program.clone(),
                    source: e,
                }
            }
        })?;

        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(command = %shown, code = ?output.status.code(), %stderr, "git failed");
            Err(Error::CommandFailed {
                command: shown,
                code: output.status.code(),
                stderr,
            })
        }
    }

    /// Run git inside `dir`.
    pub fn run_in<S: AsRef<OsStr>>(&self, dir: &Path, args: &[S]) -> Result<String> {
        self.run(Some(dir), args)
    }

    /// `git --version`, e.g. `git version 2.43.0`.
    pub fn version(&self) -> Result<String> {
        self.run(None, ["--version"])
    }

    fn command_line(&self, dir: Option<&Path>, args: &[OsString]) -> String {
        let mut parts = vec![self.program.to_string_lossy().to_string()];
        if let Some(dir) = dir {
            parts.push("-C".into());
            parts.push(dir.to_string_lossy().to_string());
        }
        parts.extend(args.iter().map(|a| a.to_string_lossy().to_string()));
        parts.join(" ")
    }
}

/// Parse `git version X.Y.Z...` into `(major, minor)`.
pub fn parse_version(output: &str) -> Option<(u32, u32)> {
    let version = output.split_whitespace().nth(2)?;
    let mut parts = version.split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
