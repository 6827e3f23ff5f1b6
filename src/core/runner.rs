//! Purpose: Launch external tools (installer, xcode-select, ninja) as child processes.
//! Exports: `CommandSpec`, `Runner`, `ProcessRunner`.
//! Role: Process boundary; everything above it is pure and testable.
//! Invariants: Commands are argument vectors, never shell strings.
//! Invariants: Env overrides apply to the child only; the bot's own env is untouched.
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Serialize, Serializer};

use super::error::{Error, ErrorKind};

/// Status reported when the program could not be started at all.
pub const SPAWN_FAILED_STATUS: i32 = 127;

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CommandSpec {
    pub program: PathBuf,
    #[serde(serialize_with = "lossy_seq")]
    pub args: Vec<OsString>,
    #[serde(
        skip_serializing_if = "BTreeMap::is_empty",
        serialize_with = "lossy_map"
    )]
    pub env: BTreeMap<String, OsString>,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_os_string()));
        self
    }

    pub fn envs(mut self, vars: BTreeMap<String, OsString>) -> Self {
        self.env.extend(vars);
        self
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            let arg = arg.to_string_lossy();
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " {arg:?}")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

// Plans are printed as JSON for humans; non-UTF-8 bytes only degrade there.
pub(crate) fn lossy_str<S: Serializer>(value: &OsStr, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_string_lossy())
}

fn lossy_seq<S: Serializer>(values: &[OsString], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().map(|value| value.to_string_lossy()))
}

fn lossy_map<S: Serializer>(
    values: &BTreeMap<String, OsString>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        values
            .iter()
            .map(|(name, value)| (name, value.to_string_lossy())),
    )
}

pub trait Runner {
    /// Run `command` to completion with `cwd` as its working directory.
    fn run(&mut self, command: &CommandSpec, cwd: &Path) -> Result<(), Error>;
}

/// Blocking runner backed by `std::process`; the child inherits stdio.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl Runner for ProcessRunner {
    fn run(&mut self, command: &CommandSpec, cwd: &Path) -> Result<(), Error> {
        let status = Command::new(&command.program)
            .args(&command.args)
            .envs(&command.env)
            .current_dir(cwd)
            .status()
            .map_err(|err| {
                Error::new(ErrorKind::Command)
                    .with_message(format!("failed to start `{command}`"))
                    .with_path(&command.program)
                    .with_status(SPAWN_FAILED_STATUS)
                    .with_source(err)
            })?;

        if status.success() {
            return Ok(());
        }
        let code = status.code().unwrap_or(1);
        Err(Error::new(ErrorKind::Command)
            .with_message(format!("`{command}` exited with {status}"))
            .with_status(code))
    }
}
