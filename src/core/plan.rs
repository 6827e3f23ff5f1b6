//! Purpose: Turn an `Invocation` into the ordered side effects of one bot run.
//! Exports: `Plan`, `Step`, `plan_for`, `execute`.
//! Role: Exactly one platform branch contributes steps; execution stops at the first error.
//! Invariants: Config appends and env overrides precede the ninja step that consumes them.
//! Invariants: Ninja always runs with `-k 0`; its own non-zero exit still fails the run.
//! Invariants: Paths stay `OsStr` end to end; only the JSON rendering is lossy.
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use super::build_config::append_line;
use super::error::Error;
use super::invocation::{Invocation, Provision};
use super::runner::{CommandSpec, Runner, lossy_str};
use super::toolchain::{
    CLANG_CONFIG, LSAN_CONFIG, LSAN_DISABLED_LINE, MSVS_NINJA_FILE, MsvcEnv, PROJECT_DIR,
    XCODE_BUILD_VERSION, clang_cc_line, clang_cxx_line,
};

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Run(CommandSpec),
    /// `path` is relative to the working root.
    Append {
        path: PathBuf,
        #[serde(serialize_with = "lossy_str")]
        line: OsString,
    },
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Plan {
    pub root: PathBuf,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.steps.iter().filter_map(|step| match step {
            Step::Run(command) => Some(command),
            Step::Append { .. } => None,
        })
    }
}

/// Build the plan for `invocation`. `inherited_path` feeds the Windows `PATH` override.
pub fn plan_for(invocation: &Invocation, inherited_path: &OsStr) -> Plan {
    let mut steps = Vec::new();

    match &invocation.provision {
        Provision::Mac {
            mac_toolchain,
            xcode_app_path,
        } => {
            steps.push(Step::Run(
                CommandSpec::new(mac_toolchain.join("mac_toolchain"))
                    .args([
                        "install",
                        "-kind",
                        "mac",
                        "-xcode-version",
                        XCODE_BUILD_VERSION,
                        "-output-dir",
                    ])
                    .args([xcode_app_path]),
            ));
            steps.push(Step::Run(
                CommandSpec::new("sudo")
                    .args(["xcode-select", "-switch"])
                    .args([xcode_app_path]),
            ));
            steps.push(append(LSAN_CONFIG, LSAN_DISABLED_LINE.into()));
            steps.push(Step::Run(ninja(invocation.ninja.join("ninja"))));
        }
        Provision::Linux { clang_linux } => {
            steps.push(append(CLANG_CONFIG, clang_cc_line(clang_linux)));
            steps.push(append(CLANG_CONFIG, clang_cxx_line(clang_linux)));
            steps.push(Step::Run(ninja(invocation.ninja.join("ninja"))));
        }
        Provision::Windows { win_toolchain } => {
            let env = MsvcEnv::new(win_toolchain, inherited_path);
            steps.push(Step::Run(
                CommandSpec::new(invocation.ninja.join("ninja.exe"))
                    .args(["-C", PROJECT_DIR, "-f", MSVS_NINJA_FILE, "-k", "0"])
                    .envs(env.vars()),
            ));
        }
    }

    Plan {
        root: invocation.root.clone(),
        steps,
    }
}

fn ninja(program: PathBuf) -> CommandSpec {
    CommandSpec::new(program).args(["-C", PROJECT_DIR, "-k", "0"])
}

fn append(path: &str, line: OsString) -> Step {
    Step::Append {
        path: PathBuf::from(path),
        line,
    }
}

pub fn execute(plan: &Plan, runner: &mut dyn Runner) -> Result<(), Error> {
    let total = plan.steps.len();
    for (index, step) in plan.steps.iter().enumerate() {
        let n = index + 1;
        match step {
            Step::Run(command) => {
                info!("[{n}/{total}] run: {command}");
                for (name, value) in &command.env {
                    debug!("env {name}={}", value.to_string_lossy());
                }
                runner.run(command, &plan.root)?;
            }
            Step::Append { path, line } => {
                info!("[{n}/{total}] append to {}: {line:?}", path.display());
                append_line(&resolve(&plan.root, path), line)?;
            }
        }
    }
    Ok(())
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
