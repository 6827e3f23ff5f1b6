//! Purpose: `skcms-bot` CLI entry point.
//! Role: Binary crate root; parses args, sets up logging, runs the dispatcher.
//! Invariants: Errors are emitted on stderr (text on a TTY, JSON otherwise).
//! Invariants: Process exit code is derived from `core::error::exit_code`, so a
//! failing child's status becomes the bot's status.
use std::ffi::OsString;
use std::io::{self, IsTerminal};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use skcms_bot::core::error::{Error, ErrorKind, exit_code};
use skcms_bot::core::platform::Platform;

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    let exit_code = match run() {
        Ok(outcome) => outcome.exit_code,
        Err(err) => {
            emit_error(&err);
            exit_code(&err)
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<RunOutcome, Error> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    Error::new(ErrorKind::Io)
                        .with_message("failed to write help")
                        .with_source(io_err)
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message(clap_error_summary(&err))
                    .with_hint("Run `skcms-bot --help` for usage."));
            }
        },
    };

    init_tracing();
    command_dispatch::dispatch_command(cli)
}

#[derive(Parser)]
#[command(
    name = "skcms-bot",
    version,
    about = "Provision the host toolchain and build skcms with ninja",
    long_about = r#"Provision the host toolchain and build skcms with ninja.

The positional arguments are the CIPD package and cache paths the task
scheduler passes, in order. Which of them are read depends on the platform:

  mac      <ninja> <unused> <mac_toolchain> <xcode_app_path>
  linux    <ninja> <unused> <clang_linux>
  windows  <ninja> <win_toolchain>"#,
    after_help = r#"EXAMPLES
  $ skcms-bot ninja ndk clang_linux mips64el_toolchain_linux
  $ skcms-bot --platform mac --dry-run ninja ndk mac_toolchain cache/Xcode_skcms.app
  $ skcms-bot tasks > tasks.json

NOTES
  - Set RUST_LOG=debug to log the environment passed to ninja on Windows
  - Config lines are appended blindly; run from a clean checkout"#,
    args_conflicts_with_subcommands = true,
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Print the CI task and job definitions as JSON")]
    Tasks,
}

#[derive(Args)]
struct RunArgs {
    #[arg(
        long,
        value_parser = parse_platform,
        help = "Provision for this platform instead of the detected host: mac|linux|windows"
    )]
    platform: Option<Platform>,
    #[arg(
        long,
        help = "Working root containing skcms/ (default: current directory)",
        value_hint = ValueHint::DirPath
    )]
    root: Option<PathBuf>,
    #[arg(long, help = "Print the plan as JSON without running anything")]
    dry_run: bool,
    #[arg(value_name = "ARG", help = "Package and cache paths from the task scheduler")]
    args: Vec<OsString>,
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    value.parse::<Platform>().map_err(|err| error_message(&err))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn clap_error_summary(err: &clap::Error) -> String {
    let rendered = err.to_string();
    rendered
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.trim_start_matches("error: ").to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}

fn emit_json(value: Value) {
    let json = serde_json::to_string_pretty(&value)
        .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn emit_error(err: &Error) {
    if io::stderr().is_terminal() {
        eprintln!("{}", error_text(err));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_message(err: &Error) -> String {
    if let Some(message) = err.message() {
        return message.to_string();
    }
    match err.kind() {
        ErrorKind::Internal => "internal error".to_string(),
        ErrorKind::Usage => "usage error".to_string(),
        ErrorKind::Io => "i/o error".to_string(),
        ErrorKind::Command => "command failed".to_string(),
    }
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(error_message(err)));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(path) = err.path() {
        inner.insert("path".to_string(), json!(path.display().to_string()));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error) -> String {
    let mut lines = vec![format!("error: {}", error_message(err))];
    if let Some(path) = err.path() {
        lines.push(format!("  path: {}", path.display()));
    }
    if let Some(status) = err.status() {
        lines.push(format!("  status: {status}"));
    }
    for cause in error_causes(err) {
        lines.push(format!("  caused by: {cause}"));
    }
    if let Some(hint) = err.hint() {
        lines.push(format!("hint: {hint}"));
    }
    lines.join("\n")
}
