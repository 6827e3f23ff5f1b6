//! Purpose: Hold top-level CLI command dispatch for `skcms-bot`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Argument validation completes before any file is written or child spawned.
//! Invariants: `--dry-run` performs no side effects beyond stdout.

use super::*;

use skcms_bot::core::invocation::Invocation;
use skcms_bot::core::plan::{execute, plan_for};
use skcms_bot::core::runner::ProcessRunner;
use skcms_bot::core::tasks::tasks_cfg;
use tracing::info;

pub(super) fn dispatch_command(cli: Cli) -> Result<RunOutcome, Error> {
    match cli.command {
        Some(Command::Tasks) => {
            let value = serde_json::to_value(tasks_cfg()).map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to encode task definitions")
                    .with_source(err)
            })?;
            emit_json(value);
            Ok(RunOutcome::ok())
        }
        None => run_bot(cli.run),
    }
}

fn run_bot(args: RunArgs) -> Result<RunOutcome, Error> {
    let platform = args.platform.unwrap_or_else(Platform::host);
    let cwd = std::env::current_dir().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read current directory")
            .with_source(err)
    })?;
    // Children run with the root as cwd, so every path handed to them must be absolute.
    let root = match args.root {
        Some(root) => cwd.join(root),
        None => cwd,
    };

    info!("Hello from {platform} in {}!", root.display());

    let invocation = Invocation::parse(platform, &root, &args.args)?;
    let inherited_path = std::env::var_os("PATH").unwrap_or_default();
    let plan = plan_for(&invocation, &inherited_path);

    if args.dry_run {
        emit_json(json!({
            "platform": platform,
            "invocation": invocation,
            "plan": plan,
        }));
        return Ok(RunOutcome::ok());
    }

    execute(&plan, &mut ProcessRunner)?;
    info!("build finished");
    Ok(RunOutcome::ok())
}
