//! Purpose: Describe the CI tasks and jobs that invoke the bot on each platform.
//! Exports: `TasksCfg`, `TaskSpec`, `JobSpec`, `CipdPackage`, `Cache`, `tasks_cfg`.
//! Role: Source of truth for the positional argv the bot receives on each bot.
//! Invariants: Task command = entry point, then every package path, then every cache path.
//! Invariants: Maps are ordered so the emitted JSON is stable across runs.
use std::collections::BTreeMap;

use serde::Serialize;

use super::platform::Platform;

/// argv prefix the scheduler runs on every task.
pub const BOT_ENTRY: &str = "skcms-bot";
pub const JOB_ALL: &str = "skcms";
const SERVICE_ACCOUNT: &str = "skia-external-compile-tasks@skia-swarming-bots.iam.gserviceaccount.com";
const ISOLATE: &str = "bot.isolate";

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CipdPackage {
    pub name: String,
    pub path: String,
    pub version: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Cache {
    pub name: String,
    pub path: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TaskSpec {
    #[serde(skip)]
    pub platform: Platform,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub caches: Vec<Cache>,
    pub cipd_packages: Vec<CipdPackage>,
    pub command: Vec<String>,
    pub dimensions: Vec<String>,
    pub isolate: String,
    pub max_attempts: u32,
    pub service_account: String,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct JobSpec {
    pub task_specs: Vec<String>,
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct TasksCfg {
    pub jobs: BTreeMap<String, JobSpec>,
    pub tasks: BTreeMap<String, TaskSpec>,
}

fn pkg(name: &str, path: &str, version: &str) -> CipdPackage {
    CipdPackage {
        name: name.to_string(),
        path: path.to_string(),
        version: version.to_string(),
    }
}

fn task_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Linux => "skcms-Linux",
        Platform::Mac => "skcms-Mac",
        Platform::Windows => "skcms-Win",
    }
}

fn dimensions(platform: Platform) -> Vec<&'static str> {
    match platform {
        // Skylake Xeons exercise the AVX-512 paths.
        Platform::Linux => vec!["os:Linux", "cpu:x86-64-Skylake_GCE"],
        Platform::Mac => vec!["os:Mac"],
        // Win7/Win8 bots have produced unexplained build failures.
        Platform::Windows => vec!["os:Windows-2016Server"],
    }
}

fn packages(platform: Platform) -> Vec<CipdPackage> {
    match platform {
        Platform::Linux => vec![
            pkg("infra/ninja/linux-amd64", "ninja", "version:1.8.2"),
            pkg("skia/bots/android_ndk_linux", "ndk", "version:14"),
            pkg("skia/bots/clang_linux", "clang_linux", "version:12"),
            pkg(
                "skia/bots/mips64el_toolchain_linux",
                "mips64el_toolchain_linux",
                "version:4",
            ),
        ],
        Platform::Mac => vec![
            pkg("infra/ninja/mac-amd64", "ninja", "version:1.8.2"),
            pkg("skia/bots/android_ndk_darwin", "ndk", "version:8"),
            // Installer for Xcode, not Xcode itself.
            pkg(
                "infra/tools/mac_toolchain/${platform}",
                "mac_toolchain",
                "git_revision:796d2b92cff93fc2059623ce0a66284373ceea0a",
            ),
        ],
        Platform::Windows => vec![
            pkg("skia/bots/win_ninja", "ninja", "version:2"),
            pkg("skia/bots/win_toolchain", "win_toolchain", "version:9"),
            pkg("skia/bots/clang_win", "clang_win", "version:8"),
        ],
    }
}

fn caches(platform: Platform) -> Vec<Cache> {
    match platform {
        // Separate from Skia's Xcode cache so the two can update independently.
        Platform::Mac => vec![Cache {
            name: "xcode_skcms".to_string(),
            path: "cache/Xcode_skcms.app".to_string(),
        }],
        Platform::Linux | Platform::Windows => Vec::new(),
    }
}

pub fn task_spec(platform: Platform) -> TaskSpec {
    let cipd_packages = packages(platform);
    let caches = caches(platform);

    let mut command = vec![BOT_ENTRY.to_string()];
    command.extend(cipd_packages.iter().map(|p| p.path.clone()));
    command.extend(caches.iter().map(|c| c.path.clone()));

    let mut dims: Vec<String> = dimensions(platform).into_iter().map(String::from).collect();
    dims.extend(["gpu:none".to_string(), "pool:Skia".to_string()]);

    TaskSpec {
        platform,
        caches,
        cipd_packages,
        command,
        dimensions: dims,
        isolate: ISOLATE.to_string(),
        max_attempts: 1,
        service_account: SERVICE_ACCOUNT.to_string(),
    }
}

pub fn tasks_cfg() -> TasksCfg {
    let platforms = [Platform::Linux, Platform::Mac, Platform::Windows];
    let mut jobs = BTreeMap::new();
    let mut tasks = BTreeMap::new();

    for platform in platforms {
        let name = task_name(platform).to_string();
        jobs.insert(
            name.clone(),
            JobSpec {
                task_specs: vec![name.clone()],
            },
        );
        tasks.insert(name, task_spec(platform));
    }
    jobs.insert(
        JOB_ALL.to_string(),
        JobSpec {
            task_specs: platforms
                .iter()
                .map(|p| task_name(*p).to_string())
                .collect(),
        },
    );

    TasksCfg { jobs, tasks }
}

#[cfg(test)]
mod tests {
    use super::{BOT_ENTRY, JOB_ALL, tasks_cfg};
    use crate::core::invocation::{Invocation, Provision};
    use std::path::Path;

    #[test]
    fn every_task_command_parses_for_its_platform() {
        let root = Path::new("/b/w");
        for (name, task) in tasks_cfg().tasks {
            assert_eq!(task.command[0], BOT_ENTRY, "{name}");
            let inv = Invocation::parse(task.platform, root, &task.command[1..])
                .unwrap_or_else(|err| panic!("{name}: {err}"));
            assert_eq!(inv.platform(), task.platform);
            assert_eq!(inv.ninja, root.join("ninja"));
            if let Provision::Mac { mac_toolchain, xcode_app_path } = inv.provision {
                assert_eq!(mac_toolchain, root.join("mac_toolchain"));
                assert_eq!(xcode_app_path, root.join("cache/Xcode_skcms.app"));
            }
        }
    }

    #[test]
    fn aggregate_job_lists_all_tasks() {
        let cfg = tasks_cfg();
        assert_eq!(
            cfg.jobs[JOB_ALL].task_specs,
            ["skcms-Linux", "skcms-Mac", "skcms-Win"]
        );
        assert_eq!(cfg.jobs.len(), 4);
        for name in cfg.tasks.keys() {
            assert_eq!(cfg.jobs[name].task_specs, [name.clone()]);
        }
    }

    #[test]
    fn json_shape_matches_scheduler_fields() {
        let value = serde_json::to_value(tasks_cfg()).expect("json");
        let mac = &value["tasks"]["skcms-Mac"];
        assert_eq!(mac["caches"][0]["name"], "xcode_skcms");
        assert_eq!(mac["max_attempts"], 1);
        assert_eq!(mac["dimensions"], serde_json::json!(["os:Mac", "gpu:none", "pool:Skia"]));
        assert!(mac.get("platform").is_none());
        assert!(value["tasks"]["skcms-Linux"].get("caches").is_none());
        assert_eq!(
            value["tasks"]["skcms-Win"]["command"],
            serde_json::json!(["skcms-bot", "ninja", "win_toolchain", "clang_win"])
        );
    }
}
