//! Purpose: Map the bot's positional arguments onto one platform's provisioning inputs.
//! Exports: `Invocation`, `Provision`, `required_args`.
//! Role: Validates argument count before any side effect happens.
//! Invariants: Positions are fixed: runner dir, Windows toolchain, Mac installer or
//! Linux clang, Xcode destination. Unused positions are ignored, not checked.
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use serde::Serialize;

use super::error::{Error, ErrorKind};
use super::platform::Platform;

/// Platform-specific inputs. Each variant carries only what its branch reads.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum Provision {
    Mac {
        mac_toolchain: PathBuf,
        xcode_app_path: PathBuf,
    },
    Linux {
        clang_linux: PathBuf,
    },
    Windows {
        win_toolchain: PathBuf,
    },
}

impl Provision {
    pub fn platform(&self) -> Platform {
        match self {
            Provision::Mac { .. } => Platform::Mac,
            Provision::Linux { .. } => Platform::Linux,
            Provision::Windows { .. } => Platform::Windows,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Invocation {
    /// Working root: the checkout that contains `skcms/`.
    pub root: PathBuf,
    /// Directory holding the ninja binary.
    pub ninja: PathBuf,
    pub provision: Provision,
}

/// Number of positional arguments `platform` reads.
pub fn required_args(platform: Platform) -> usize {
    match platform {
        Platform::Mac => 4,
        Platform::Linux => 3,
        Platform::Windows => 2,
    }
}

impl Invocation {
    pub fn parse<S: AsRef<OsStr>>(
        platform: Platform,
        root: &Path,
        args: &[S],
    ) -> Result<Self, Error> {
        let required = required_args(platform);
        if args.len() < required {
            return Err(Error::new(ErrorKind::Usage)
                .with_message(format!(
                    "{platform} needs {required} positional arguments, got {}",
                    args.len()
                ))
                .with_hint(usage_hint(platform)));
        }

        let provision = match platform {
            Platform::Mac => Provision::Mac {
                mac_toolchain: root.join(args[2].as_ref()),
                xcode_app_path: root.join(args[3].as_ref()),
            },
            Platform::Linux => Provision::Linux {
                clang_linux: realpath(root, args[2].as_ref()),
            },
            Platform::Windows => Provision::Windows {
                win_toolchain: realpath(root, args[1].as_ref()),
            },
        };

        Ok(Self {
            root: root.to_path_buf(),
            ninja: root.join(args[0].as_ref()),
            provision,
        })
    }

    pub fn platform(&self) -> Platform {
        self.provision.platform()
    }
}

fn usage_hint(platform: Platform) -> &'static str {
    match platform {
        Platform::Mac => "Usage on mac: skcms-bot <ninja> <unused> <mac_toolchain> <xcode_app_path>",
        Platform::Linux => "Usage on linux: skcms-bot <ninja> <unused> <clang_linux>",
        Platform::Windows => "Usage on windows: skcms-bot <ninja> <win_toolchain>",
    }
}

/// Absolute, symlink-free form of `raw` when it exists; lexically normalized otherwise.
fn realpath(root: &Path, raw: &OsStr) -> PathBuf {
    let joined = normalize(&root.join(raw));
    match joined.canonicalize() {
        Ok(resolved) => strip_verbatim(resolved),
        Err(_) => joined,
    }
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

// `canonicalize` on Windows yields `\\?\C:\...`, which cl.exe rejects in INCLUDE/LIB.
fn strip_verbatim(path: PathBuf) -> PathBuf {
    let stripped = path
        .to_str()
        .and_then(|text| text.strip_prefix(r"\\?\"))
        .filter(|rest| !rest.starts_with(r"UNC\"))
        .map(PathBuf::from);
    stripped.unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::{Invocation, Provision, normalize, required_args};
    use crate::core::error::ErrorKind;
    use crate::core::platform::Platform;
    use std::path::{Path, PathBuf};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn short_argv_is_usage_error() {
        let root = Path::new("/work");
        for platform in [Platform::Mac, Platform::Linux, Platform::Windows] {
            let short = vec!["x".to_string(); required_args(platform) - 1];
            let err = Invocation::parse(platform, root, &short).expect_err("too few args");
            assert_eq!(err.kind(), ErrorKind::Usage);
            assert!(err.hint().is_some());
        }
    }

    #[test]
    fn mac_joins_installer_and_xcode_onto_root() {
        let root = Path::new("/work");
        let inv = Invocation::parse(
            Platform::Mac,
            root,
            &args(&["ninja", "unused", "mac_toolchain", "cache/Xcode_skcms.app"]),
        )
        .expect("parse");
        assert_eq!(inv.ninja, PathBuf::from("/work/ninja"));
        assert_eq!(
            inv.provision,
            Provision::Mac {
                mac_toolchain: PathBuf::from("/work/mac_toolchain"),
                xcode_app_path: PathBuf::from("/work/cache/Xcode_skcms.app"),
            }
        );
    }

    #[test]
    fn linux_resolves_existing_clang_through_symlinks() {
        let temp = tempfile::tempdir().expect("tempdir");
        let real = temp.path().join("clang_real");
        std::fs::create_dir(&real).expect("mkdir");
        let canonical_real = real.canonicalize().expect("canonicalize");

        #[cfg(unix)]
        {
            std::os::unix::fs::symlink(&real, temp.path().join("clang_linux")).expect("symlink");
            let inv = Invocation::parse(
                Platform::Linux,
                temp.path(),
                &args(&["ninja", "unused", "clang_linux"]),
            )
            .expect("parse");
            assert_eq!(
                inv.provision,
                Provision::Linux {
                    clang_linux: canonical_real.clone()
                }
            );
        }

        let inv = Invocation::parse(
            Platform::Linux,
            temp.path(),
            &args(&["ninja", "unused", "./clang_real"]),
        )
        .expect("parse");
        assert_eq!(
            inv.provision,
            Provision::Linux {
                clang_linux: canonical_real
            }
        );
    }

    #[test]
    fn missing_paths_are_normalized_not_rejected() {
        let inv = Invocation::parse(
            Platform::Linux,
            Path::new("/nonexistent/work"),
            &args(&["ninja", "unused", "pkgs/../clang_linux"]),
        )
        .expect("parse");
        assert_eq!(
            inv.provision,
            Provision::Linux {
                clang_linux: PathBuf::from("/nonexistent/work/clang_linux")
            }
        );
    }

    #[test]
    fn extra_positions_are_ignored() {
        let inv = Invocation::parse(
            Platform::Windows,
            Path::new("/nonexistent"),
            &args(&["ninja", "win_toolchain", "clang_win"]),
        )
        .expect("parse");
        assert_eq!(inv.platform(), Platform::Windows);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn non_utf8_args_are_joined_without_loss() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let root = Path::new(OsStr::from_bytes(b"/nonexistent/w\xff"));
        let argv = [
            OsStr::new("ninja"),
            OsStr::new("unused"),
            OsStr::from_bytes(b"clang\xfe"),
        ];
        let inv = Invocation::parse(Platform::Linux, root, &argv).expect("parse");
        assert_eq!(inv.ninja, root.join("ninja"));
        assert_eq!(
            inv.provision,
            Provision::Linux {
                clang_linux: root.join(OsStr::from_bytes(b"clang\xfe"))
            }
        );
    }

    #[test]
    fn normalize_drops_dot_segments() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
    }
}
