//! Purpose: Pinned toolchain versions and the values derived from them.
//! Exports: version constants, config-file line builders, `MsvcEnv`.
//! Role: Pure construction; nothing here touches the filesystem or env.
//! Invariants: Paths are concatenated as `OsStr`, so non-UTF-8 bytes survive.
//! Invariants: MSVC segments use `\` separators and each ends with `;`.
use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Xcode build version installed through mac_toolchain (Xcode 9.2).
pub const XCODE_BUILD_VERSION: &str = "9c40b";
pub const MSVC_VERSION: &str = "14.16.27023";
pub const WIN_SDK_VERSION: &str = "10.0.17763.0";

/// Directory of the project that ninja builds, relative to the working root.
pub const PROJECT_DIR: &str = "skcms";
pub const CLANG_CONFIG: &str = "skcms/build/clang";
pub const LSAN_CONFIG: &str = "skcms/build/clang.lsan";
/// Build description ninja reads on Windows instead of `build.ninja`.
pub const MSVS_NINJA_FILE: &str = "msvs.ninja";

/// Mac bot images ship toolchains too old for LeakSanitizer.
pub const LSAN_DISABLED_LINE: &str = "disabled = true";

pub fn clang_cc_line(clang_linux: &Path) -> OsString {
    concat([OsStr::new("cc  = "), clang_linux.as_os_str(), OsStr::new("/bin/clang  ")])
}

pub fn clang_cxx_line(clang_linux: &Path) -> OsString {
    concat([OsStr::new("cxx = "), clang_linux.as_os_str(), OsStr::new("/bin/clang++")])
}

/// Environment a Windows build needs, passed explicitly to the child process.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MsvcEnv {
    pub path: OsString,
    pub include: OsString,
    pub lib: OsString,
}

impl MsvcEnv {
    /// `inherited_path` is appended after the MSVC compiler directory.
    pub fn new(win_toolchain: &Path, inherited_path: &OsStr) -> Self {
        let root = win_toolchain.as_os_str();
        let msvc = format!(r"\VC\Tools\MSVC\{MSVC_VERSION}");
        let sdk_include = format!(r"\win_sdk\Include\{WIN_SDK_VERSION}");
        let sdk_lib = format!(r"\win_sdk\Lib\{WIN_SDK_VERSION}");

        let mut path = concat([root, OsStr::new(&msvc), OsStr::new(r"\bin\HostX64\x64;")]);
        path.push(inherited_path);
        let include = segments(
            root,
            &[
                format!(r"{msvc}\include"),
                format!(r"{sdk_include}\shared"),
                format!(r"{sdk_include}\ucrt"),
                format!(r"{sdk_include}\um"),
            ],
        );
        let lib = segments(
            root,
            &[
                format!(r"{msvc}\lib\x64"),
                format!(r"{sdk_lib}\um\x64"),
                format!(r"{sdk_lib}\ucrt\x64"),
            ],
        );

        Self { path, include, lib }
    }

    pub fn vars(&self) -> BTreeMap<String, OsString> {
        BTreeMap::from([
            ("INCLUDE".to_string(), self.include.clone()),
            ("LIB".to_string(), self.lib.clone()),
            ("PATH".to_string(), self.path.clone()),
        ])
    }
}

fn concat<'a>(parts: impl IntoIterator<Item = &'a OsStr>) -> OsString {
    let mut out = OsString::new();
    for part in parts {
        out.push(part);
    }
    out
}

/// `root` + suffix + `;` for every suffix.
fn segments(root: &OsStr, suffixes: &[String]) -> OsString {
    concat(
        suffixes
            .iter()
            .flat_map(|suffix| [root, OsStr::new(suffix), OsStr::new(";")]),
    )
}
