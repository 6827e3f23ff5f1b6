//! Purpose: Name the three host platforms the bot knows how to provision.
//! Exports: `Platform`.
//! Role: Single fork point for every platform-dependent decision.
//! Invariants: Detection is total; anything not Mac or Linux is treated as Windows.
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Mac,
    Linux,
    Windows,
}

impl Platform {
    /// Classify a host identifier such as `darwin`, `linux2` or `win32`.
    pub fn detect(host: &str) -> Self {
        let host = host.to_ascii_lowercase();
        if host.contains("darwin") || host.contains("macos") {
            Platform::Mac
        } else if host.contains("linux") {
            Platform::Linux
        } else {
            Platform::Windows
        }
    }

    pub fn host() -> Self {
        Self::detect(std::env::consts::OS)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mac" | "macos" | "darwin" => Ok(Platform::Mac),
            "linux" => Ok(Platform::Linux),
            "windows" | "win" | "win32" => Ok(Platform::Windows),
            other => Err(Error::new(ErrorKind::Usage)
                .with_message(format!("unknown platform `{other}`"))
                .with_hint("Use one of: mac, linux, windows.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Platform;

    #[test]
    fn detect_follows_substring_rule() {
        assert_eq!(Platform::detect("darwin"), Platform::Mac);
        assert_eq!(Platform::detect("macos"), Platform::Mac);
        assert_eq!(Platform::detect("linux"), Platform::Linux);
        assert_eq!(Platform::detect("linux2"), Platform::Linux);
        assert_eq!(Platform::detect("win32"), Platform::Windows);
        assert_eq!(Platform::detect("cygwin"), Platform::Windows);
        assert_eq!(Platform::detect(""), Platform::Windows);
    }

    #[test]
    fn host_matches_compile_target() {
        let expected = if cfg!(target_os = "macos") {
            Platform::Mac
        } else if cfg!(target_os = "linux") {
            Platform::Linux
        } else {
            Platform::Windows
        };
        assert_eq!(Platform::host(), expected);
    }

    #[test]
    fn parse_accepts_aliases() {
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::Mac);
        assert_eq!("Linux".parse::<Platform>().unwrap(), Platform::Linux);
        assert_eq!("win".parse::<Platform>().unwrap(), Platform::Windows);
        assert!("beos".parse::<Platform>().is_err());
    }
}
