//! Purpose: Append directives to the build configuration files ninja reads.
//! Exports: `append_line`.
//! Role: The only filesystem write the bot performs.
//! Invariants: Append-only; existing content is never read or rewritten.
//! Invariants: Repeated calls duplicate lines (CI runs start from a clean checkout).
use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use super::error::{Error, ErrorKind};

/// Writes the raw bytes of `line` plus `\n`; non-UTF-8 paths are copied unchanged.
pub fn append_line(path: &Path, line: &OsStr) -> Result<(), Error> {
    let io_error = |err: std::io::Error| {
        Error::new(ErrorKind::Io)
            .with_message("failed to append build config line")
            .with_path(path)
            .with_source(err)
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_error)?;
    let mut bytes = line.as_encoded_bytes().to_vec();
    bytes.push(b'\n');
    file.write_all(&bytes).map_err(io_error)
}
