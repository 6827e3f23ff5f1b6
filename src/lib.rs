//! Purpose: Library crate behind the `skcms-bot` CI entry point.
//! Exports: `core` (platform detection, argument layout, plans, process runner, errors).
//! Role: Keeps every decision testable without spawning the real toolchain.
//! Invariants: Planning is pure; side effects happen only in `plan::execute`.
pub mod core;
