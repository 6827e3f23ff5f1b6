// Core modules: platform branching, provisioning plans, and the process boundary.
pub mod build_config;
pub mod error;
pub mod invocation;
pub mod plan;
pub mod platform;
pub mod runner;
pub mod tasks;
pub mod toolchain;
