//! Graphics stack health checker
//!
//! Inspects installed GPUs, their kernel drivers and the OpenGL runtime, and
//! reports pass/warn/fail findings for a misconfigured or unsupported setup.

/// Build-time information (version, target, timestamp)
pub mod build_info;

/// Command-line arguments
pub mod cli;

/// External command execution with timeouts
pub mod command;

/// Layered application configuration
pub mod config;

/// Diagnostic check engine and built-in checks
pub mod health;

/// Tracing setup and session log
pub mod logging;

/// Native GL helper boundary
pub mod native;

/// Working directory and report archive
pub mod report;

/// Typed model of the host's graphics stack and its collectors
pub mod system_info;

#[cfg(test)]
mod testing;
