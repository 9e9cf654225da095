//! Diagnostic check engine
//!
//! Runs a fixed sequence of checks against the host's graphics stack. Each
//! check reads the collected [`SystemInfo`] and [`ErrorContext`], may drive
//! the native GL helper, and produces a status plus fail/warn messages.
//!
//! # Example
//!
//! ```no_run
//! use gfx_health_check::command::SystemCommandRunner;
//! use gfx_health_check::health::{self, CheckSettings};
//! use gfx_health_check::native::NativeLibrary;
//!
//! let commands = SystemCommandRunner::default();
//! let mut gl = NativeLibrary::load("bin/libGfxHealthCheck.so").unwrap();
//! let run = health::run_diagnostics(&commands, &mut gl, CheckSettings::default(), true);
//!
//! if run.report.is_healthy() {
//!     println!("Graphics stack looks fine");
//! }
//! ```

pub mod check;
pub mod checks;
pub mod context;
pub mod reporter;
pub mod runner;

use tracing::{info, warn};

use crate::command::CommandRunner;
use crate::native::GlBackend;
use crate::system_info::{ErrorContext, SystemInfo};

pub use check::{CheckMessage, CheckResult, CheckStatus, Findings, MessageKind, SystemCheck};
pub use context::{CheckContext, CheckSettings, GlThreshold};
pub use reporter::{format_report, format_summary, print_report};
pub use runner::{HealthCheckReport, HealthCheckRunner};

/// Everything produced by one diagnostic run
#[derive(Debug)]
pub struct DiagnosticRun {
    pub info: SystemInfo,
    pub errors: ErrorContext,
    pub report: HealthCheckReport,
}

/// The six checks, in required execution order
pub fn default_runner() -> HealthCheckRunner {
    HealthCheckRunner::new()
        .add_check(checks::GpuPresenceCheck::new())
        .add_check(checks::DriverCompatibilityCheck::new())
        .add_check(checks::OpenGLInfoCheck::new())
        .add_check(checks::ContextCreationCheck::new())
        .add_check(checks::FunctionLoadingCheck::new())
        .add_check(checks::BasicCallsCheck::new())
}

/// Collects OS info and runs every default check
pub fn run_diagnostics(
    commands: &dyn CommandRunner,
    gl: &mut dyn GlBackend,
    settings: CheckSettings,
    show_progress: bool,
) -> DiagnosticRun {
    let mut info = SystemInfo::new();
    let mut errors = ErrorContext::new();

    info.collect_os_info(&mut errors, commands);
    match info.os_summary() {
        Some(os) => info!(%os, "Host"),
        None => warn!(error = ?errors.os_parse_error, "Host OS unknown"),
    }

    let report = {
        let mut ctx = CheckContext {
            info: &mut info,
            errors: &mut errors,
            commands,
            gl,
            settings,
        };
        default_runner().with_progress(show_progress).run(&mut ctx)
    };

    info!(
        overall = ?report.overall_status(),
        passed = report.passed,
        warned = report.warned,
        failed = report.failed,
        "Diagnostics finished"
    );

    DiagnosticRun {
        info,
        errors,
        report,
    }
}
