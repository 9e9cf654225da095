//! Runner for orchestrating checks

use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

use tracing::{error, info};

use super::check::{CheckResult, CheckStatus, Findings, SystemCheck};
use super::context::CheckContext;
use super::reporter;

/// Results from running a check suite
#[derive(Debug)]
pub struct HealthCheckReport {
    /// Individual check results, in execution order
    pub results: Vec<CheckResult>,
    /// Total number of checks run
    pub total: usize,
    /// Number of passing checks
    pub passed: usize,
    /// Number of checks with warnings
    pub warned: usize,
    /// Number of failing checks
    pub failed: usize,
}

impl HealthCheckReport {
    /// FAIL if any check failed, else WARNING if any warned, else OK
    pub fn overall_status(&self) -> CheckStatus {
        CheckStatus::overall(self.results.iter().map(|r| r.status))
    }

    /// Returns true if all checks passed (no failures)
    pub fn is_healthy(&self) -> bool {
        self.failed == 0
    }

    /// Returns true if there are any warnings
    pub fn has_warnings(&self) -> bool {
        self.warned > 0
    }

    /// Process exit code: 1 if any check failed, 0 otherwise
    pub fn exit_code(&self) -> i32 {
        if self.failed > 0 { 1 } else { 0 }
    }

    /// Looks up a result by label
    pub fn result(&self, label: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.label == label)
    }
}

/// Runs checks strictly one after another, in insertion order
pub struct HealthCheckRunner {
    checks: Vec<Box<dyn SystemCheck>>,
    show_progress: bool,
}

impl HealthCheckRunner {
    /// Creates a new runner with no checks
    pub fn new() -> Self {
        Self {
            checks: Vec::new(),
            show_progress: true,
        }
    }

    /// Adds a check to the runner
    pub fn add_check<C: SystemCheck + 'static>(mut self, check: C) -> Self {
        self.checks.push(Box::new(check));
        self
    }

    /// Enables or disables the progress lines on stdout
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Labels of the registered checks, in execution order
    pub fn labels(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    /// Runs all registered checks and returns a report.
    ///
    /// Every check runs exactly once. A panicking check is recorded as a
    /// failure and the run continues.
    pub fn run(self, ctx: &mut CheckContext<'_>) -> HealthCheckReport {
        let mut results: Vec<CheckResult> = self
            .checks
            .iter()
            .map(|check| CheckResult::pending(check.name()))
            .collect();

        for (check, result) in self.checks.iter().zip(results.iter_mut()) {
            if self.show_progress {
                reporter::print_started(check.name());
            }
            info!(check = check.name(), description = ?check.description(), "Running check");

            let start = Instant::now();
            let findings = panic::catch_unwind(AssertUnwindSafe(|| check.check(ctx)))
                .unwrap_or_else(|payload| {
                    let reason = panic_message(payload.as_ref());
                    error!(check = check.name(), %reason, "Check panicked");
                    let mut findings = Findings::new();
                    findings.fail(format!("Check aborted unexpectedly: {reason}"));
                    findings
                });
            result.complete(findings, start.elapsed());

            info!(
                check = result.label,
                status = ?result.status,
                messages = result.messages.len(),
                "Check finished"
            );
            if self.show_progress {
                reporter::print_done(result);
            }
        }

        let count = |status: CheckStatus| results.iter().filter(|r| r.status == status).count();
        let passed = count(CheckStatus::Ok);
        let warned = count(CheckStatus::Warning);
        let failed = count(CheckStatus::Fail);
        let total = results.len();

        HealthCheckReport {
            results,
            total,
            passed,
            warned,
            failed,
        }
    }
}

impl Default for HealthCheckRunner {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
