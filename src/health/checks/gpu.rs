//! GPU presence check

use crate::health::check::{Findings, SystemCheck};
use crate::health::context::CheckContext;

/// Collects `lspci -k` and checks that every GPU has a bound driver
pub struct GpuPresenceCheck;

impl GpuPresenceCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GpuPresenceCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for GpuPresenceCheck {
    fn name(&self) -> &'static str {
        "Checking GPU"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Detects GPUs and the kernel driver bound to each")
    }

    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings {
        let mut findings = Findings::new();
        ctx.info.collect_gpu_info(ctx.errors, ctx.commands);

        let gpus = match ctx.info.gpus.as_deref() {
            Some(gpus) if !gpus.is_empty() => gpus,
            _ => {
                findings.fail(
                    ctx.errors
                        .gpu_info_parse_error
                        .clone()
                        .unwrap_or_else(|| "No GPUs detected".to_string()),
                );
                return findings;
            }
        };

        for gpu in gpus {
            if gpu.description.is_none() || gpu.subsystem.is_none() {
                findings.fail("GPU info incomplete: description or subsystem missing");
            }

            if gpu.kernel_module_in_use.is_none() {
                findings.fail(format!(
                    "Driver info missing for GPU '{}'",
                    gpu.display_name()
                ));
            }
        }

        findings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::health::check::CheckStatus;
    use crate::health::checks::tests::Harness;

    #[test]
    fn test_complete_gpu_passes() {
        let mut harness = Harness::new().command(
            "lspci",
            "00:02.0 VGA compatible controller: Intel UHD 630\n\tSubsystem: Dell UHD 630\n\tKernel driver in use: i915\n\tKernel modules: i915",
        );
        let findings = harness.run(&GpuPresenceCheck::new());
        assert_eq!(findings.status(), CheckStatus::Ok);
        assert_eq!(harness.info.gpus.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn test_no_gpus() {
        let mut harness = Harness::new().command("lspci", "00:14.0 USB controller: Intel");
        let findings = harness.run(&GpuPresenceCheck::new());
        assert_eq!(findings.messages().len(), 1);
        assert_eq!(findings.messages()[0].text, "No GPUs detected");
    }

    #[test]
    fn test_command_failure_reports_recorded_error() {
        let mut harness = Harness::new().failing_command("lspci", "lspci: cannot access /proc");
        let findings = harness.run(&GpuPresenceCheck::new());
        assert_eq!(findings.status(), CheckStatus::Fail);
        assert!(findings.messages()[0].text.contains("lspci: cannot access /proc"));
    }

    #[test]
    fn test_missing_subsystem_and_driver() {
        let mut harness =
            Harness::new().command("lspci", "01:00.0 3D controller: NVIDIA Corporation TU117M");
        let findings = harness.run(&GpuPresenceCheck::new());

        let texts: Vec<&str> = findings.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(
            texts,
            [
                "GPU info incomplete: description or subsystem missing",
                "Driver info missing for GPU '[unknown]'",
            ]
        );
    }
}
