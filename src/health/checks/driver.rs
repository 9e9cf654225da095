//! Kernel driver compatibility check

use tracing::debug;

use crate::health::check::{Findings, SystemCheck};
use crate::health::context::CheckContext;

/// Kernel modules able to drive NVIDIA hardware
const NVIDIA_MODULES: [&str; 2] = ["nvidia", "nouveau"];

/// Checks that NVIDIA GPUs are bound to the NVIDIA or nouveau driver
pub struct DriverCompatibilityCheck;

impl DriverCompatibilityCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DriverCompatibilityCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for DriverCompatibilityCheck {
    fn name(&self) -> &'static str {
        "Checking GPU drivers"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates the kernel driver bound to NVIDIA GPUs")
    }

    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings {
        let mut findings = Findings::new();

        let Some(gpus) = ctx.info.gpus.as_deref() else {
            debug!("No GPU info collected, skipping driver check");
            return findings;
        };

        for gpu in gpus {
            let is_nvidia = gpu
                .description
                .as_deref()
                .is_some_and(|d| d.contains("NVIDIA"));
            let module = gpu.kernel_module_in_use.as_deref();
            let supported = module.is_some_and(|m| NVIDIA_MODULES.contains(&m));

            if is_nvidia && !supported {
                findings.fail(format!(
                    "NVIDIA GPU '{}' uses unsupported driver '{}'",
                    gpu.display_name(),
                    module.unwrap_or("[none]")
                ));
            }
        }

        findings
    }
}
