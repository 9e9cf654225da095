//! Inputs shared by every check of a run

use crate::command::CommandRunner;
use crate::native::GlBackend;
use crate::system_info::{ErrorContext, SystemInfo};

/// Minimum supported OpenGL version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlThreshold {
    pub major: u32,
    pub minor: u32,
}

impl GlThreshold {
    /// The "version too low" rule.
    ///
    /// Compares both components independently (`major < 4 && minor < 3` for
    /// the default 4.3), not lexicographically: 3.9 passes and 3.2 fails.
    /// Kept as deployed until the intended rule is confirmed.
    pub fn is_too_low(&self, major: u32, minor: u32) -> bool {
        major < self.major && minor < self.minor
    }
}

impl Default for GlThreshold {
    fn default() -> Self {
        Self { major: 4, minor: 3 }
    }
}

/// Tunables consumed by the checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckSettings {
    pub min_gl: GlThreshold,
    /// Size of the off-screen probe surface
    pub context_size: (i32, i32),
}

impl Default for CheckSettings {
    fn default() -> Self {
        Self {
            min_gl: GlThreshold::default(),
            context_size: (1, 1),
        }
    }
}

/// Everything a check may read or drive.
///
/// `info` and `errors` belong to the current run only. The GL backend is
/// borrowed exclusively, so checks can only open contexts one at a time.
pub struct CheckContext<'a> {
    pub info: &'a mut SystemInfo,
    pub errors: &'a mut ErrorContext,
    pub commands: &'a dyn CommandRunner,
    pub gl: &'a mut dyn GlBackend,
    pub settings: CheckSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_matches_deployed_rule() {
        let threshold = GlThreshold::default();
        assert!(threshold.is_too_low(3, 2));
        assert!(!threshold.is_too_low(4, 6));
        assert!(!threshold.is_too_low(4, 0));
        // Asymmetries of the component-wise rule
        assert!(!threshold.is_too_low(3, 9));
        assert!(!threshold.is_too_low(5, 0));
    }
}
