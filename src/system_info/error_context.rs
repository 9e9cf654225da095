//! Side channel for recoverable collection failures

use serde::Serialize;
use tracing::debug;

/// Records why a collection step produced no data.
///
/// Each slot is written at most once by its collector and later read by the
/// check that depends on it. A second write to a filled slot is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorContext {
    pub os_parse_error: Option<String>,
    pub gpu_info_parse_error: Option<String>,
    pub opengl_info_parse_error: Option<String>,
    pub opengl_version_parse_error: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_os_parse_error(&mut self, message: impl Into<String>) {
        set_once("os_parse_error", &mut self.os_parse_error, message.into());
    }

    pub fn record_gpu_info_parse_error(&mut self, message: impl Into<String>) {
        set_once(
            "gpu_info_parse_error",
            &mut self.gpu_info_parse_error,
            message.into(),
        );
    }

    pub fn record_opengl_info_parse_error(&mut self, message: impl Into<String>) {
        set_once(
            "opengl_info_parse_error",
            &mut self.opengl_info_parse_error,
            message.into(),
        );
    }

    pub fn record_opengl_version_parse_error(&mut self, message: impl Into<String>) {
        set_once(
            "opengl_version_parse_error",
            &mut self.opengl_version_parse_error,
            message.into(),
        );
    }

    /// Returns true if no collector has recorded a failure
    pub fn is_empty(&self) -> bool {
        self.os_parse_error.is_none()
            && self.gpu_info_parse_error.is_none()
            && self.opengl_info_parse_error.is_none()
            && self.opengl_version_parse_error.is_none()
    }
}

fn set_once(slot_name: &str, slot: &mut Option<String>, message: String) {
    if let Some(existing) = slot {
        debug!(slot = slot_name, %existing, ignored = %message, "Error slot already set");
        return;
    }
    debug!(slot = slot_name, %message, "Recorded collection error");
    *slot = Some(message);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_are_written_once() {
        let mut errors = ErrorContext::new();
        assert!(errors.is_empty());

        errors.record_gpu_info_parse_error("first");
        errors.record_gpu_info_parse_error("second");

        assert_eq!(errors.gpu_info_parse_error.as_deref(), Some("first"));
        assert!(!errors.is_empty());
        assert!(errors.os_parse_error.is_none());
    }
}
