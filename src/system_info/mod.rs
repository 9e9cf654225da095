//! Typed model of the local graphics stack
//!
//! Collectors run external commands through a [`CommandRunner`] and fill
//! [`SystemInfo`] incrementally. They never fail: when a step yields no data
//! the reason is recorded in [`ErrorContext`] and the run continues.

pub mod error_context;
pub mod gpu;
pub mod opengl;
pub mod os;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::command::CommandRunner;

pub use error_context::ErrorContext;
pub use gpu::GpuInfo;
pub use opengl::{OpenGLInfo, OpenGLVersion};

/// Program probed for OpenGL runtime information
pub const GLXINFO: &str = "glxinfo";

/// Everything collected about the host during one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub os_name: Option<String>,
    pub os_version: Option<String>,
    pub arch: Option<String>,
    /// `None` until GPU collection succeeded
    pub gpus: Option<Vec<GpuInfo>>,
    pub opengl_info: Option<OpenGLInfo>,
}

impl SystemInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects kernel name, release and architecture from `uname -rms`
    pub fn collect_os_info(&mut self, errors: &mut ErrorContext, commands: &dyn CommandRunner) {
        let parsed = commands
            .run("uname", &["-rms"])
            .map_err(|e| e.to_string())
            .and_then(|output| os::parse_uname(&output));

        match parsed {
            Ok(os) => {
                info!(os.name = %os.name, os.version = %os.version, os.arch = %os.arch, "Collected OS info");
                self.os_name = Some(os.name);
                self.os_version = Some(os.version);
                self.arch = Some(os.arch);
            }
            Err(message) => {
                warn!(error = %message, "Failed to collect OS info");
                errors.record_os_parse_error(message);
            }
        }
    }

    /// Collects display devices from `lspci -k`
    pub fn collect_gpu_info(&mut self, errors: &mut ErrorContext, commands: &dyn CommandRunner) {
        match commands.run("lspci", &["-k"]) {
            Ok(output) => {
                let gpus = gpu::parse_lspci(&output);
                info!(count = gpus.len(), "Collected GPU info");
                for gpu in &gpus {
                    debug!(?gpu, "GPU");
                }
                self.gpus = Some(gpus);
            }
            Err(e) => {
                warn!(error = %e, "Failed to collect GPU info");
                errors.record_gpu_info_parse_error(e.to_string());
            }
        }
    }

    /// Collects vendor, renderer and version from `glxinfo`.
    ///
    /// Callers are expected to have checked that `glxinfo` is installed.
    pub fn collect_opengl_info(
        &mut self,
        errors: &mut ErrorContext,
        commands: &dyn CommandRunner,
    ) {
        let parsed = commands
            .run(GLXINFO, &[])
            .map_err(|e| e.to_string())
            .and_then(|output| opengl::parse_glxinfo(&output));

        match parsed {
            Ok(parsed) => {
                info!(
                    vendor = %parsed.info.vendor,
                    renderer = %parsed.info.renderer,
                    version = %parsed.info.version.string,
                    "Collected OpenGL info"
                );
                if let Some(message) = parsed.version_error {
                    warn!(error = %message, "Failed to parse OpenGL version");
                    errors.record_opengl_version_parse_error(message);
                }
                self.opengl_info = Some(parsed.info);
            }
            Err(message) => {
                warn!(error = %message, "Failed to collect OpenGL info");
                errors.record_opengl_info_parse_error(message);
            }
        }
    }

    /// One-line OS summary, e.g. `Linux 6.5.0 x86_64`
    pub fn os_summary(&self) -> Option<String> {
        Some(format!(
            "{} {} {}",
            self.os_name.as_deref()?,
            self.os_version.as_deref()?,
            self.arch.as_deref()?
        ))
    }
}
