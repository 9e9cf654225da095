//! OpenGL runtime info check

use crate::health::check::{Findings, SystemCheck};
use crate::health::context::CheckContext;
use crate::system_info::GLXINFO;

const GLXINFO_INSTALL_HINT: &str =
    "glxinfo not found. Install it with 'sudo apt install mesa-utils'";

/// Collects `glxinfo` and checks renderer and version
pub struct OpenGLInfoCheck;

impl OpenGLInfoCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for OpenGLInfoCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for OpenGLInfoCheck {
    fn name(&self) -> &'static str {
        "Checking OpenGL info"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Validates the OpenGL vendor, renderer and version reported by glxinfo")
    }

    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings {
        let mut findings = Findings::new();

        if ctx.commands.locate(GLXINFO).is_none() {
            findings.fail(GLXINFO_INSTALL_HINT);
            return findings;
        }

        ctx.info.collect_opengl_info(ctx.errors, ctx.commands);

        let Some(gl) = &ctx.info.opengl_info else {
            findings.fail(
                ctx.errors
                    .opengl_info_parse_error
                    .clone()
                    .unwrap_or_else(|| "Failed to parse OpenGL info".to_string()),
            );
            return findings;
        };

        if gl.is_software_renderer() {
            findings.warn(format!("Software renderer detected: '{}'", gl.renderer));
        }

        match gl.version.pair() {
            None => findings.fail(
                ctx.errors
                    .opengl_version_parse_error
                    .clone()
                    .unwrap_or_else(|| "Failed to parse OpenGL version".to_string()),
            ),
            Some((major, minor)) if ctx.settings.min_gl.is_too_low(major, minor) => {
                findings.fail(format!(
                    "OpenGL version too low: {}.{} ({})",
                    major, minor, gl.version.string
                ))
            }
            Some(_) => {}
        }

        findings
    }
}
