//! Native GL context checks
//!
//! Each check opens its own context through [`GlSession`] and releases it
//! before returning, whatever happened in between.

use tracing::debug;

use crate::health::check::{Findings, SystemCheck};
use crate::health::context::CheckContext;
use crate::native::{GlSession, SessionError};

/// Separator between individual failures reported by the basic call battery
const BATTERY_SEPARATOR: char = '|';

fn open_session<'a>(
    ctx: &'a mut CheckContext<'_>,
    findings: &mut Findings,
) -> Option<GlSession<'a>> {
    let (width, height) = ctx.settings.context_size;
    match GlSession::create(&mut *ctx.gl, width, height) {
        Ok(session) => Some(session),
        Err(e) => {
            findings.fail(e.to_string());
            None
        }
    }
}

fn close_session(session: GlSession<'_>, findings: &mut Findings) {
    if let Err(e) = session.destroy() {
        findings.fail(e.to_string());
    }
}

/// Creates and immediately destroys an off-screen context
pub struct ContextCreationCheck;

impl ContextCreationCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ContextCreationCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for ContextCreationCheck {
    fn name(&self) -> &'static str {
        "Checking OpenGL context"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Creates and destroys an off-screen GLX context")
    }

    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings {
        let mut findings = Findings::new();
        if let Some(session) = open_session(ctx, &mut findings) {
            close_session(session, &mut findings);
        }
        findings
    }
}

/// Loads GL entry points and compares the loaded version with glxinfo
pub struct FunctionLoadingCheck;

impl FunctionLoadingCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FunctionLoadingCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for FunctionLoadingCheck {
    fn name(&self) -> &'static str {
        "Checking OpenGL functions loading"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Loads GL function pointers and validates the exposed version")
    }

    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings {
        let mut findings = Findings::new();
        let threshold = ctx.settings.min_gl;
        let reported = ctx.info.opengl_info.as_ref().map(|gl| gl.version.clone());

        let Some(mut session) = open_session(ctx, &mut findings) else {
            return findings;
        };

        if let Err(e) = session.load_functions() {
            findings.fail(e.to_string());
            close_session(session, &mut findings);
            return findings;
        }

        let (major, minor) = match session.loaded_version() {
            Ok(version) => version,
            Err(e) => {
                findings.fail(e.to_string());
                close_session(session, &mut findings);
                return findings;
            }
        };
        let loaded_string = session.loaded_version_string().unwrap_or_default();
        close_session(session, &mut findings);

        let (loaded_major, loaded_minor) = (
            u32::try_from(major).unwrap_or(0),
            u32::try_from(minor).unwrap_or(0),
        );
        if threshold.is_too_low(loaded_major, loaded_minor) {
            findings.fail(format!(
                "Loaded OpenGL version too low: {}.{}",
                major, minor
            ));
        }

        match reported {
            Some(reported) => match reported.pair() {
                Some(pair) if pair == (loaded_major, loaded_minor) => {}
                _ => findings.warn(format!(
                    "Loaded OpenGL version mismatch:\n\tloaded:  {}.{}  '{}'\n\tglxinfo: {}.{}  '{}'",
                    major,
                    minor,
                    loaded_string,
                    display_component(reported.major),
                    display_component(reported.minor),
                    reported.string
                )),
            },
            None => debug!("No glxinfo version to compare against"),
        }

        findings
    }
}

fn display_component(component: Option<u32>) -> String {
    component.map_or_else(|| "?".to_string(), |c| c.to_string())
}

/// Runs the helper's basic GL call battery
pub struct BasicCallsCheck;

impl BasicCallsCheck {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BasicCallsCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemCheck for BasicCallsCheck {
    fn name(&self) -> &'static str {
        "Checking OpenGL basic function calls"
    }

    fn description(&self) -> Option<&'static str> {
        Some("Exercises a fixed battery of basic GL calls")
    }

    fn check(&self, ctx: &mut CheckContext<'_>) -> Findings {
        let mut findings = Findings::new();

        let Some(mut session) = open_session(ctx, &mut findings) else {
            return findings;
        };

        match session.load_functions() {
            Ok(()) => match session.test_basic_calls() {
                Ok(()) => {}
                Err(SessionError::Native(e)) => {
                    e.message
                        .split(BATTERY_SEPARATOR)
                        .map(str::trim)
                        .filter(|failure| !failure.is_empty())
                        .for_each(|failure| findings.fail(failure));
                }
                Err(e) => findings.fail(e.to_string()),
            },
            Err(e) => findings.fail(e.to_string()),
        }

        close_session(session, &mut findings);
        findings
    }
}
