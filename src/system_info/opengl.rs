//! `glxinfo` parsing

use serde::Serialize;

const VENDOR_PREFIX: &str = "OpenGL vendor string";
const RENDERER_PREFIX: &str = "OpenGL renderer string";
const VERSION_PREFIX: &str = "OpenGL version string";

/// OpenGL version as reported by the driver
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpenGLVersion {
    /// Raw version string, e.g. `4.6.0 NVIDIA 535.129.03`
    pub string: String,
    pub major: Option<u32>,
    pub minor: Option<u32>,
}

impl OpenGLVersion {
    /// Parses a version string with the single-digit heuristic.
    ///
    /// `major` is the character right before the first `.`, `minor` the
    /// character right before the next `.` after it. Two-digit components
    /// (e.g. `10.2`) are misparsed; this is a known limitation.
    ///
    /// Returns the version (with `major`/`minor` left empty) together with
    /// the reason when the heuristic fails.
    pub fn parse(version: &str) -> (Self, Option<String>) {
        match parse_major_minor(version) {
            Ok((major, minor)) => (
                Self {
                    string: version.to_string(),
                    major: Some(major),
                    minor: Some(minor),
                },
                None,
            ),
            Err(reason) => (
                Self {
                    string: version.to_string(),
                    major: None,
                    minor: None,
                },
                Some(format!(
                    "Failed to parse OpenGL version '{version}': {reason}"
                )),
            ),
        }
    }

    /// Returns `(major, minor)` when both components were parsed
    pub fn pair(&self) -> Option<(u32, u32)> {
        Some((self.major?, self.minor?))
    }
}

fn parse_major_minor(version: &str) -> Result<(u32, u32), String> {
    let first_dot = version.find('.').ok_or("no '.' found")?;
    let major = digit_before(version, first_dot).ok_or("no major digit before first '.'")?;

    let second_dot = version[first_dot + 1..]
        .find('.')
        .map(|offset| first_dot + 1 + offset)
        .ok_or("no second '.' found")?;
    let minor = digit_before(version, second_dot).ok_or("no minor digit before second '.'")?;

    Ok((major, minor))
}

fn digit_before(s: &str, index: usize) -> Option<u32> {
    s[..index].chars().next_back()?.to_digit(10)
}

/// Vendor, renderer and version reported by `glxinfo`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenGLInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: OpenGLVersion,
}

impl OpenGLInfo {
    /// True when the renderer is Mesa's software rasterizer
    pub fn is_software_renderer(&self) -> bool {
        let renderer = self.renderer.to_lowercase();
        renderer.contains("llvmpipe") || renderer.contains("softpipe")
    }
}

/// Result of scanning `glxinfo` output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedGlxInfo {
    pub info: OpenGLInfo,
    /// Set when the version string did not yield major/minor
    pub version_error: Option<String>,
}

/// Scans `glxinfo` output for the vendor, renderer and version lines.
///
/// Values are the text after the first colon, trimmed. All three lines
/// must be present.
pub fn parse_glxinfo(output: &str) -> Result<ParsedGlxInfo, String> {
    let mut vendor = None;
    let mut renderer = None;
    let mut version = None;

    for line in output.lines() {
        let line = line.trim_start();
        let slot = if line.starts_with(VENDOR_PREFIX) {
            &mut vendor
        } else if line.starts_with(RENDERER_PREFIX) {
            &mut renderer
        } else if line.starts_with(VERSION_PREFIX) {
            &mut version
        } else {
            continue;
        };

        if let Some((_, value)) = line.split_once(':') {
            *slot = Some(value.trim().to_string());
        }
    }

    let missing: Vec<&str> = [
        (VENDOR_PREFIX, vendor.is_none()),
        (RENDERER_PREFIX, renderer.is_none()),
        (VERSION_PREFIX, version.is_none()),
    ]
    .into_iter()
    .filter_map(|(prefix, absent)| absent.then_some(prefix))
    .collect();

    match (vendor, renderer, version) {
        (Some(vendor), Some(renderer), Some(version)) => {
            let (version, version_error) = OpenGLVersion::parse(&version);
            Ok(ParsedGlxInfo {
                info: OpenGLInfo {
                    vendor,
                    renderer,
                    version,
                },
                version_error,
            })
        }
        _ => Err(format!(
            "glxinfo output is missing: {}",
            missing.join(", ")
        )),
    }
}
