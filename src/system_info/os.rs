//! `uname -rms` parsing

/// Kernel name, release and machine architecture
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsTriple {
    pub name: String,
    pub version: String,
    pub arch: String,
}

/// Parses `uname -rms` output, which must be exactly three tokens
pub fn parse_uname(output: &str) -> Result<OsTriple, String> {
    let parts: Vec<&str> = output.split_whitespace().collect();

    match parts.as_slice() {
        [name, version, arch] => Ok(OsTriple {
            name: name.to_string(),
            version: version.to_string(),
            arch: arch.to_string(),
        }),
        _ => Err(format!(
            "Unexpected uname output (expected 3 fields, got {}): '{}'",
            parts.len(),
            output.trim()
        )),
    }
}
