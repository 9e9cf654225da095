//! `lspci -k` parsing

use std::collections::HashMap;

use serde::Serialize;

/// One PCI display device as reported by `lspci -k`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GpuInfo {
    /// The device line, e.g. `01:00.0 VGA compatible controller: NVIDIA ...`
    pub description: Option<String>,
    /// Vendor/device subsystem string
    pub subsystem: Option<String>,
    /// Kernel driver currently bound to the device
    pub kernel_module_in_use: Option<String>,
    /// Kernel modules able to drive the device, in reported order
    pub kernel_modules: Vec<String>,
}

impl GpuInfo {
    /// Builds a GPU record from one device block.
    ///
    /// The first line is the description, the remaining `key: value` lines
    /// fill the other fields. Later duplicate keys win.
    pub fn from_lspci_block(lines: &[&str]) -> Self {
        let Some((first, rest)) = lines.split_first() else {
            return Self::default();
        };

        let fields: HashMap<&str, &str> = rest
            .iter()
            .filter_map(|line| line.split_once(':'))
            .map(|(key, value)| (key.trim(), value.trim()))
            .collect();

        let kernel_modules = fields
            .get("Kernel modules")
            .map(|modules| {
                modules
                    .split(',')
                    .map(str::trim)
                    .filter(|m| !m.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            description: Some(first.trim().to_string()),
            subsystem: fields.get("Subsystem").map(|s| s.to_string()),
            kernel_module_in_use: fields.get("Kernel driver in use").map(|s| s.to_string()),
            kernel_modules,
        }
    }

    /// Name used in messages, falling back to `[unknown]`
    pub fn display_name(&self) -> &str {
        self.subsystem.as_deref().unwrap_or("[unknown]")
    }
}

/// Splits `lspci -k` output into device blocks.
///
/// A new block starts at every non-empty line without leading whitespace;
/// everything else belongs to the current block.
pub fn split_blocks(output: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in output.lines() {
        let starts_block = !line.is_empty() && !line.starts_with(char::is_whitespace);
        if starts_block && !current.is_empty() {
            blocks.push(std::mem::take(&mut current));
        }
        current.push(line);
    }

    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
}

/// A block is a GPU block iff any of its lines mentions "VGA" or "3D"
pub fn is_gpu_block(block: &[&str]) -> bool {
    block
        .iter()
        .any(|line| line.contains("VGA") || line.contains("3D"))
}

/// Extracts every GPU from `lspci -k` output, in device order
pub fn parse_lspci(output: &str) -> Vec<GpuInfo> {
    split_blocks(output)
        .iter()
        .filter(|block| is_gpu_block(block))
        .map(|block| GpuInfo::from_lspci_block(block))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LSPCI_OUTPUT: &str = "\
00:00.0 Host bridge: Intel Corporation 8th Gen Core Processor Host Bridge/DRAM Registers (rev 07)
\tSubsystem: Dell Device 0869
\tKernel driver in use: skl_uncore
00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 630 (Mobile)
\tSubsystem: Dell UHD Graphics 630 (Mobile)
\tKernel driver in use: i915
\tKernel modules: i915
00:14.0 USB controller: Intel Corporation Cannon Lake PCH USB 3.1 xHCI Host Controller (rev 10)
\tSubsystem: Dell Device 0869
\tKernel driver in use: xhci_hcd
01:00.0 3D controller: NVIDIA Corporation TU117M [GeForce GTX 1650 Mobile / Max-Q] (rev a1)
\tSubsystem: Dell TU117M [GeForce GTX 1650 Mobile / Max-Q]
\tKernel driver in use: nvidia
\tKernel modules: nouveau, nvidia_drm, nvidia
";

    #[test]
    fn test_only_gpu_blocks_are_kept() {
        let gpus = parse_lspci(LSPCI_OUTPUT);
        assert_eq!(gpus.len(), 2);
        assert!(gpus.iter().all(|gpu| gpu.description.is_some()));

        assert_eq!(gpus[0].kernel_module_in_use.as_deref(), Some("i915"));
        assert_eq!(
            gpus[0].subsystem.as_deref(),
            Some("Dell UHD Graphics 630 (Mobile)")
        );
        assert_eq!(
            gpus[1].kernel_modules,
            vec!["nouveau", "nvidia_drm", "nvidia"]
        );
    }

    #[test]
    fn test_driver_and_modules_from_block() {
        let output = "00:02.0 VGA compatible controller...\n\tKernel driver in use: nvidia\n\tKernel modules: nvidia,nouveau";
        let gpus = parse_lspci(output);

        assert_eq!(gpus.len(), 1);
        assert_eq!(gpus[0].kernel_module_in_use.as_deref(), Some("nvidia"));
        assert_eq!(gpus[0].kernel_modules, vec!["nvidia", "nouveau"]);
        assert_eq!(gpus[0].subsystem, None);
        assert_eq!(
            gpus[0].description.as_deref(),
            Some("00:02.0 VGA compatible controller...")
        );
    }

    #[test]
    fn test_empty_module_entries_are_dropped() {
        let block = ["00:02.0 VGA x", "\tKernel modules: ,i915,, xe ,"];
        let gpu = GpuInfo::from_lspci_block(&block);
        assert_eq!(gpu.kernel_modules, vec!["i915", "xe"]);
        assert_eq!(gpu.kernel_module_in_use, None);
    }

    #[test]
    fn test_blank_lines_stay_in_current_block() {
        let blocks = split_blocks("a\n\tb\n\nc\n\td");
        assert_eq!(blocks, vec![vec!["a", "\tb", ""], vec!["c", "\td"]]);
    }

    #[test]
    fn test_no_gpu_blocks() {
        let output = "00:14.0 USB controller: Intel\n\tKernel driver in use: xhci_hcd";
        assert!(parse_lspci(output).is_empty());
        assert!(parse_lspci("").is_empty());
    }

    #[test]
    fn test_display_name_fallback() {
        let gpu = GpuInfo::default();
        assert_eq!(gpu.display_name(), "[unknown]");
    }
}
