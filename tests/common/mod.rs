//! Scripted host environment for engine-level tests

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use gfx_health_check::command::{CommandError, CommandRunner};
use gfx_health_check::native::{GlBackend, NativeError};

pub const LSPCI_NVIDIA: &str = "\
00:00.0 Host bridge: Intel Corporation Device 4660 (rev 02)
\tSubsystem: Micro-Star International Co., Ltd. [MSI] Device 7d25
00:02.0 VGA compatible controller: Intel Corporation AlderLake-S GT1 (rev 0c)
\tSubsystem: Micro-Star International Co., Ltd. [MSI] AlderLake-S GT1
\tKernel driver in use: i915
\tKernel modules: i915
01:00.0 VGA compatible controller: NVIDIA Corporation GA106 [GeForce RTX 3060 Lite Hash Rate] (rev a1)
\tSubsystem: ASUSTeK Computer Inc. GA106 [GeForce RTX 3060 Lite Hash Rate]
\tKernel driver in use: nvidia
\tKernel modules: nouveau, nvidia_drm, nvidia
01:00.1 Audio device: NVIDIA Corporation GA106 High Definition Audio Controller (rev a1)
\tSubsystem: ASUSTeK Computer Inc. Device 87f3
\tKernel driver in use: snd_hda_intel
";

pub const LSPCI_NO_GPU: &str = "\
00:00.0 Host bridge: Intel Corporation Device 4660 (rev 02)
00:14.0 USB controller: Intel Corporation Alder Lake-S PCH USB 3.2 Gen 2x2 XHCI Controller (rev 11)
\tKernel driver in use: xhci_hcd
";

pub const GLXINFO_NVIDIA: &str = "\
name of display: :1
display: :1  screen: 0
direct rendering: Yes
OpenGL vendor string: NVIDIA Corporation
OpenGL renderer string: NVIDIA GeForce RTX 3060/PCIe/SSE2
OpenGL core profile version string: 4.6.0 NVIDIA 535.129.03
OpenGL version string: 4.6.0 NVIDIA 535.129.03
";

/// Command runner answering from a table and recording every call
#[derive(Default)]
pub struct FakeHost {
    outputs: HashMap<&'static str, Result<String, String>>,
    pub calls: RefCell<Vec<String>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn healthy() -> Self {
        Self::new()
            .with("uname", "Linux 6.5.0-21-generic x86_64")
            .with("lspci", LSPCI_NVIDIA)
            .with("glxinfo", GLXINFO_NVIDIA)
    }

    pub fn with(mut self, program: &'static str, stdout: &str) -> Self {
        self.outputs.insert(program, Ok(stdout.to_string()));
        self
    }

    pub fn failing(mut self, program: &'static str, stderr: &str) -> Self {
        self.outputs.insert(program, Err(stderr.to_string()));
        self
    }

    pub fn without(mut self, program: &'static str) -> Self {
        self.outputs.remove(program);
        self
    }

    pub fn was_called(&self, program: &str) -> bool {
        self.calls.borrow().iter().any(|c| c.split(' ').next() == Some(program))
    }
}

impl CommandRunner for FakeHost {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.borrow_mut().push(command.clone());

        match self.outputs.get(program) {
            Some(Ok(stdout)) => Ok(stdout.trim().to_string()),
            Some(Err(stderr)) => Err(CommandError::Failed {
                command,
                exit_code: Some(1),
                stderr: stderr.clone(),
            }),
            None => Err(CommandError::Spawn {
                command,
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            }),
        }
    }

    fn locate(&self, program: &str) -> Option<PathBuf> {
        self.outputs
            .contains_key(program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

/// Helper library double with failure injection and call accounting
pub struct FakeGl {
    pub version: (i32, i32),
    pub fail_create: Option<&'static str>,
    pub fail_load: Option<&'static str>,
    pub fail_basic_calls: Option<&'static str>,
    pub created: usize,
    pub destroyed: usize,
    pub max_open: usize,
    pub log: Vec<&'static str>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            version: (4, 6),
            fail_create: None,
            fail_load: None,
            fail_basic_calls: None,
            created: 0,
            destroyed: 0,
            max_open: 0,
            log: Vec::new(),
        }
    }

    fn open(&self) -> usize {
        self.created - self.destroyed
    }
}

fn result(error: Option<&'static str>) -> Result<(), NativeError> {
    match error {
        Some(message) => Err(NativeError::new(1, message)),
        None => Ok(()),
    }
}

impl GlBackend for FakeGl {
    fn create_context(&mut self, _width: i32, _height: i32) -> Result<(), NativeError> {
        self.log.push("create");
        result(self.fail_create)?;
        self.created += 1;
        self.max_open = self.max_open.max(self.open());
        Ok(())
    }

    fn load_functions(&mut self) -> Result<(), NativeError> {
        self.log.push("load");
        result(self.fail_load)
    }

    fn loaded_version(&mut self) -> (i32, i32) {
        self.log.push("version");
        self.version
    }

    fn test_basic_calls(&mut self) -> Result<(), NativeError> {
        self.log.push("test");
        result(self.fail_basic_calls)
    }

    fn destroy_context(&mut self) -> Result<(), NativeError> {
        self.log.push("destroy");
        self.destroyed += 1;
        Ok(())
    }
}
