//! Fakes shared by unit tests

use std::collections::HashMap;
use std::path::PathBuf;

use crate::command::{CommandError, CommandRunner};
use crate::native::{GlBackend, NativeError};

/// Canned command results keyed by program name
#[derive(Default)]
pub struct ScriptedCommands {
    outputs: HashMap<String, Result<String, String>>,
    installed: Vec<String>,
}

impl ScriptedCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn output(mut self, program: &str, stdout: &str) -> Self {
        self.outputs
            .insert(program.to_string(), Ok(stdout.to_string()));
        self.installed.push(program.to_string());
        self
    }

    pub fn failure(mut self, program: &str, stderr: &str) -> Self {
        self.outputs
            .insert(program.to_string(), Err(stderr.to_string()));
        self.installed.push(program.to_string());
        self
    }
}

impl CommandRunner for ScriptedCommands {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        let command = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
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
        self.installed
            .iter()
            .any(|p| p == program)
            .then(|| PathBuf::from("/usr/bin").join(program))
    }
}

/// Counts helper calls and injects failures
pub struct FakeGl {
    pub version: (i32, i32),
    pub created: usize,
    pub destroyed: usize,
    pub loaded: usize,
    pub basic_calls: usize,
    create_error: Option<String>,
    load_error: Option<String>,
    basic_calls_error: Option<String>,
    destroy_error: Option<String>,
}

impl FakeGl {
    pub fn new() -> Self {
        Self {
            version: (4, 6),
            created: 0,
            destroyed: 0,
            loaded: 0,
            basic_calls: 0,
            create_error: None,
            load_error: None,
            basic_calls_error: None,
            destroy_error: None,
        }
    }

    pub fn with_version(mut self, major: i32, minor: i32) -> Self {
        self.version = (major, minor);
        self
    }

    pub fn fail_create(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn fail_load(mut self, message: &str) -> Self {
        self.load_error = Some(message.to_string());
        self
    }

    pub fn fail_basic_calls(mut self, message: &str) -> Self {
        self.basic_calls_error = Some(message.to_string());
        self
    }

    pub fn fail_destroy(mut self, message: &str) -> Self {
        self.destroy_error = Some(message.to_string());
        self
    }

    /// Contexts created but not yet destroyed
    pub fn open_contexts(&self) -> usize {
        self.created - self.destroyed
    }
}

fn outcome(error: &Option<String>) -> Result<(), NativeError> {
    match error {
        Some(message) => Err(NativeError::new(1, message.clone())),
        None => Ok(()),
    }
}

impl GlBackend for FakeGl {
    fn create_context(&mut self, _width: i32, _height: i32) -> Result<(), NativeError> {
        assert_eq!(self.open_contexts(), 0, "context already open");
        outcome(&self.create_error)?;
        self.created += 1;
        Ok(())
    }

    fn load_functions(&mut self) -> Result<(), NativeError> {
        self.loaded += 1;
        outcome(&self.load_error)
    }

    fn loaded_version(&mut self) -> (i32, i32) {
        self.version
    }

    fn loaded_version_string(&mut self) -> Option<String> {
        Some(format!("{}.{}.0 Fake", self.version.0, self.version.1))
    }

    fn test_basic_calls(&mut self) -> Result<(), NativeError> {
        self.basic_calls += 1;
        outcome(&self.basic_calls_error)
    }

    fn destroy_context(&mut self) -> Result<(), NativeError> {
        self.destroyed += 1;
        outcome(&self.destroy_error)
    }
}
