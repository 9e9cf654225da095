//! Working directory and report archive

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::build_info;
use crate::system_info::{ErrorContext, SystemInfo};

/// Name of the serialized system snapshot inside the working directory
pub const SYSTEM_INFO_FILE: &str = "system_info.json";

/// Subdirectory receiving external command transcripts
pub const COMMANDS_DIR: &str = "commands";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to prepare working directory '{}': {source}", path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to serialize system info: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to create archive '{}': {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("Failed to read '{}' while archiving: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

#[derive(Serialize)]
struct Snapshot<'a> {
    collected_at: String,
    build: String,
    system: &'a SystemInfo,
    errors: &'a ErrorContext,
}

/// Per-run directory that is archived into the report
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
}

impl WorkDir {
    /// Recreates `<parent>/<name>` from scratch
    pub fn prepare(parent: &Path, name: &str) -> Result<Self, ReportError> {
        let path = parent.join(name);
        let prepare = |source| ReportError::Prepare {
            path: path.clone(),
            source,
        };

        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(prepare)?;
        } else if path.exists() {
            fs::remove_file(&path).map_err(prepare)?;
        }
        fs::create_dir_all(path.join(COMMANDS_DIR)).map_err(prepare)?;

        debug!(path = %path.display(), "Prepared working directory");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory for command transcripts
    pub fn commands_dir(&self) -> PathBuf {
        self.path.join(COMMANDS_DIR)
    }

    /// Writes the collected system model as JSON
    pub fn write_system_info(
        &self,
        info: &SystemInfo,
        errors: &ErrorContext,
    ) -> Result<PathBuf, ReportError> {
        let snapshot = Snapshot {
            collected_at: chrono::Local::now().to_rfc3339(),
            build: build_info::version_string(),
            system: info,
            errors,
        };
        let path = self.path.join(SYSTEM_INFO_FILE);
        let json = serde_json::to_string_pretty(&snapshot)?;
        fs::write(&path, json).map_err(|source| ReportError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }

    /// Copies the session log into the working directory
    pub fn copy_log(&self, log: &Path, name: &str) -> Result<PathBuf, ReportError> {
        let dest = self.path.join(name);
        fs::copy(log, &dest).map_err(|source| ReportError::Write {
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    /// Zips the working directory into `dest`
    pub fn archive(&self, dest: &Path) -> Result<PathBuf, ReportError> {
        let archive_error = |source| ReportError::Archive {
            path: dest.to_path_buf(),
            source,
        };

        let file = File::create(dest).map_err(|source| ReportError::Write {
            path: dest.to_path_buf(),
            source,
        })?;
        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        let root_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for entry in WalkDir::new(&self.path).sort_by_file_name() {
            let entry = entry.map_err(|source| ReportError::Walk {
                path: self.path.clone(),
                source,
            })?;
            let relative = entry
                .path()
                .strip_prefix(&self.path)
                .unwrap_or(entry.path());
            let name = Path::new(&root_name)
                .join(relative)
                .to_string_lossy()
                .replace('\\', "/");

            if entry.file_type().is_dir() {
                zip.add_directory(name, options).map_err(archive_error)?;
            } else {
                zip.start_file(name, options).map_err(archive_error)?;
                let mut source = File::open(entry.path()).map_err(|source| ReportError::Write {
                    path: entry.path().to_path_buf(),
                    source,
                })?;
                io::copy(&mut source, &mut zip).map_err(|source| ReportError::Write {
                    path: dest.to_path_buf(),
                    source,
                })?;
            }
        }

        zip.finish().map_err(archive_error)?;
        info!(path = %dest.display(), "Report archive created");
        Ok(dest.to_path_buf())
    }

    /// Removes the working directory
    pub fn clear(self) -> Result<(), ReportError> {
        fs::remove_dir_all(&self.path).map_err(|source| ReportError::Prepare {
            path: self.path.clone(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use super::*;
    use crate::system_info::GpuInfo;

    #[test]
    fn test_prepare_recreates_directory() {
        let parent = tempfile::tempdir().unwrap();
        let stale = parent.path().join("gfx-health-report");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("old.txt"), "stale").unwrap();

        let work = WorkDir::prepare(parent.path(), "gfx-health-report").unwrap();

        assert!(!work.path().join("old.txt").exists());
        assert!(work.commands_dir().is_dir());
    }

    #[test]
    fn test_system_info_snapshot() {
        let parent = tempfile::tempdir().unwrap();
        let work = WorkDir::prepare(parent.path(), "report").unwrap();

        let info = SystemInfo {
            gpus: Some(vec![GpuInfo {
                description: Some("00:02.0 VGA compatible controller: Intel".to_string()),
                ..GpuInfo::default()
            }]),
            ..SystemInfo::default()
        };
        let mut errors = ErrorContext::new();
        errors.record_opengl_info_parse_error("glxinfo missing");

        let path = work.write_system_info(&info, &errors).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(
            json["system"]["gpus"][0]["description"],
            "00:02.0 VGA compatible controller: Intel"
        );
        assert_eq!(json["errors"]["opengl_info_parse_error"], "glxinfo missing");
        assert!(json["system"]["opengl_info"].is_null());
    }

    #[test]
    fn test_archive_contains_log_and_transcripts() {
        let parent = tempfile::tempdir().unwrap();
        let work = WorkDir::prepare(parent.path(), "gfx-health-report").unwrap();

        let log = parent.path().join("ghc_session.log");
        fs::write(&log, "INFO Running check").unwrap();
        work.copy_log(&log, "gfx_health.log").unwrap();
        fs::write(work.commands_dir().join("lspci.log"), "lspci -k").unwrap();

        let dest = parent.path().join("gfx_health_report.zip");
        work.archive(&dest).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&dest).unwrap()).unwrap();
        let mut contents = String::new();
        archive
            .by_name("gfx-health-report/gfx_health.log")
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert_eq!(contents, "INFO Running check");
        assert!(archive.by_name("gfx-health-report/commands/lspci.log").is_ok());

        work.clear().unwrap();
        assert!(!parent.path().join("gfx-health-report").exists());
    }
}
