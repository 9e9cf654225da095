use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error, info, warn};

use gfx_health_check::build_info;
use gfx_health_check::cli::Cli;
use gfx_health_check::command::SystemCommandRunner;
use gfx_health_check::config::AppConfig;
use gfx_health_check::health;
use gfx_health_check::logging::{self, SessionLog};
use gfx_health_check::native::library::{BUILD_HINT, resolve_library_path};
use gfx_health_check::native::NativeLibrary;
use gfx_health_check::report::WorkDir;

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            error!(error = ?e, "Health check aborted");
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let session_log = SessionLog::create()?;
    logging::init(&session_log)?;

    let cli = Cli::parse();
    debug!("Build info:\n{}", build_info::detailed_info());

    let config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using default configuration");
        AppConfig::default()
    });
    info!(?config, "Configuration loaded");

    let work_dir = WorkDir::prepare(&cli.temp_dir(), &config.report.dir_name)
        .context("Cannot create working directory")?;

    let commands =
        SystemCommandRunner::new(config.command_timeout()).with_transcript_dir(work_dir.commands_dir());

    let library_path = resolve_library_path(&config.native.library_path);
    let mut gl = match NativeLibrary::load(&library_path) {
        Ok(gl) => gl,
        Err(e) => {
            error!(error = %e, "Native helper library unavailable");
            eprintln!("{e}");
            eprintln!("{BUILD_HINT}");
            return Ok(ExitCode::from(1));
        }
    };
    info!(path = %gl.path().display(), "Native helper library loaded");

    let diagnostics =
        health::run_diagnostics(&commands, &mut gl, config.check_settings(), true);
    health::print_report(&diagnostics.report);

    if !cli.no_report {
        work_dir.write_system_info(&diagnostics.info, &diagnostics.errors)?;
        work_dir.copy_log(session_log.path(), &config.report.log_name)?;
        let archive = work_dir.archive(&cli.report_dir().join(&config.report.archive_name))?;
        println!("report path: {}", archive.display());
    }

    if cli.no_clear {
        println!("working directory kept: {}", work_dir.path().display());
    } else {
        work_dir.clear()?;
    }

    Ok(ExitCode::from(diagnostics.report.exit_code() as u8))
}
