//! wss - version 0.1.0
//!
//! Entry point: parses arguments, loads configuration, sets up logging and
//! runs the sampler against the target process.

use anyhow::Context;
use clap::{CommandFactory, Parser};
use tracing::{info, Level};

use wss::cli::{Args, LogLevel};
use wss::config::{render_config, resolve_config, validate_effective_config, Config, RunConfig};
use wss::process::ProcTarget;
use wss::sampler::Sampler;
use wss::startup_checks;

/// Initializes tracing logging subsystem on stderr, keeping stdout for the table.
fn setup_logging(config: &Config) {
    let level = match config.log_level() {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    info!("Logging initialized with level: {:?}", config.log_level());
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match resolve_config(&args).and_then(|c| {
        validate_effective_config(&c)?;
        Ok(c)
    }) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ERROR: Configuration invalid: {}", e);
            std::process::exit(1);
        }
    };

    if args.check_config {
        println!("Configuration is valid");
        return Ok(());
    }
    if args.show_config {
        println!("{}", render_config(&config, args.config_format)?);
        return Ok(());
    }

    if args.wants_usage() {
        Args::command()
            .print_long_help()
            .context("printing usage")?;
        return Ok(());
    }

    let run = match RunConfig::from_args(&args) {
        Ok(run) => run,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    setup_logging(&config);
    if let Some(path) = &config.loaded_from {
        info!("Loaded configuration from: {}", path.display());
    }

    if let Err(e) = startup_checks::validate_target(config.proc_root(), run.pid) {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    let target = ProcTarget::new(config.proc_root(), run.pid, config.smaps_buffer_kb());
    let stdout = std::io::stdout().lock();

    if let Err(e) = Sampler::new(run, target, stdout).run() {
        eprintln!("ERROR: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
