//! wakeboost daemon - binary entry point.
//!
//! Wires the sysfs cpufreq backend, the policy and display notifiers, and the
//! wake boost engine together, then drives them from line commands on stdin:
//!
//! ```text
//! stdin -> Command::parse -> DisplayNotifier::notify | BoostParam::{get,set}
//!                                   |
//!                                   v
//!                    BoostController -> PolicyNotifier -> sysfs
//! ```
//!
//! Runs until stdin closes or Ctrl-C.

mod command;

use anyhow::{Context, Result};
use std::{
    fs::{self, OpenOptions},
    io::stderr,
    path::PathBuf,
    sync::{Arc, Mutex},
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use wakeboost_config::{Settings, WakeBoostConfig};
use wakeboost_engine::{
    BoostSettings, DisplayEvent, DisplayNotifier, PolicyNotifier, SysfsCpuFreq, WakeBoost,
};

use crate::command::Command;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::info!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // Stdout carries command replies, so logs go to stderr.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(stderr))
        .with(env_filter)
        .init();
    for warning in init_warnings {
        tracing::warn!("{warning}");
    }
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.wakeboost/logs/wakeboost.log
    if let Some(config_path) = WakeBoostConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("wakeboost.log"));
    }

    // Fallback: ./.wakeboost/logs/wakeboost.log
    candidates.push(PathBuf::from(".wakeboost").join("logs").join("wakeboost.log"));

    candidates
}

fn load_settings() -> Settings {
    match WakeBoostConfig::load() {
        Ok(Some(config)) => config.settings(),
        Ok(None) => Settings::default(),
        Err(e) => {
            tracing::warn!(path = %e.path().display(), "Ignoring config: {e}");
            Settings::default()
        }
    }
}

/// Run one command and produce the line to print back.
fn respond(command: &Command, wake: &WakeBoost, display: &DisplayNotifier) -> String {
    match command {
        Command::Display(mode) => {
            display.notify(DisplayEvent::early(*mode));
            "ok".to_owned()
        }
        Command::Set(raw) => match wake.param().set(raw) {
            Ok(()) => "ok".to_owned(),
            Err(e) => format!("error: {e}"),
        },
        Command::Get => wake.param().get(),
        Command::State => wake.controller().state().as_str().to_owned(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let settings = load_settings();
    tracing::info!(root = %settings.sysfs_root.display(), "Using cpufreq sysfs");

    let backend = Arc::new(SysfsCpuFreq::new(settings.sysfs_root.clone()));
    let policy = Arc::new(PolicyNotifier::new(backend));
    let display = DisplayNotifier::new();
    let wake = WakeBoost::start(
        BoostSettings {
            wake_boost: settings.wake_boost,
            initial_boost: settings.initial_boost,
        },
        &policy,
        &display,
    )
    .context("failed to start wake boost")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("failed to read stdin")? else {
                    tracing::info!("Input closed");
                    break;
                };
                match Command::parse(&line) {
                    Some(Ok(command)) => println!("{}", respond(&command, &wake, &display)),
                    Some(Err(unknown)) => tracing::warn!(input = %unknown, "Unknown command"),
                    None => {}
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    wake.flush().await;
    tracing::info!("Shutting down");
    Ok(())
}
