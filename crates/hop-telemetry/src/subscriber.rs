use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable holding an `EnvFilter` directive, e.g. `hop_core=debug`
pub const LOG_ENV: &str = "HOP_LOG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_level")]
    pub level: String,

    #[serde(default)]
    pub json_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            json_output: false,
        }
    }
}

fn default_level() -> String {
    "warn".to_string()
}

fn env_filter(config: &TelemetryConfig) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(&config.level))
}

/// Log to stderr, for commands whose diagnostics the user should see.
pub fn init_subscriber(config: &TelemetryConfig) {
    install(config, BoxMakeWriter::new(std::io::stderr), true);
}

/// Log to an append-only file, keeping diagnostics off the terminal.
///
/// When the file cannot be opened, events are discarded. Returns whether
/// the file sink is active.
pub fn init_file_subscriber(config: &TelemetryConfig, path: &Path) -> bool {
    let file = path
        .parent()
        .map_or(Ok(()), fs::create_dir_all)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(path));

    match file {
        Ok(file) => {
            install(config, BoxMakeWriter::new(Mutex::new(file)), false);
            true
        }
        Err(_) => {
            install(config, BoxMakeWriter::new(std::io::sink), false);
            false
        }
    }
}

fn install(config: &TelemetryConfig, writer: BoxMakeWriter, ansi: bool) {
    let filter = env_filter(config);

    // try_init: a second initialization in the same process is a no-op.
    if config.json_output {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(writer))
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_ansi(ansi).with_writer(writer))
            .try_init();
    }
}
