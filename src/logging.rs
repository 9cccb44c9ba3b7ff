//! Tracing subscriber setup
//!
//! `RUST_LOG` wins when it holds a usable filter; otherwise the configured
//! level applies. Console output goes to stderr so stdout stays clean for
//! command output.

use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;
use crate::error::Result;

/// Longest `RUST_LOG` value we are willing to parse
const MAX_FILTER_LEN: usize = 4096;

/// Pick the filter: a sane `RUST_LOG`, else `level`, else `info`
pub fn env_filter(rust_log: Option<&str>, level: &str) -> EnvFilter {
    rust_log
        .and_then(|raw| {
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > MAX_FILTER_LEN {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .or_else(|| EnvFilter::try_new(level.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init(config: &LogConfig) -> Result<()> {
    let rust_log = std::env::var("RUST_LOG").ok();
    let filter = env_filter(rust_log.as_deref(), &config.level);

    let file_layer = match &config.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .with(filter)
        .try_init();

    Ok(())
}
