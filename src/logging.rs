//! Logging setup for the CLI.
//!
//! Events go to stderr so the report on stdout stays machine-readable.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// `None` silences everything but errors.
    pub level: Option<Level>,
    pub with_ansi: bool,
}

impl LogConfig {
    /// `-v` count: 0 warn, 1 info, 2 debug, 3 or more trace.
    pub fn from_flags(verbose: u8, quiet: bool) -> Self {
        let level = if quiet {
            None
        } else {
            Some(match verbose {
                0 => Level::WARN,
                1 => Level::INFO,
                2 => Level::DEBUG,
                _ => Level::TRACE,
            })
        };
        Self {
            level,
            with_ansi: std::io::stderr().is_terminal(),
        }
    }

    fn directive(&self) -> String {
        self.level
            .unwrap_or(Level::ERROR)
            .as_str()
            .to_lowercase()
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the flags.
pub fn init_logging(config: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.directive()));

    let layer = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_ansi(config.with_ansi)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .init();
}
