//! Logger setup for the binary.
//!
//! Stdout belongs to the console protocol, so log records go to stderr.
//! The level comes from `SENSENET_LOG` (error, warn, info, debug, trace,
//! off) and defaults to warn.

use log::LevelFilter;
use simplelog::{Config, WriteLogger};

/// Environment variable selecting the log level
pub const LOG_ENV: &str = "SENSENET_LOG";

#[must_use]
pub fn level_from_env() -> LevelFilter {
    std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .unwrap_or(LevelFilter::Warn)
}

fn parse_level(value: &str) -> Option<LevelFilter> {
    value.trim().parse().ok()
}

pub fn init_logging() {
    // A second init (e.g. from tests) is not an error worth reporting
    let _ = WriteLogger::init(level_from_env(), Config::default(), std::io::stderr());
}
