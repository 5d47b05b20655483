//! Logging system configuration and initialization
//!
//! Console logging through `tracing-subscriber`:
//! - `RUST_LOG` overrides everything when set
//! - otherwise the configured level applies to this crate, with HTTP client
//!   internals turned down unless the level is `trace`
//! - optional JSON output for log shippers

use anyhow::{anyhow, Result};
use std::io::IsTerminal;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

pub use crate::infrastructure::config::{LogOutput, LoggingConfig};

/// Initialize the logging system with default configuration
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Build the filter for the configured level.
///
/// Noisy dependencies are capped below `trace`:
/// - `reqwest`, `hyper`, `h2`: connection and frame details
/// - `html5ever`, `selectors`: parser internals
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let level = config.level.trim().to_lowercase();
    let mut filter = EnvFilter::try_new(&level).map_err(|e| anyhow!("Invalid log level '{}': {}", level, e))?;

    if level != "trace" {
        for directive in ["reqwest=info", "hyper=warn", "h2=warn", "html5ever=warn", "selectors=warn"] {
            filter = filter.add_directive(directive.parse()?);
        }
        filter = filter.add_directive(format!("letting_scraper={level}").parse()?);
    }

    Ok(filter)
}

/// Initialize logging with custom configuration.
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(config)?;
    let registry = Registry::default().with(filter);
    let ansi = writes_to_terminal(config.output);

    let installed = if config.json_format {
        registry
            .with(
                fmt::Layer::new()
                    .json()
                    .with_writer(make_writer(config.output))
                    .with_target(true)
                    .with_current_span(true),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::Layer::new()
                    .with_writer(make_writer(config.output))
                    .with_ansi(ansi)
                    .with_target(config.with_target),
            )
            .try_init()
    };

    if installed.is_ok() {
        tracing::info!("Logging initialized (level={}, json={})", config.level, config.json_format);
    }
    Ok(())
}

/// Writer for the configured stream
pub fn make_writer(output: LogOutput) -> BoxMakeWriter {
    match output {
        LogOutput::Stderr => BoxMakeWriter::new(std::io::stderr),
        LogOutput::Stdout => BoxMakeWriter::new(std::io::stdout),
    }
}

fn writes_to_terminal(output: LogOutput) -> bool {
    match output {
        LogOutput::Stderr => std::io::stderr().is_terminal(),
        LogOutput::Stdout => std::io::stdout().is_terminal(),
    }
}
