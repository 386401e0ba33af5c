use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, Registry, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::models::LoggingConfig;

/// Initialize structured logging with JSON output
pub fn init_tracing() -> Result<()> {
    Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(true)
                .with_target(true)
                .with_thread_ids(true),
        )
        .try_init()
        .wrap_err("Failed to install tracing subscriber")?;

    tracing::info!("Filter engine structured logging initialized");
    Ok(())
}

/// Initialize logging from the engine's logging configuration
pub fn init_tracing_with_config(config: &LoggingConfig) -> Result<()> {
    let env_filter = EnvFilter::try_new(&config.level)
        .wrap_err_with(|| format!("Invalid log level: {}", config.level))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let installed = if config.json {
        Registry::default()
            .with(env_filter)
            .with(
                fmt_layer
                    .json()
                    .with_current_span(config.include_spans)
                    .with_span_list(config.include_spans),
            )
            .try_init()
    } else {
        Registry::default()
            .with(env_filter)
            .with(fmt_layer.pretty().with_ansi(true))
            .try_init()
    };
    installed.wrap_err("Failed to install tracing subscriber")?;

    tracing::info!(
        level = %config.level,
        json = config.json,
        spans = config.include_spans,
        "Filter engine logging initialized"
    );
    Ok(())
}

/// Create the span wrapping one filter body invocation
pub fn create_filter_span(name: &str) -> tracing::Span {
    tracing::debug_span!(
        "filter",
        span.name = name,
        duration_us = tracing::field::Empty,
    )
}

/// Create the span wrapping one directory scan
pub fn create_scan_span(directory: &str) -> tracing::Span {
    tracing::info_span!(
        "filter_scan",
        directory = directory,
        registered = tracing::field::Empty,
        failed = tracing::field::Empty,
    )
}
