use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Builds the filter for a configured log level.
///
/// A bare level ("debug") also quiets the HTTP stack; full directive strings
/// (containing `,` or `=`) are used as given.
pub fn filter_directives(log_level: &str) -> String {
    let normalized = log_level.trim();
    if normalized.contains(',') || normalized.contains('=') {
        normalized.to_string()
    } else {
        format!("{normalized},hyper=info,hyper_util=info,reqwest=info,h2=info")
    }
}

pub fn setup_logging(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_new(filter_directives(log_level)).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::registry().with(filter);

    if json_format {
        subscriber
            .with(fmt::layer().json().with_target(false).with_current_span(false))
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(true).compact())
            .init();
    }

    tracing::info!(
        level = log_level,
        format = if json_format { "json" } else { "compact" },
        "logging initialized"
    );
}
