use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const LOG_ENV: &str = "ATLAS_CONFIG_LOG";
const LOG_ALL_ENV: &str = "ATLAS_CONFIG_LOG_ALL";

/// Setup logging.
///
/// By default it will only show logs from our crate at the info level.
/// `ATLAS_CONFIG_LOG` sets the level and `--debug` forces `debug`.
/// If `ATLAS_CONFIG_LOG_ALL` is set, logs from all crates are shown at that level.
///
/// Logs go to stderr, stdout is reserved for command output.
pub fn setup_logging(debug: bool) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::new(filter(
            debug,
            std::env::var(LOG_ENV).ok(),
            std::env::var_os(LOG_ALL_ENV).is_some(),
        )))
        .init();
}

fn filter(debug: bool, level: Option<String>, show_all_logs: bool) -> String {
    let log_level = if debug {
        "debug".to_string()
    } else {
        level.unwrap_or_else(|| "info".to_string())
    };

    if show_all_logs {
        log_level
    } else {
        format!("atlas_config={log_level}")
    }
}
