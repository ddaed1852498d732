use std::path::Path;
use tracing_subscriber::prelude::*;

/// Installs the global subscriber. `RUST_LOG` wins over the `info` default.
/// With a log file path, output goes to stdout and, without colors, to the file.
pub fn init(log_file_path: Option<&Path>) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let Some(log_path) = log_file_path else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
        return;
    };

    let file_appender = tracing_appender::rolling::never(
        log_path.parent().unwrap_or(Path::new(".")),
        log_path
            .file_name()
            .unwrap_or(std::ffi::OsStr::new("runclub-api.log")),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    // The writer must outlive main; the process exits without flushing otherwise.
    std::mem::forget(guard);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(true)
                .with_writer(std::io::stdout),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking),
        )
        .init();
}
