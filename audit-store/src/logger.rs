//! Logging Infrastructure
//!
//! Structured logging via `tracing`. Console output goes to stderr so command
//! output on stdout stays machine-readable.

use std::path::Path;

/// Initialize the logger with optional file output
///
/// `log_level` defaults to `info`. When `log_dir` exists, logs go to a
/// daily-rolling `comar-audit` file instead of stderr. Calling this twice is
/// harmless.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");

    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level.parse().unwrap_or(tracing::Level::INFO))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "comar-audit");
            let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
            return;
        }
    }

    let _ = subscriber.with_writer(std::io::stderr).try_init();
}
