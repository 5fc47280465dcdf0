use std::fs;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_FILE_PREFIX: &str = "lead_pipeline.log";

/// Default filter directive for a verbosity count (`-v`, `-vv`)
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("lead_pipeline={}", level)
}

/// Initializes console logging on stderr, plus a daily-rotated JSON file
/// when `log_dir` is given. `RUST_LOG` overrides the verbosity directive.
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the program.
pub fn init_logging(verbosity: u8, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let (file_layer, guard) = match log_dir {
        Some(dir) => match fs::create_dir_all(dir) {
            Ok(()) => {
                let file_appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
                let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);
                let layer = fmt::layer().json().with_writer(non_blocking_writer);
                (Some(layer), Some(guard))
            }
            Err(e) => {
                eprintln!("warning: cannot create log directory {}: {}", dir.display(), e);
                (None, None)
            }
        },
        None => (None, None),
    };

    let console_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    // A subscriber may already be installed when embedded or under test
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init();

    guard
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_raises_level() {
        assert_eq!(default_directive(0), "lead_pipeline=info");
        assert_eq!(default_directive(1), "lead_pipeline=debug");
        assert_eq!(default_directive(5), "lead_pipeline=trace");
    }

    #[test]
    fn test_file_layer_only_with_log_dir() {
        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let guard = init_logging(0, Some(&logs));
        assert!(guard.is_some());
        assert!(logs.is_dir());
    }
}
