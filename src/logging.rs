use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::MakeWriterExt;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "tarrow.log";

/// Initialise logging. Without `debug` the level is forced to `info` and
/// `RUST_LOG` is ignored. With `debug` the level is `debug` unless `RUST_LOG`
/// says otherwise.
///
/// When `log_dir` is given, output is also appended to [`LOG_FILE_NAME`]
/// there. Keep the returned guard alive for the life of the process or
/// buffered lines are lost.
pub fn init(debug: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = filter_for(debug);

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (file, guard) = tracing_appender::non_blocking(appender);
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr.and(file))
                .with_ansi(false)
                .try_init();
            Some(guard)
        }
        None => {
            let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
            None
        }
    }
}

fn filter_for(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}
