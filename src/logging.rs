use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const LOG_FILE_PREFIX: &str = "cardwise.log";

/// Installs the global tracing subscriber
///
/// `RUST_LOG` wins over the defaults (`info`, or `debug` for this crate and
/// tower-http when `debug` is set). With a `log_dir` a daily rolling plain
/// text file is written as well; keep the returned guard alive until exit or
/// buffered lines are lost.
pub fn init_logging(debug: bool, json: bool, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let default_filter = if debug {
        "info,cardwise=debug,tower_http=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (Some(fmt::layer().with_ansi(false).with_writer(writer)), Some(guard))
        }
        None => (None, None),
    };

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| fmt::layer().json()))
        .with((!json).then(|| fmt::layer()))
        .with(file_layer)
        .try_init();

    if let Err(e) = result {
        eprintln!("Logging was already initialised: {}", e);
    }

    guard
}
