use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is not set
const DEFAULT_LOG_DIRECTIVE: &str = "warn";

/// Install the global subscriber, logging to stderr so stdout only carries the report.
///
/// The returned guard flushes buffered log lines when dropped; keep it alive
/// until the program exits.
pub fn init() -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_DIRECTIVE)),
        )
        .with(fmt::layer().with_writer(writer).with_target(false))
        .init();

    guard
}
