use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber: stderr always, plus a file writer when given.
///
/// A subscriber that is already installed wins; the error is ignored so an
/// embedding host keeps its own tracing setup.
pub fn register_to_tracing(file: Option<NonBlocking>, env_filter: EnvFilter) {
    let file_layer = file.map(|writer| {
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .try_init();
}
