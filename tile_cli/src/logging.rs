use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable that overrides the log filter
pub const LOG_ENV: &str = "TILEINTEL_LOG";

const DEFAULT_FILTER: &str = "tile_core=info,tileintel=info";
const VERBOSE_FILTER: &str = "tile_core=debug,tileintel=debug,info";

/// Install a compact stderr logger. `TILEINTEL_LOG` wins over `-v`.
pub fn init_logger(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
