use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes structured logging for the engine.
///
/// The engine is a library, so the host layer decides when to call this —
/// typically once at process startup, with `Config::from_env().rust_log`
/// as the fallback filter when `RUST_LOG` is unset.
pub fn init(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_filter.to_string())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
