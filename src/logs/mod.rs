use std::sync::Once;

static INIT: Once = Once::new();

fn default_log_level() -> &'static str {
    "warn"
}

/// Single initialization function for diagnostic logging.
pub fn init_logging() {
    INIT.call_once(|| {
        let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_level()));
        let _ = tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .finish(),
        );
        tracing::trace!("logging initialized");
    });
}
