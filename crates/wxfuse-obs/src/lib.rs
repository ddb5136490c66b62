use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when RUST_LOG is unset
pub const DEFAULT_FILTER: &str = "info,wxfuse=debug";

/// Initialize logging.
/// - JSON lines on stderr, so stdout only carries command output
/// - RUST_LOG respected; default to "info,wxfuse=debug"
pub fn init(service_name: &str) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
        .try_init();

    if installed.is_ok() {
        tracing::info!(service = %service_name, "Logging initialized");
    }
}
