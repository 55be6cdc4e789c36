use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber for the given level or filter directive.
/// Falls back to `info` when the directive does not parse. Calling it twice is harmless.
pub fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_target(false).try_init();
}
