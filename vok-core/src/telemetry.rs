use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global `tracing` subscriber: `fmt` output filtered by
/// `RUST_LOG` (default `info`).
///
/// Panics if a global subscriber is already set; see [`try_init_test_tracing`]
/// for tests.
pub fn init_tracing() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Installs a subscriber writing through the test harness's captured output.
///
/// Safe to call from every test: only the first call installs anything.
pub fn try_init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_test_writer()
        .try_init();
}
