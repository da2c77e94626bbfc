use tracing_subscriber::EnvFilter;

pub const ENV_LOG: &str = "PROOFBENCH_LOG";

/// Installs the global fmt subscriber. `PROOFBENCH_LOG` wins over `RUST_LOG`,
/// which wins over `default_filter`. A second call is a no-op.
pub fn init(default_filter: &str) {
    let filter = std::env::var(ENV_LOG)
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| default_filter.to_owned());

    let installed = tracing_subscriber::fmt()
        .with_target(false)
        .with_thread_ids(false)
        .with_level(true)
        .compact()
        .with_env_filter(EnvFilter::new(filter))
        .try_init();

    if installed.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}
