use tracing_subscriber::EnvFilter;

/// Crates whose events follow the overlay's own level. Everything else
/// (tauri, webview and windowing internals) is held at `warn`.
const OWN_TARGETS: &[&str] = &["chatlay", "chatlay_core", "chatlay_runtime"];

/// Builds the filter for `level`, e.g. `warn,chatlay=debug,...`.
pub fn filter_for(level: &str) -> EnvFilter {
    let directives = OWN_TARGETS
        .iter()
        .fold(String::from("warn"), |acc, target| format!("{acc},{target}={level}"));
    EnvFilter::new(directives)
}

/// Installs the global subscriber. Without `debug` the overlay logs at
/// `info`; with it the default becomes `debug` and `RUST_LOG` takes over
/// when set.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| filter_for("debug"))
    } else {
        filter_for("info")
    };

    // A subscriber may already be installed (tests, embedding hosts).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
