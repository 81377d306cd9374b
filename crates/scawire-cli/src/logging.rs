use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging for the scawire CLI.
///
/// Diagnostics go to stderr so descriptor output on stdout stays parseable.
/// The level is controlled via RUST_LOG:
/// - RUST_LOG=debug scawire wire app.json  (per-wire tracing)
/// - RUST_LOG=warn scawire wire app.json   (quiet)
pub fn init(verbose: bool) {
    let default = if verbose {
        "scawire=debug,scawire_cli=debug"
    } else {
        "scawire=warn,scawire_cli=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .init();
}
