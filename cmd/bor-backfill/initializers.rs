use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Registry, filter::Directive, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Installs the global subscriber. `RUST_LOG` takes precedence over `level`.
/// Logs go to stderr; stdout is kept for values the operator asked for.
pub fn init_tracing(level: Level) {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(level))
        .from_env_lossy();

    let fmt_layer = fmt::layer().with_writer(std::io::stderr);

    Registry::default().with(log_filter).with(fmt_layer).init();
}
