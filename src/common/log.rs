use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};
use tracing_tree::HierarchicalLayer;

const DEFAULT_FILTER: &str = "maxpane=info";

/// Installs the global subscriber. Output goes to stderr so that commands
/// printing JSON on stdout stay machine readable.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let tree = HierarchicalLayer::default()
        .with_writer(std::io::stderr)
        .with_indent_amount(2)
        .with_indent_lines(true)
        .with_targets(true)
        .with_timer(tracing_tree::time::Uptime::default());

    if let Err(e) = Registry::default().with(filter).with(tree).try_init() {
        eprintln!("logging already initialized: {e}");
    }
}
