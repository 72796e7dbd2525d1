use std::sync::Once;

/// Filter used when neither the config nor `RUST_LOG` provides one.
const DEFAULT_FILTER: &str = "info,wgpu_core=warn,wgpu_hal=warn";

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info", "warn",
/// "ember_engine=debug,wgpu=warn").
///
/// `write_style` controls ANSI coloring behavior.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Picks the filter string: explicit config, then `RUST_LOG`, then the default.
fn resolve_filter(config: Option<String>, env: Option<String>) -> String {
    config
        .or(env)
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Initializes the global logger once.
///
/// This function is idempotent; subsequent calls are ignored.
/// Intended usage is early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = resolve_filter(config.env_filter, std::env::var("RUST_LOG").ok());

        let mut builder = env_logger::Builder::new();
        builder.parse_filters(&filter);
        builder.write_style(config.write_style);

        // Records go to stderr; capability reports are written to stdout.
        builder.target(env_logger::Target::Stderr);

        if let Err(e) = builder.try_init() {
            eprintln!("logger already installed: {e}");
            return;
        }

        log::debug!("logging initialized with filter {filter:?}");
    });
}
