use std::sync::Once;

/// Backend crates whose info-level output drowns the engine's own: wgpu's
/// core and HAL layers log per resource, naga per compilation.
const QUIET_BACKENDS: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` syntax (e.g. "debug",
/// "ripple_engine=debug,wgpu_core=info"). An explicit filter, or `RUST_LOG`
/// in its absence, replaces the default wholesale, quieted backends included.
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

/// Installs the global logger. Idempotent; the first call wins.
///
/// With no filter configured anywhere, the engine runs at info and the GPU
/// backends are clamped to warn.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config
            .env_filter
            .or_else(|| std::env::var("RUST_LOG").ok());
        match filter {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                builder.filter_level(log::LevelFilter::Info);
                for module in QUIET_BACKENDS {
                    builder.filter_module(module, log::LevelFilter::Warn);
                }
            }
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logger installed");
    });
}
