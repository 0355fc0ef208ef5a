//! Structured logging setup
//!
//! Library crates log through `tracing`; the binary installs one `fmt`
//! subscriber writing to stderr so stdout stays clean for `--json` output.
//!
//! Level precedence: `RUST_LOG` > `--log-level` / `-v` / `-q` > `KILN_LOG` > `info`.

use std::env;
use std::io;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Logging options collected from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingConfig {
    /// Explicit level (`--log-level`, `-v`, `-q`)
    pub level: Option<Level>,
    /// Include the module path in each line
    pub include_target: bool,
}

impl LoggingConfig {
    /// Map the global verbosity flags to a config
    pub fn from_flags(log_level: Option<Level>, verbose: bool, quiet: bool) -> Self {
        let level = log_level.or(if quiet {
            Some(Level::ERROR)
        } else if verbose {
            Some(Level::DEBUG)
        } else {
            None
        });
        Self {
            level,
            include_target: verbose,
        }
    }

    /// Filter directive used when `RUST_LOG` is absent
    pub fn directive(&self) -> String {
        match self.level {
            Some(level) => level.to_string().to_lowercase(),
            None => env::var("KILN_LOG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "info".to_string()),
        }
    }
}

/// Install the global subscriber; later calls are no-ops
pub fn init(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(config.directive()))
            .unwrap_or_else(|_| EnvFilter::new("info"));

        let layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(config.include_target)
            .without_time();

        // Fails only when a subscriber is already installed.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}
