//! Tracing setup for the `license-warden` binary.
//!
//! Logs go to stderr so a JSON report on stdout stays machine-readable.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set. Only the first call
/// has an effect.
pub fn init_tracing(json: bool, level: Level) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    let layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer.json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(layer)
            .try_init()
            .ok();
    }
}

/// Default level for the `-v` / `-q` flags.
pub fn level_for(verbose: bool, quiet: bool) -> Level {
    if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::WARN
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_flags() {
        assert_eq!(level_for(false, false), Level::WARN);
        assert_eq!(level_for(true, false), Level::DEBUG);
        assert_eq!(level_for(true, true), Level::ERROR);
    }
}
