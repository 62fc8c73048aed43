//! Tracing subscriber setup for the storyloom binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "info,storyloom=debug"
    } else {
        "info"
    }
}

/// Initialize console logging.
///
/// `RUST_LOG` wins over `verbose` when set. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_console_telemetry(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_enables_crate_debug_logs() {
        assert_eq!(default_filter(true), "info,storyloom=debug");
        assert_eq!(default_filter(false), "info");
    }
}
