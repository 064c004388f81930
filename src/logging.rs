//! Diagnostic logging setup.
//!
//! The library only emits `tracing` events; the binary decides where they
//! go.  `RUST_LOG` wins when set, otherwise `--verbose` picks the level.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "hsevault=debug"
    } else {
        "hsevault=warn"
    }
}

/// Install a stderr `fmt` subscriber.  Safe to call more than once; only
/// the first call takes effect.
pub fn init_logging(verbose: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose).into());

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init();
}
