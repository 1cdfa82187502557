// src/logger.rs
//! Diagnostic logging for both binaries.
//!
//! User-facing progress goes through [`crate::ui`]; this only covers the
//! `tracing` events (`debug!`/`warn!`) emitted along the way.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "h0_scaffold=debug";
const DEFAULT_FILTER: &str = "h0_scaffold=warn";

/// Pick the filter: `--verbose` wins, then `RUST_LOG`, then warnings only.
pub fn filter_for(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logger(verbose: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .compact();

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter_for(verbose))
        .with(fmt_layer)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn verbose_filter_enables_debug() {
        assert_eq!(filter_for(true).to_string(), VERBOSE_FILTER);
    }

    #[test]
    #[serial]
    fn rust_log_applies_without_verbose() {
        unsafe { std::env::set_var("RUST_LOG", "h0_scaffold=trace") };
        assert_eq!(filter_for(false).to_string(), "h0_scaffold=trace");
        // --verbose still wins
        assert_eq!(filter_for(true).to_string(), VERBOSE_FILTER);

        unsafe { std::env::remove_var("RUST_LOG") };
        assert_eq!(filter_for(false).to_string(), DEFAULT_FILTER);
    }

    #[test]
    fn init_twice_does_not_panic() {
        init_logger(false);
        init_logger(true);
    }
}
