//! Diagnostic logging
//!
//! The interpreter emits `tracing` events and spans at `debug`/`trace` level:
//! one span per scheduler phase and user-function call, events for loop
//! cycles, iteration caps, reported errors and every emitted command. Nothing
//! is printed unless a subscriber is installed.

use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install a `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call has an effect, and only
/// when `RUST_LOG` is set (e.g. `RUST_LOG=ardtrace=debug`).
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
