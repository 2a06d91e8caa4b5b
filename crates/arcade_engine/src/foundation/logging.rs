//! Logging utilities
//!
//! The engine reports through the `log` facade. Collision diagnostics use
//! these levels:
//! - `trace`: per-pair tier results
//! - `debug`: handler registry changes and collisions without a handler
//! - `warn`: precondition violations such as singular transforms
//! - `error`: conditions that should be unreachable

pub use log::{debug, info, warn, error, trace};

/// Initialize the logging system
///
/// Honors `RUST_LOG`; falls back to `info` when it is unset.
pub fn init() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Initialize logging for tests; safe to call more than once
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
