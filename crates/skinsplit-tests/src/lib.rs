//! SkinSplit End-to-End Test Infrastructure
//!
//! This crate drives [`skinsplit_engine::EditSession`] against an in-memory
//! host to cover the full edit → normalize → commit pipeline:
//!
//! - Selection, direct edits, locks, pruning, clipboard
//! - Slider drags committed through the session
//! - Mirroring onto the symmetric vertex
//! - Property tests for sum conservation
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p skinsplit-tests
//!
//! # With engine logs
//! RUST_LOG=skinsplit_engine=debug cargo test -p skinsplit-tests -- --nocapture
//! ```

pub mod fixtures;

/// Installs a test log subscriber honouring `RUST_LOG`.
///
/// Safe to call from every test; only the first call installs anything.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
