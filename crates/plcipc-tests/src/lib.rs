//! Integration tests for the PLC IPC client
//!
//! This crate contains end-to-end tests that exercise the full stack
//! against the scriptable mock transport:
//! - typed marshalling through `Variable` get/set
//! - the pending-retry protocol of the synchronous wrappers
//! - the subscription scheduler (change/error dedup, deferred removal,
//!   server run-state events)
//! - the shared-client registry lifecycle
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p plcipc-tests
//!
//! # With scheduler logs
//! RUST_LOG=plcipc_client=debug cargo test -p plcipc-tests
//! ```
//!
//! # Test Structure
//!
//! - `client_e2e_test.rs` - typed get/set and synchronous wrappers
//! - `subscription_e2e_test.rs` - scheduler-driven notifications
//! - `registry_test.rs` - shared-client lifecycle

use tracing_subscriber::EnvFilter;

/// Install the test log subscriber; safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
