//! Shared integration-test setup. `tests/common/mod.rs` is not itself
//! compiled as a separate test binary, matching the usual convention for
//! code shared across `tests/*.rs` files.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a `tracing` subscriber once per test binary, the same
/// `tracing_subscriber::fmt` + `EnvFilter` shape the core's own CLI
/// consumers use, so the framing/dispatch `trace`/`debug` logs are visible
/// under `RUST_LOG` while a test runs instead of going nowhere.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("mc_client=debug,mc_protocol=debug"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
