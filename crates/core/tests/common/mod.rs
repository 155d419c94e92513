//! Shared setup for the integration tests

/// Route `tracing` output through the test harness; `RUST_LOG` picks the level
#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
