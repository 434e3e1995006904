use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes a `warn`-level tracing subscriber exactly once across the
/// whole integration test binary.
pub fn init_test_env() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("warn"))
            .try_init();
    });
}
