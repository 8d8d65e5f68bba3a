use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

mod api_tests;

/// Route engine logs to the test harness; `RUST_LOG=symb_quad=debug` shows every attempt
///
/// Safe to call from every test; only the first call takes effect.
pub(crate) fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_test_writer().with_target(false))
        .try_init()
        .ok();
}
