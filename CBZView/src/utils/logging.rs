//! Tracing subscriber setup
//!
//! The library itself only emits `tracing` events. Hosts that don't install
//! their own subscriber can call [`init_logging`] once at startup.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset or unparsable
pub const DEFAULT_FILTER: &str = "cbzview=info";

static INIT: OnceCell<bool> = OnceCell::new();

/// Install a formatted stderr subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; only the first call has an effect. Returns
/// `false` if another global subscriber was already set by the host.
pub fn init_logging() -> bool {
    *INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .try_init()
            .is_ok()
    })
}
