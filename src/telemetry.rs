//! Tracing setup
//!
//! Installs the global subscriber for host applications embedding the
//! wizard. Library code only emits events; it never installs a subscriber
//! on its own.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_FILTER: &str = "member_enrollment=debug";

/// Initialize tracing/logging
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(config: &Config) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    let installed = if config.is_production() {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .is_ok()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .is_ok()
    };

    if installed {
        tracing::debug!(environment = %config.environment, "Tracing initialized");
    }
    installed
}
