//! Command implementations for the keyscope CLI.

pub mod probe;
pub mod sample;
pub mod schema;

use anyhow::Context;
use keyscope_adapter_rest::RestService;
use keyscope_core::KeyscopeConfig;
use keyscope_runtime::Prober;

/// Validate the configuration and build a prober bound to the REST service.
fn connect(config: KeyscopeConfig) -> anyhow::Result<Prober<RestService>> {
    config.validate().context("Invalid configuration")?;
    let service =
        RestService::from_config(&config.service).context("Failed to set up the REST client")?;
    tracing::debug!(base = %service.base_url(), "connecting");
    Ok(Prober::new(service, config.probe))
}
