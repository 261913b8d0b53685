//! Bookstall application library
//!
//! Domain modules (`pricing`, `books`) and the bootstrap that runs them
//! behind the shared HTTP server.

pub mod modules;

use anyhow::Context;
use bookstall_kernel::settings::Settings;
use bookstall_kernel::{InitCtx, ModuleRegistry};

/// Build a registry holding every service module.
pub fn build_registry(settings: &Settings) -> anyhow::Result<ModuleRegistry> {
    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, settings)?;
    Ok(registry)
}

/// Run the service until a shutdown signal arrives.
///
/// Modules are initialized and started before the server binds and stopped
/// after it has drained.
pub async fn run(settings: Settings) -> anyhow::Result<()> {
    let registry = build_registry(&settings).context("failed to register modules")?;
    let ctx = InitCtx {
        settings: &settings,
    };

    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!(
        modules = registry.module_count(),
        "bookstall bootstrap complete"
    );

    let served = bookstall_http::start_server(&registry, &settings).await;

    if let Err(error) = registry.stop_modules().await {
        tracing::error!(error = %error, "failed to stop modules cleanly");
    }

    served
}
