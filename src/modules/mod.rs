pub mod books;
pub mod pricing;

use bookstall_kernel::settings::Settings;
use bookstall_kernel::ModuleRegistry;

/// Register all service modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, settings: &Settings) -> anyhow::Result<()> {
    registry.register(pricing::create_module())?;
    registry.register(books::create_module(settings)?)?;
    Ok(())
}
