use anyhow::Context;
use bookstall_kernel::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load bookstall settings")?;
    bookstall_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        catalog = %settings.catalog.base_url,
        "bookstall-app starting"
    );

    bookstall_app::run(settings).await
}
