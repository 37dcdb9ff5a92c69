use anyhow::Context;
use bookstore_kernel::{settings::Settings, InitCtx, ModuleRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookstore settings")?;
    bookstore_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.endpoint,
        "bookstore bootstrap starting"
    );

    let store = bookstore_db::connect(&settings.database.endpoint)
        .await
        .with_context(|| format!("failed to connect to {}", settings.database.endpoint))?;

    let mut registry = ModuleRegistry::new();
    bookstore::modules::register_all(&mut registry, store, &settings.database);

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookstore bootstrap complete");

    let served = bookstore_http::start_server(&registry, &settings).await;
    registry.stop_modules().await?;
    served
}
