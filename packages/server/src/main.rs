use std::sync::Arc;

use anyhow::Context;
use common::storage::filesystem::FilesystemFileStore;
use server::config::AppConfig;
use server::entity::session;
use server::notify::{DisabledMailer, Mailer, SmtpMailer};
use server::state::AppState;
use server::{build_router, database, seed};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = database::init_db(&config.database.url)
        .await
        .context("Failed to connect to database")?;
    if config.database.seed_institutions {
        seed::seed_institutions(&db)
            .await
            .context("Failed to seed institutions")?;
    }
    seed::ensure_indexes(&db)
        .await
        .context("Failed to ensure indexes")?;
    let purged = session::purge_expired(&db)
        .await
        .context("Failed to purge expired sessions")?;
    info!(purged, "Removed expired sessions");

    let files = FilesystemFileStore::new(
        config.storage.root.clone(),
        config.storage.max_upload_size,
    )
    .await
    .context("Failed to initialize file storage")?;

    let mailer: Arc<dyn Mailer> = if config.mail.enabled {
        info!(host = %config.mail.smtp_host, port = config.mail.smtp_port, "SMTP notifications enabled");
        Arc::new(SmtpMailer::from_config(&config.mail).context("Invalid mail configuration")?)
    } else {
        info!("SMTP notifications disabled");
        Arc::new(DisabledMailer)
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        files: Arc::new(files),
        mailer,
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
