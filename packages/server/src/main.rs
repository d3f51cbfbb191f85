use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use common::notify::NotificationChannel;
use common::notify::smtp::SmtpChannel;
use common::notify::sns::SnsChannel;
use common::storage::ObjectStorage;
use common::storage::s3::S3ObjectStorage;
use tracing::info;

use server::config::{AppConfig, NotifyChannelKind};
use server::database::init_db;
use server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let config = AppConfig::load().context("Failed to load config")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    info!("Database connected");

    let storage: Arc<dyn ObjectStorage> = Arc::new(
        S3ObjectStorage::new(&config.storage).context("Failed to initialize object storage")?,
    );

    let notifier: Arc<dyn NotificationChannel> = match config.notify.channel {
        NotifyChannelKind::Smtp => {
            let smtp = config
                .notify
                .smtp
                .as_ref()
                .context("notify.channel is 'smtp' but notify.smtp is not configured")?;
            Arc::new(SmtpChannel::new(smtp).context("Failed to initialize SMTP channel")?)
        }
        NotifyChannelKind::Sns => {
            let sns = config
                .notify
                .sns
                .as_ref()
                .context("notify.channel is 'sns' but notify.sns is not configured")?;
            Arc::new(SnsChannel::new(sns))
        }
    };
    info!(channel = ?config.notify.channel, "Notification channel ready");

    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState {
        db,
        storage,
        notifier,
        config,
    };
    let app = server::build_router(state);

    info!("Server running at http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
