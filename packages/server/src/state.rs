use std::sync::Arc;

use common::notify::NotificationChannel;
use common::storage::ObjectStorage;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn ObjectStorage>,
    pub notifier: Arc<dyn NotificationChannel>,
    pub config: AppConfig,
}
