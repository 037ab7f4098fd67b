use std::sync::Arc;

use common::storage::FileStore;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::notify::Mailer;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub files: Arc<dyn FileStore>,
    pub mailer: Arc<dyn Mailer>,
}
