use crate::auth::password;
use crate::config::AppConfig;
use crate::db;
use crate::products::{PgProductStore, ProductStore};
use crate::users::{PgUserStore, UserStore};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub products: Arc<dyn ProductStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.db).await?;
        tokio::task::spawn_blocking(password::warm_up).await?;

        Ok(Self {
            config: Arc::new(config),
            users: Arc::new(PgUserStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool)),
        })
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            config,
            users,
            products,
        }
    }
}
