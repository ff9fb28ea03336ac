//! In-memory stores and request helpers for handler tests.

use std::collections::HashSet;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response, Router};
use time::OffsetDateTime;
use tower::ServiceExt;

use crate::{
    app::build_app,
    config::{AppConfig, DbConfig, JwtConfig},
    db::RepoError,
    products::{Product, ProductStore},
    state::AppState,
    users::{NewUser, User, UserStore},
};

pub fn test_config() -> AppConfig {
    AppConfig {
        db: DbConfig {
            url: None,
            user: "postgres".into(),
            password: String::new(),
            address: "127.0.0.1:5432".into(),
            name: "ecom".into(),
            max_connections: 1,
            acquire_timeout_secs: 1,
        },
        jwt: JwtConfig {
            secret: "test-secret".into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_seconds: 300,
        },
        host: "127.0.0.1".into(),
        port: 0,
        request_timeout_secs: 5,
    }
}

#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
    hidden: Mutex<HashSet<String>>,
    broken: AtomicBool,
}

impl InMemoryUsers {
    /// Lookups by this email report `NotFound` even when a row exists, which
    /// reproduces the window between the existence check and the insert.
    pub fn hide_from_lookup(&self, email: &str) {
        self.hidden.lock().unwrap().insert(email.to_string());
    }

    pub fn fail_storage(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(RepoError::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for InMemoryUsers {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Duplicate);
        }
        let row = User {
            id: rows.len() as i64 + 1,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn get_by_id(&self, id: i64) -> Result<User, RepoError> {
        self.check()?;
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(RepoError::NotFound)
    }

    async fn get_by_email(&self, email: &str) -> Result<User, RepoError> {
        self.check()?;
        if self.hidden.lock().unwrap().contains(email) {
            return Err(RepoError::NotFound);
        }
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(RepoError::NotFound)
    }
}

#[derive(Default)]
pub struct InMemoryProducts {
    pub rows: Vec<Product>,
    pub broken: bool,
    /// Sleeps this long before answering, like a stalled query.
    pub delay: Option<Duration>,
}

#[async_trait]
impl ProductStore for InMemoryProducts {
    async fn list(&self) -> Result<Vec<Product>, RepoError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.broken {
            return Err(RepoError::Storage(sqlx::Error::PoolTimedOut));
        }
        Ok(self.rows.clone())
    }
}

pub fn test_app_with(
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
) -> (Router, AppState) {
    test_app_with_config(test_config(), users, products)
}

pub fn test_app_with_config(
    config: AppConfig,
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
) -> (Router, AppState) {
    let state = AppState::from_parts(Arc::new(config), users, products);
    (build_app(state.clone()), state)
}

pub fn test_app(users: Arc<InMemoryUsers>) -> (Router, AppState) {
    test_app_with(users, Arc::new(InMemoryProducts::default()))
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn read_json(res: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
