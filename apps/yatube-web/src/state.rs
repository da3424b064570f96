//! Application state - shared across all handlers.

use std::sync::Arc;

use yatube_core::pagination::Paginator;
use yatube_core::ports::{GroupRepository, PostRepository, UserRepository};
use yatube_infra::database::{
    InMemoryDatabase, InMemoryGroupRepository, InMemoryPostRepository, InMemoryUserRepository,
};

#[cfg(feature = "postgres")]
use yatube_infra::database::{
    DatabaseConnections, PostgresGroupRepository, PostgresPostRepository, PostgresUserRepository,
};

use crate::config::AppConfig;

/// Which persistence back end the repositories talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Postgres,
    InMemory,
}

impl Storage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Storage::Postgres => "postgres",
            Storage::InMemory => "memory",
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub storage: Storage,
    pub paginator: Paginator,
    pub login_url: String,
}

impl AppState {
    /// State backed by a fresh in-memory store.
    pub fn in_memory(login_url: impl Into<String>) -> Self {
        let db = InMemoryDatabase::new();
        Self {
            users: Arc::new(InMemoryUserRepository::new(db.clone())),
            groups: Arc::new(InMemoryGroupRepository::new(db.clone())),
            posts: Arc::new(InMemoryPostRepository::new(db)),
            storage: Storage::InMemory,
            paginator: Paginator::default(),
            login_url: login_url.into(),
        }
    }

    /// Build the application state, falling back to memory without a database.
    pub async fn new(config: &AppConfig) -> Self {
        #[cfg(feature = "postgres")]
        {
            if let Some(db_config) = &config.database {
                match DatabaseConnections::init(db_config).await {
                    Ok(connections) => {
                        tracing::info!("Application state initialized (postgres)");
                        let conn = Arc::new(connections.main);
                        return Self {
                            users: Arc::new(PostgresUserRepository::new(conn.clone())),
                            groups: Arc::new(PostgresGroupRepository::new(conn.clone())),
                            posts: Arc::new(PostgresPostRepository::new(conn)),
                            storage: Storage::Postgres,
                            paginator: Paginator::default(),
                            login_url: config.login_url.clone(),
                        };
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            }
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Running without postgres feature - using in-memory repositories");

        tracing::info!("Application state initialized (memory)");
        Self::in_memory(config.login_url.clone())
    }
}
