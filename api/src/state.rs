//! Application state shared across Axum route handlers.

use sea_orm::DatabaseConnection;

/// Central application state: currently just the database connection,
/// cloned cheaply into every handler via Axum's `State<T>` extractor.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
}

impl AppState {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Shared reference to the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Cloned connection for tasks that need ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }
}
