//! Estado compartido de la aplicación
//!
//! Se clona por request en los handlers de Axum; `PgPool` ya es un `Arc`.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self { pool, config }
    }
}
