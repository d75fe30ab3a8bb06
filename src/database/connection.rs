//! Conexión a PostgreSQL
//!
//! Abre el pool y aplica las migraciones de `./migrations` al arrancar.

use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;
use crate::utils::errors::AppError;

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn new(config: &DatabaseConfig) -> Result<Self, AppError> {
        info!("🔌 Conectando a {}", mask_database_url(&config.url));
        let pool = config.create_pool().await?;
        info!("✅ Conexión a la base de datos establecida");

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("✅ Migraciones aplicadas");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Enmascara las credenciales de la URL para los logs
fn mask_database_url(url: &str) -> String {
    let Some(at_pos) = url.rfind('@') else {
        return url.to_string();
    };
    let scheme_end = url.find("://").map(|i| i + 3).unwrap_or(0);
    if scheme_end > at_pos {
        return url.to_string();
    }
    format!("{}***:***@{}", &url[..scheme_end], &url[at_pos + 1..])
}
