use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::state::AppState;

pub fn create_health_router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

/// Health check; reporta también si la base de datos responde
async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(e) => {
            tracing::warn!("⚠️ Base de datos no disponible: {}", e);
            "unavailable"
        }
    };

    Json(json!({
        "status": "ok",
        "database": database,
        "environment": state.config.environment,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
