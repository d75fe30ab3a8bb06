//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Códigos SQLSTATE de PostgreSQL que se traducen a errores de dominio
const UNIQUE_VIOLATION: &str = "23505";
const CHECK_VIOLATION: &str = "23514";
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Duplicate record: {0}")]
    DuplicateRecord(String),

    #[error("Inconsistent sale state: {0}")]
    InconsistentSaleState(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        // Los índices únicos y los CHECK del schema son la última barrera
        // cuando dos requests pasan la validación al mismo tiempo
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default();
            match db_err.code().as_deref() {
                Some(UNIQUE_VIOLATION) => {
                    return AppError::DuplicateRecord(describe_unique_constraint(constraint));
                }
                Some(CHECK_VIOLATION) if constraint == "vehicles_sale_state_check" => {
                    return AppError::InconsistentSaleState(
                        "sold, date_sold and salesperson must be set together".to_string(),
                    );
                }
                Some(CHECK_VIOLATION) => {
                    return AppError::InvalidFormat(format!("Constraint '{}' violated", constraint));
                }
                Some(FOREIGN_KEY_VIOLATION) => {
                    return AppError::NotFound(format!("Referenced record missing ({})", constraint));
                }
                _ => {}
            }
        }
        AppError::Database(err)
    }
}

/// Traduce el nombre de un índice único a un mensaje legible
fn describe_unique_constraint(constraint: &str) -> String {
    match constraint {
        "vehicles_vin_key" => "A vehicle with this VIN already exists".to_string(),
        "vehicles_spec_unique_idx" => {
            "A vehicle with the same make, model, year, color, mileage and type already exists".to_string()
        }
        "salespeople_name_unique_idx" => "Salesperson already exists".to_string(),
        "salespeople_email_unique_idx" => "Email already exists".to_string(),
        "salespeople_phone_unique_idx" => "Phone number already exists".to_string(),
        "customers_email_unique_idx" => "Customer email already exists".to_string(),
        other => format!("Unique constraint '{}' violated", other),
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str, message: String, code: &str) -> Self {
        Self {
            error: error.to_string(),
            message,
            details: None,
            code: Some(code.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Database Error".to_string(),
                        message: "An error occurred while accessing the database".to_string(),
                        details: Some(json!({ "sql_error": e.to_string() })),
                        code: Some("DB_ERROR".to_string()),
                    },
                )
            }

            AppError::Migration(e) => {
                error!("❌ Migration error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse::new(
                        "Database Error",
                        "The database schema is not up to date".to_string(),
                        "MIGRATION_ERROR",
                    ),
                )
            }

            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }

            AppError::DuplicateRecord(msg) => {
                warn!("Duplicate record: {}", msg);
                (
                    StatusCode::CONFLICT,
                    ErrorResponse::new("Duplicate Record", msg, "DUPLICATE_RECORD"),
                )
            }

            AppError::InconsistentSaleState(msg) => {
                warn!("Inconsistent sale state: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("Inconsistent Sale State", msg, "INCONSISTENT_SALE_STATE"),
                )
            }

            AppError::InvalidDate(msg) => {
                warn!("Invalid date: {}", msg);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorResponse::new("Invalid Date", msg, "INVALID_DATE"),
                )
            }

            AppError::InvalidFormat(msg) => {
                warn!("Invalid format: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Invalid Format", msg, "INVALID_FORMAT"),
                )
            }

            AppError::NotFound(msg) => {
                warn!("Resource not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorResponse::new("Not Found", msg, "NOT_FOUND"),
                )
            }

            AppError::BadRequest(msg) => {
                warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse::new("Bad Request", msg, "BAD_REQUEST"),
                )
            }

            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorResponse {
                        error: "Internal Server Error".to_string(),
                        message: "An unexpected error occurred".to_string(),
                        details: Some(json!({ "internal_error": msg })),
                        code: Some("INTERNAL_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(resource: &str, id: &str) -> AppError {
    AppError::NotFound(format!("{} with id '{}' not found", resource, id))
}

/// Función helper para crear errores de registro duplicado
pub fn duplicate_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::DuplicateRecord(format!("{} with {} '{}' already exists", resource, field, value))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}
