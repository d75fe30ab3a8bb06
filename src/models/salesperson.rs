//! Modelo de Salesperson
//!
//! Mapea a la tabla `salespeople`. Los vehículos vendidos no se guardan
//! aquí: se obtienen consultando `vehicles.salesperson_id`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Salesperson {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Salesperson {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Campos escribibles de un vendedor
#[derive(Debug, Clone, PartialEq)]
pub struct SalespersonDraft {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}
