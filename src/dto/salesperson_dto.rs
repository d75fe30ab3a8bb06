use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::salesperson::{Salesperson, SalespersonDraft};
use crate::services::sales_ledger::{SalesMetrics, SalespersonOrdering, SalespersonSummary};
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::formatting::{format_grouped, format_phone};

// Request para crear un vendedor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateSalespersonRequest {
    #[validate(length(max = 50))]
    pub first_name: String,

    #[validate(length(max = 50))]
    pub last_name: String,

    /// Formato de email y teléfono: `person_rules::check_salesperson_format`
    pub email: String,

    pub phone_number: String,
}

impl CreateSalespersonRequest {
    pub fn into_draft(self) -> SalespersonDraft {
        SalespersonDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
        }
    }
}

// Request para actualizar un vendedor
//
// `vehicle_id` permite atribuirle en el mismo paso un vehículo disponible,
// que queda vendido con fecha de hoy.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSalespersonRequest {
    #[validate(length(max = 50))]
    pub first_name: String,

    #[validate(length(max = 50))]
    pub last_name: String,

    /// Formato de email y teléfono: `person_rules::check_salesperson_format`
    pub email: String,

    pub phone_number: String,

    pub vehicle_id: Option<Uuid>,
}

impl UpdateSalespersonRequest {
    pub fn into_parts(self) -> (SalespersonDraft, Option<Uuid>) {
        (
            SalespersonDraft {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                phone_number: self.phone_number,
            },
            self.vehicle_id,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SalespersonListQuery {
    pub order: Option<String>,
}

impl SalespersonListQuery {
    pub fn ordering(&self) -> AppResult<Option<SalespersonOrdering>> {
        match self.order.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(order) => order
                .parse::<SalespersonOrdering>()
                .map(Some)
                .map_err(|e| bad_request_error(&e)),
        }
    }
}

// Response de vendedor
#[derive(Debug, Serialize)]
pub struct SalespersonResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub phone_display: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Salesperson> for SalespersonResponse {
    fn from(salesperson: Salesperson) -> Self {
        Self {
            full_name: salesperson.full_name(),
            phone_display: format_phone(&salesperson.phone_number),
            id: salesperson.id,
            first_name: salesperson.first_name,
            last_name: salesperson.last_name,
            email: salesperson.email,
            phone_number: salesperson.phone_number,
            created_at: salesperson.created_at,
            updated_at: salesperson.updated_at,
        }
    }
}

// Métricas de ventas, con los importes ya formateados para mostrar
#[derive(Debug, Serialize)]
pub struct SalesMetricsResponse {
    pub salesperson_id: Uuid,
    pub total_commission: Decimal,
    pub total_sales: Decimal,
    pub total_vehicles_sold: i64,
    pub formatted_commission: String,
    pub formatted_sales: String,
}

impl SalesMetricsResponse {
    pub fn new(salesperson_id: Uuid, metrics: SalesMetrics) -> Self {
        Self {
            salesperson_id,
            total_commission: metrics.total_commission,
            total_sales: metrics.total_sales,
            total_vehicles_sold: metrics.total_vehicles_sold,
            formatted_commission: format_grouped(metrics.total_commission),
            formatted_sales: format_grouped(metrics.total_sales),
        }
    }
}

// Vendedor con sus métricas (detalle y listado)
#[derive(Debug, Serialize)]
pub struct SalespersonSummaryResponse {
    #[serde(flatten)]
    pub salesperson: SalespersonResponse,
    pub metrics: SalesMetricsResponse,
}

impl From<SalespersonSummary> for SalespersonSummaryResponse {
    fn from(summary: SalespersonSummary) -> Self {
        let id = summary.salesperson.id;
        Self {
            salesperson: summary.salesperson.into(),
            metrics: SalesMetricsResponse::new(id, summary.metrics),
        }
    }
}
