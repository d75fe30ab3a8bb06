use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::vehicle::{CarType, Vehicle, VehicleDraft, VehicleFilters, VehicleOrdering};
use crate::services::vehicle_rules::calculate_commission;
use crate::utils::errors::{bad_request_error, AppResult};
use crate::utils::validation::validate_amount;

// Request para crear un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    /// Si falta, se genera al guardar
    pub vin: Option<String>,

    #[validate(length(min = 1, max = 50))]
    pub make: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,

    #[validate(length(min = 1, max = 20))]
    pub color: String,

    #[serde(default)]
    pub car_type: CarType,

    #[validate(custom = "validate_amount")]
    pub price: i64,

    #[validate(custom = "validate_amount")]
    pub mileage: Option<i64>,

    #[serde(default)]
    pub sold: bool,

    pub date_sold: Option<NaiveDate>,

    pub salesperson_id: Option<Uuid>,
}

impl CreateVehicleRequest {
    pub fn into_draft(self) -> VehicleDraft {
        VehicleDraft {
            vin: self.vin,
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            car_type: self.car_type,
            price: self.price,
            mileage: self.mileage,
            sold: self.sold,
            date_sold: self.date_sold,
            salesperson_id: self.salesperson_id,
        }
    }
}

// Request para actualizar un vehículo: reemplaza todos los campos editables.
// El VIN no es editable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateVehicleRequest {
    #[validate(length(min = 1, max = 50))]
    pub make: String,

    #[validate(length(min = 1, max = 50))]
    pub model: String,

    #[validate(range(min = 1886, max = 2100))]
    pub year: i32,

    #[validate(length(min = 1, max = 20))]
    pub color: String,

    #[serde(default)]
    pub car_type: CarType,

    #[validate(custom = "validate_amount")]
    pub price: i64,

    #[validate(custom = "validate_amount")]
    pub mileage: Option<i64>,

    #[serde(default)]
    pub sold: bool,

    pub date_sold: Option<NaiveDate>,

    pub salesperson_id: Option<Uuid>,
}

impl UpdateVehicleRequest {
    pub fn into_draft(self, vin: String) -> VehicleDraft {
        VehicleDraft {
            vin: Some(vin),
            make: self.make,
            model: self.model,
            year: self.year,
            color: self.color,
            car_type: self.car_type,
            price: self.price,
            mileage: self.mileage,
            sold: self.sold,
            date_sold: self.date_sold,
            salesperson_id: self.salesperson_id,
        }
    }
}

// Request para registrar la venta de un vehículo
#[derive(Debug, Deserialize)]
pub struct SellVehicleRequest {
    pub salesperson_id: Uuid,
    /// Por defecto, hoy
    pub date_sold: Option<NaiveDate>,
}

// Query string del listado
#[derive(Debug, Default, Deserialize)]
pub struct VehicleListQuery {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub car_type: Option<CarType>,
    pub color: Option<String>,
    pub price: Option<i64>,
    pub sold: Option<bool>,
    pub order: Option<String>,
}

impl VehicleListQuery {
    pub fn into_parts(self) -> AppResult<(VehicleFilters, Option<VehicleOrdering>)> {
        let ordering = match self.order.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(order) => Some(order.parse::<VehicleOrdering>().map_err(|e| bad_request_error(&e))?),
        };

        let filters = VehicleFilters {
            make: non_blank(self.make),
            model: non_blank(self.model),
            year: self.year,
            car_type: self.car_type,
            color: non_blank(self.color),
            price: self.price,
            sold: self.sold,
        };

        Ok((filters, ordering))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// Response de vehículo
#[derive(Debug, Serialize)]
pub struct VehicleResponse {
    pub id: Uuid,
    pub vin: String,
    pub display_name: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub color: String,
    pub car_type: CarType,
    pub price: i64,
    pub mileage: Option<i64>,
    pub sold: bool,
    pub date_sold: Option<NaiveDate>,
    pub salesperson_id: Option<Uuid>,
    pub commission: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VehicleResponse {
    pub fn from_vehicle(vehicle: Vehicle, commission_rate: Decimal) -> Self {
        Self {
            commission: calculate_commission(&vehicle, commission_rate),
            display_name: vehicle.display_name(),
            id: vehicle.id,
            vin: vehicle.vin,
            make: vehicle.make,
            model: vehicle.model,
            year: vehicle.year,
            color: vehicle.color,
            car_type: vehicle.car_type,
            price: vehicle.price,
            mileage: vehicle.mileage,
            sold: vehicle.sold,
            date_sold: vehicle.date_sold,
            salesperson_id: vehicle.salesperson_id,
            created_at: vehicle.created_at,
            updated_at: vehicle.updated_at,
        }
    }
}
