use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::customer::{Customer, CustomerDraft};

// Request para crear o reemplazar un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CustomerRequest {
    #[validate(length(max = 50))]
    pub first_name: String,

    #[validate(length(max = 50))]
    pub last_name: String,

    /// Formato de email y teléfono: `person_rules::check_customer_format`
    pub email: String,

    pub phone_number: Option<String>,

    #[validate(length(max = 100))]
    pub address: Option<String>,

    #[validate(length(max = 50))]
    pub city: Option<String>,

    #[validate(length(max = 50))]
    pub state: Option<String>,

    #[validate(length(max = 10))]
    pub zip_code: Option<String>,

    pub handled_by: Option<Uuid>,

    #[serde(default)]
    pub purchased_vehicle_ids: Vec<Uuid>,
}

impl CustomerRequest {
    pub fn into_draft(self) -> CustomerDraft {
        CustomerDraft {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            handled_by: self.handled_by,
            purchased_vehicle_ids: self.purchased_vehicle_ids,
        }
    }
}

// Response de cliente
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub handled_by: Option<Uuid>,
    pub purchased_vehicle_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CustomerResponse {
    pub fn new(customer: Customer, purchased_vehicle_ids: Vec<Uuid>) -> Self {
        Self {
            id: customer.id,
            first_name: customer.first_name,
            last_name: customer.last_name,
            email: customer.email,
            phone_number: customer.phone_number,
            address: customer.address,
            city: customer.city,
            state: customer.state,
            zip_code: customer.zip_code,
            handled_by: customer.handled_by,
            purchased_vehicle_ids,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}
