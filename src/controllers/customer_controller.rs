use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::customer_dto::{CustomerRequest, CustomerResponse};
use crate::models::customer::CustomerDraft;
use crate::repositories::customer_repository::CustomerRepository;
use crate::repositories::salesperson_repository::SalespersonRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::person_rules::{check_customer_format, normalize_customer, validate_customer};
use crate::utils::errors::{not_found_error, AppResult};

pub struct CustomerController {
    repository: CustomerRepository,
    salespeople: SalespersonRepository,
    vehicles: VehicleRepository,
}

impl CustomerController {
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: CustomerRepository::new(pool.clone()),
            salespeople: SalespersonRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
        }
    }

    /// Vendedor asignado y vehículos comprados deben existir
    async fn check_references(&self, conn: &mut PgConnection, draft: &CustomerDraft) -> AppResult<()> {
        if let Some(handled_by) = draft.handled_by {
            if !self.salespeople.exists(&mut *conn, handled_by).await? {
                return Err(not_found_error("Salesperson", &handled_by.to_string()));
            }
        }

        if !draft.purchased_vehicle_ids.is_empty() {
            let found = self
                .vehicles
                .find_many_for_update(&mut *conn, &draft.purchased_vehicle_ids)
                .await?;
            if let Some(missing) = draft
                .purchased_vehicle_ids
                .iter()
                .find(|id| !found.iter().any(|v| v.id == **id))
            {
                return Err(not_found_error("Vehicle", &missing.to_string()));
            }
        }

        Ok(())
    }

    pub async fn create(&self, request: CustomerRequest) -> AppResult<ApiResponse<CustomerResponse>> {
        request.validate()?;
        let draft = normalize_customer(request.into_draft());
        check_customer_format(&draft)?;

        let mut tx = self.repository.begin().await?;
        let existing = self.repository.find_by_email(&mut tx, &draft.email).await?;
        validate_customer(&draft, &existing, None)?;
        self.check_references(&mut tx, &draft).await?;

        let customer = self.repository.insert(&mut tx, &draft).await?;
        self.repository
            .replace_purchased_vehicles(&mut tx, customer.id, &draft.purchased_vehicle_ids)
            .await?;
        tx.commit().await?;

        info!("✅ Cliente creado: {} {}", customer.first_name, customer.last_name);
        Ok(ApiResponse::success_with_message(
            CustomerResponse::new(customer, draft.purchased_vehicle_ids),
            "Customer created successfully",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<CustomerResponse> {
        let customer = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))?;
        let purchased = self.repository.purchased_vehicle_ids(id).await?;

        Ok(CustomerResponse::new(customer, purchased))
    }

    pub async fn list(&self) -> AppResult<Vec<CustomerResponse>> {
        let customers = self.repository.list_all().await?;

        let mut response = Vec::with_capacity(customers.len());
        for customer in customers {
            let purchased = self.repository.purchased_vehicle_ids(customer.id).await?;
            response.push(CustomerResponse::new(customer, purchased));
        }

        Ok(response)
    }

    pub async fn update(&self, id: Uuid, request: CustomerRequest) -> AppResult<ApiResponse<CustomerResponse>> {
        request.validate()?;
        let draft = normalize_customer(request.into_draft());
        check_customer_format(&draft)?;

        let mut tx = self.repository.begin().await?;
        self.repository
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Customer", &id.to_string()))?;

        let existing = self.repository.find_by_email(&mut tx, &draft.email).await?;
        validate_customer(&draft, &existing, Some(id))?;
        self.check_references(&mut tx, &draft).await?;

        let customer = self.repository.update(&mut tx, id, &draft).await?;
        self.repository
            .replace_purchased_vehicles(&mut tx, id, &draft.purchased_vehicle_ids)
            .await?;
        tx.commit().await?;

        info!("✅ Cliente actualizado: {} {}", customer.first_name, customer.last_name);
        Ok(ApiResponse::success_with_message(
            CustomerResponse::new(customer, draft.purchased_vehicle_ids),
            "Customer updated successfully",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.repository.begin().await?;
        if !self.repository.delete(&mut tx, id).await? {
            return Err(not_found_error("Customer", &id.to_string()));
        }
        tx.commit().await?;

        info!("🗑️ Cliente eliminado: {}", id);
        Ok(ApiResponse::message("Customer deleted successfully"))
    }
}
