use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, SellVehicleRequest, UpdateVehicleRequest, VehicleListQuery, VehicleResponse,
};
use crate::models::vehicle::{Vehicle, VehicleDraft, VehicleFacets};
use crate::repositories::salesperson_repository::SalespersonRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::vehicle_rules::{self, generate_vin};
use crate::utils::errors::{duplicate_error, not_found_error, AppError, AppResult};

pub struct VehicleController {
    repository: VehicleRepository,
    salespeople: SalespersonRepository,
    commission_rate: Decimal,
    vin_max_attempts: u32,
}

/// Normaliza, valida y guarda un borrador sobre un vehículo existente
///
/// Se usa también desde la atribución de ventas del vendedor, dentro de su
/// propia transacción.
pub(crate) async fn persist_update(
    repository: &VehicleRepository,
    conn: &mut PgConnection,
    id: Uuid,
    draft: VehicleDraft,
) -> AppResult<Vehicle> {
    let draft = vehicle_rules::normalize(draft);
    let conflicts = repository.find_conflicts(&mut *conn, &draft, Some(id)).await?;
    vehicle_rules::validate(&draft, &conflicts, Some(id), today())?;
    repository.update(&mut *conn, id, &draft).await
}

/// Inserta probando VINs candidatos hasta que uno no colisione
///
/// Cada candidato es un intento; agotar la secuencia es un error interno.
pub async fn insert_with_candidate_vins<I>(
    repository: &VehicleRepository,
    conn: &mut PgConnection,
    draft: &VehicleDraft,
    candidates: I,
) -> AppResult<Vehicle>
where
    I: IntoIterator<Item = String>,
{
    let mut attempts = 0u32;
    for vin in candidates {
        attempts += 1;
        if let Some(vehicle) = repository.insert(&mut *conn, draft, &vin).await? {
            return Ok(vehicle);
        }
        warn!("⚠️ VIN generado en colisión ({}), intento {}", vin, attempts);
    }

    Err(AppError::Internal(format!(
        "Could not generate a unique VIN after {} attempts",
        attempts
    )))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

impl VehicleController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        Self {
            repository: VehicleRepository::new(pool.clone()),
            salespeople: SalespersonRepository::new(pool),
            commission_rate: config.commission_rate,
            vin_max_attempts: config.vin_max_attempts,
        }
    }

    fn respond(&self, vehicle: Vehicle) -> VehicleResponse {
        VehicleResponse::from_vehicle(vehicle, self.commission_rate)
    }

    async fn ensure_salesperson(&self, conn: &mut PgConnection, draft: &VehicleDraft) -> AppResult<()> {
        if let Some(salesperson_id) = draft.salesperson_id {
            if !self.salespeople.exists(conn, salesperson_id).await? {
                return Err(not_found_error("Salesperson", &salesperson_id.to_string()));
            }
        }
        Ok(())
    }

    pub async fn create(&self, request: CreateVehicleRequest) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;
        let draft = vehicle_rules::normalize(request.into_draft());

        let mut tx = self.repository.begin().await?;
        self.ensure_salesperson(&mut tx, &draft).await?;

        let conflicts = self.repository.find_conflicts(&mut tx, &draft, None).await?;
        vehicle_rules::validate(&draft, &conflicts, None, today())?;

        let vehicle = match draft.vin.clone() {
            Some(vin) => self
                .repository
                .insert(&mut tx, &draft, &vin)
                .await?
                .ok_or_else(|| duplicate_error("Vehicle", "VIN", &vin))?,
            None => self.insert_with_generated_vin(&mut tx, &draft).await?,
        };

        tx.commit().await?;

        info!("✅ Vehículo creado: {} ({})", vehicle.display_name(), vehicle.vin);
        Ok(ApiResponse::success_with_message(
            self.respond(vehicle),
            "Vehicle created successfully",
        ))
    }

    async fn insert_with_generated_vin(&self, conn: &mut PgConnection, draft: &VehicleDraft) -> AppResult<Vehicle> {
        let candidates = std::iter::repeat_with(|| generate_vin(&mut rand::thread_rng()))
            .take(self.vin_max_attempts as usize);
        insert_with_candidate_vins(&self.repository, conn, draft, candidates).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<VehicleResponse> {
        let vehicle = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        Ok(self.respond(vehicle))
    }

    pub async fn list(&self, query: VehicleListQuery) -> AppResult<Vec<VehicleResponse>> {
        let (filters, ordering) = query.into_parts()?;
        let vehicles = self.repository.list(&filters, ordering).await?;

        Ok(vehicles.into_iter().map(|v| self.respond(v)).collect())
    }

    pub async fn facets(&self) -> AppResult<VehicleFacets> {
        self.repository.facets().await
    }

    pub async fn update(&self, id: Uuid, request: UpdateVehicleRequest) -> AppResult<ApiResponse<VehicleResponse>> {
        request.validate()?;

        let mut tx = self.repository.begin().await?;
        let current = self
            .repository
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        let draft = request.into_draft(current.vin);
        self.ensure_salesperson(&mut tx, &draft).await?;
        let vehicle = persist_update(&self.repository, &mut tx, id, draft).await?;

        tx.commit().await?;

        info!("✅ Vehículo actualizado: {}", vehicle.display_name());
        Ok(ApiResponse::success_with_message(
            self.respond(vehicle),
            "Vehicle updated successfully",
        ))
    }

    /// Atribuye la venta a un vendedor; el vehículo debe estar disponible
    pub async fn sell(&self, id: Uuid, request: SellVehicleRequest) -> AppResult<ApiResponse<VehicleResponse>> {
        let mut tx = self.repository.begin().await?;
        let current = self
            .repository
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        if current.sold {
            return Err(AppError::InconsistentSaleState(format!(
                "Vehicle '{}' is already sold",
                current.vin
            )));
        }

        let mut draft = current.to_draft();
        draft.mark_as_sold(request.salesperson_id, request.date_sold.unwrap_or_else(today));
        self.ensure_salesperson(&mut tx, &draft).await?;
        let vehicle = persist_update(&self.repository, &mut tx, id, draft).await?;

        tx.commit().await?;

        info!(
            "💰 Vehículo {} vendido por {:?} el {:?}",
            vehicle.vin, vehicle.salesperson_id, vehicle.date_sold
        );
        Ok(ApiResponse::success_with_message(
            self.respond(vehicle),
            "Vehicle marked as sold",
        ))
    }

    /// Devuelve el vehículo a disponible; idempotente
    pub async fn unsell(&self, id: Uuid) -> AppResult<ApiResponse<VehicleResponse>> {
        let mut tx = self.repository.begin().await?;
        let current = self
            .repository
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Vehicle", &id.to_string()))?;

        let mut draft = current.to_draft();
        draft.mark_as_unsold();
        let vehicle = persist_update(&self.repository, &mut tx, id, draft).await?;

        tx.commit().await?;

        info!("↩️ Vehículo {} disponible de nuevo", vehicle.vin);
        Ok(ApiResponse::success_with_message(
            self.respond(vehicle),
            "Vehicle marked as available",
        ))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.repository.begin().await?;
        if !self.repository.delete(&mut tx, id).await? {
            return Err(not_found_error("Vehicle", &id.to_string()));
        }
        tx.commit().await?;

        info!("🗑️ Vehículo eliminado: {}", id);
        Ok(ApiResponse::message("Vehicle deleted successfully"))
    }
}
