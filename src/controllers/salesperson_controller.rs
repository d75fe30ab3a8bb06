use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::environment::EnvironmentConfig;
use crate::controllers::vehicle_controller::persist_update;
use crate::dto::api_response::ApiResponse;
use crate::dto::salesperson_dto::{
    CreateSalespersonRequest, SalesMetricsResponse, SalespersonListQuery, SalespersonResponse,
    SalespersonSummaryResponse, UpdateSalespersonRequest,
};
use crate::dto::vehicle_dto::VehicleResponse;
use crate::models::salesperson::Salesperson;
use crate::repositories::salesperson_repository::SalespersonRepository;
use crate::repositories::vehicle_repository::VehicleRepository;
use crate::services::person_rules::{check_salesperson_format, normalize_salesperson, validate_salesperson};
use crate::services::sales_ledger::{compute_metrics, sort_salespeople, SalespersonSummary};
use crate::utils::errors::{not_found_error, AppError, AppResult};

pub struct SalespersonController {
    repository: SalespersonRepository,
    vehicles: VehicleRepository,
    commission_rate: Decimal,
}

impl SalespersonController {
    pub fn new(pool: PgPool, config: &EnvironmentConfig) -> Self {
        Self {
            repository: SalespersonRepository::new(pool.clone()),
            vehicles: VehicleRepository::new(pool),
            commission_rate: config.commission_rate,
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Salesperson> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error("Salesperson", &id.to_string()))
    }

    async fn summarize(&self, salesperson: Salesperson) -> AppResult<SalespersonSummary> {
        let sold = self.vehicles.find_sold_by_salesperson(salesperson.id).await?;
        let metrics = compute_metrics(salesperson.id, &sold, self.commission_rate);

        Ok(SalespersonSummary { salesperson, metrics })
    }

    pub async fn create(
        &self,
        request: CreateSalespersonRequest,
    ) -> AppResult<ApiResponse<SalespersonResponse>> {
        request.validate()?;
        let draft = normalize_salesperson(request.into_draft());
        check_salesperson_format(&draft)?;

        let mut tx = self.repository.begin().await?;
        let conflicts = self.repository.find_conflicts(&mut tx, &draft, None).await?;
        validate_salesperson(&draft, &conflicts, None)?;
        let salesperson = self.repository.insert(&mut tx, &draft).await?;
        tx.commit().await?;

        info!("✅ Vendedor creado: {}", salesperson.full_name());
        Ok(ApiResponse::success_with_message(
            salesperson.into(),
            "Salesperson created successfully",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<SalespersonSummaryResponse> {
        let salesperson = self.find(id).await?;
        Ok(self.summarize(salesperson).await?.into())
    }

    /// Actualiza los datos del vendedor y, opcionalmente, le atribuye la
    /// venta de un vehículo disponible con fecha de hoy
    ///
    /// Bloquea primero el vehículo y después al vendedor, el mismo orden que
    /// sigue la venta desde el vehículo.
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateSalespersonRequest,
    ) -> AppResult<ApiResponse<SalespersonResponse>> {
        request.validate()?;
        let (draft, vehicle_id) = request.into_parts();
        let draft = normalize_salesperson(draft);
        check_salesperson_format(&draft)?;

        let mut tx = self.repository.begin().await?;

        let vehicle = match vehicle_id {
            Some(vehicle_id) => Some(
                self.vehicles
                    .find_by_id_for_update(&mut tx, vehicle_id)
                    .await?
                    .ok_or_else(|| not_found_error("Vehicle", &vehicle_id.to_string()))?,
            ),
            None => None,
        };

        self.repository
            .find_by_id_for_edit(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Salesperson", &id.to_string()))?;

        let conflicts = self.repository.find_conflicts(&mut tx, &draft, Some(id)).await?;
        validate_salesperson(&draft, &conflicts, Some(id))?;
        let salesperson = self.repository.update(&mut tx, id, &draft).await?;

        if let Some(vehicle) = vehicle {
            if vehicle.sold {
                return Err(AppError::InconsistentSaleState(format!(
                    "Vehicle '{}' is not available for sale",
                    vehicle.vin
                )));
            }

            let vehicle_id = vehicle.id;
            let mut vehicle_draft = vehicle.to_draft();
            vehicle_draft.mark_as_sold(id, Utc::now().date_naive());
            let sold = persist_update(&self.vehicles, &mut tx, vehicle_id, vehicle_draft).await?;
            info!("💰 Vehículo {} atribuido a {}", sold.vin, salesperson.full_name());
        }

        tx.commit().await?;

        info!("✅ Vendedor actualizado: {}", salesperson.full_name());
        Ok(ApiResponse::success_with_message(
            salesperson.into(),
            "Salesperson updated successfully",
        ))
    }

    /// Elimina el vendedor; sus vehículos vuelven a estar disponibles
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        let mut tx = self.repository.begin().await?;
        let salesperson = self
            .repository
            .find_by_id_for_update(&mut tx, id)
            .await?
            .ok_or_else(|| not_found_error("Salesperson", &id.to_string()))?;

        let released = self.vehicles.release_salesperson(&mut tx, id).await?;
        if released > 0 {
            warn!(
                "⚠️ {} vehículo(s) de {} vuelven a estar disponibles",
                released,
                salesperson.full_name()
            );
        }

        self.repository.delete(&mut tx, id).await?;
        tx.commit().await?;

        info!("🗑️ Vendedor eliminado: {}", salesperson.full_name());
        Ok(ApiResponse::message("Salesperson deleted successfully"))
    }

    pub async fn metrics(&self, id: Uuid) -> AppResult<SalesMetricsResponse> {
        let salesperson = self.find(id).await?;
        let summary = self.summarize(salesperson).await?;

        Ok(SalesMetricsResponse::new(id, summary.metrics))
    }

    pub async fn vehicles(&self, id: Uuid) -> AppResult<Vec<VehicleResponse>> {
        self.find(id).await?;
        let vehicles = self.vehicles.find_sold_by_salesperson(id).await?;

        Ok(vehicles
            .into_iter()
            .map(|v| VehicleResponse::from_vehicle(v, self.commission_rate))
            .collect())
    }

    pub async fn list(&self, query: SalespersonListQuery) -> AppResult<Vec<SalespersonSummaryResponse>> {
        let ordering = query.ordering()?;
        let salespeople = self.repository.list_all().await?;
        // Una sola consulta para todas las ventas
        let sold = self.vehicles.find_all_sold().await?;

        let mut summaries: Vec<SalespersonSummary> = salespeople
            .into_iter()
            .map(|salesperson| {
                let metrics = compute_metrics(salesperson.id, &sold, self.commission_rate);
                SalespersonSummary { salesperson, metrics }
            })
            .collect();

        if let Some(ordering) = ordering {
            sort_salespeople(&mut summaries, ordering);
        }

        Ok(summaries.into_iter().map(Into::into).collect())
    }
}
