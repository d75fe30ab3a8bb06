use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::salesperson_controller::SalespersonController;
use crate::dto::api_response::ApiResponse;
use crate::dto::salesperson_dto::{
    CreateSalespersonRequest, SalesMetricsResponse, SalespersonListQuery, SalespersonResponse,
    SalespersonSummaryResponse, UpdateSalespersonRequest,
};
use crate::dto::vehicle_dto::VehicleResponse;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_salesperson_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_salesperson).get(list_salespeople))
        .route(
            "/:id",
            get(get_salesperson)
                .put(update_salesperson)
                .delete(delete_salesperson),
        )
        .route("/:id/metrics", get(salesperson_metrics))
        .route("/:id/vehicles", get(salesperson_vehicles))
}

fn controller(state: &AppState) -> SalespersonController {
    SalespersonController::new(state.pool.clone(), &state.config)
}

async fn create_salesperson(
    State(state): State<AppState>,
    Json(request): Json<CreateSalespersonRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SalespersonResponse>>), AppError> {
    let response = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_salespeople(
    State(state): State<AppState>,
    Query(query): Query<SalespersonListQuery>,
) -> Result<Json<Vec<SalespersonSummaryResponse>>, AppError> {
    let response = controller(&state).list(query).await?;
    Ok(Json(response))
}

async fn get_salesperson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalespersonSummaryResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_salesperson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateSalespersonRequest>,
) -> Result<Json<ApiResponse<SalespersonResponse>>, AppError> {
    let response = controller(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn delete_salesperson(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}

async fn salesperson_metrics(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalesMetricsResponse>, AppError> {
    let response = controller(&state).metrics(id).await?;
    Ok(Json(response))
}

async fn salesperson_vehicles(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let response = controller(&state).vehicles(id).await?;
    Ok(Json(response))
}
