use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::vehicle_controller::VehicleController;
use crate::dto::api_response::ApiResponse;
use crate::dto::vehicle_dto::{
    CreateVehicleRequest, SellVehicleRequest, UpdateVehicleRequest, VehicleListQuery, VehicleResponse,
};
use crate::models::vehicle::VehicleFacets;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_vehicle).get(list_vehicles))
        .route("/facets", get(vehicle_facets))
        .route(
            "/:id",
            get(get_vehicle).put(update_vehicle).delete(delete_vehicle),
        )
        .route("/:id/sell", post(sell_vehicle))
        .route("/:id/unsell", post(unsell_vehicle))
}

fn controller(state: &AppState) -> VehicleController {
    VehicleController::new(state.pool.clone(), &state.config)
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<VehicleResponse>>), AppError> {
    let response = controller(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_vehicles(
    State(state): State<AppState>,
    Query(query): Query<VehicleListQuery>,
) -> Result<Json<Vec<VehicleResponse>>, AppError> {
    let response = controller(&state).list(query).await?;
    Ok(Json(response))
}

async fn vehicle_facets(State(state): State<AppState>) -> Result<Json<VehicleFacets>, AppError> {
    let response = controller(&state).facets().await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<VehicleResponse>, AppError> {
    let response = controller(&state).get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let response = controller(&state).update(id, request).await?;
    Ok(Json(response))
}

async fn sell_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SellVehicleRequest>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let response = controller(&state).sell(id, request).await?;
    Ok(Json(response))
}

async fn unsell_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<VehicleResponse>>, AppError> {
    let response = controller(&state).unsell(id).await?;
    Ok(Json(response))
}

async fn delete_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let response = controller(&state).delete(id).await?;
    Ok(Json(response))
}
