use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::customer_controller::CustomerController;
use crate::dto::api_response::ApiResponse;
use crate::dto::customer_dto::{CustomerRequest, CustomerResponse};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_customer_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_customer).get(list_customers))
        .route(
            "/:id",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
}

async fn create_customer(
    State(state): State<AppState>,
    Json(request): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerResponse>>), AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_customers(State(state): State<AppState>) -> Result<Json<Vec<CustomerResponse>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.list().await?;
    Ok(Json(response))
}

async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<CustomerRequest>,
) -> Result<Json<ApiResponse<CustomerResponse>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let controller = CustomerController::new(state.pool.clone());
    let response = controller.delete(id).await?;
    Ok(Json(response))
}
