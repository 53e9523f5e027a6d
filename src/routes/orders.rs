use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;

use crate::{
    dto::{
        checkout::{CheckoutRequest, CheckoutResult},
        orders::CombinedOrderWithSellers,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    response::ApiResponse,
    services::{checkout_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/{id}", get(get_order))
}

#[utoipa::path(
    post,
    path = "/api/orders/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 200, description = "Order placed, or replayed for a known idempotency key", body = ApiResponse<CheckoutResult>),
        (status = 409, description = "Insufficient stock or duplicate submission in progress"),
        (status = 422, description = "Missing shipping/payment fields or empty cart"),
        (status = 503, description = "Order store unavailable"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn checkout(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CheckoutRequest>,
) -> AppResult<Json<ApiResponse<CheckoutResult>>> {
    let resp = checkout_service::checkout(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    params(
        ("id" = Uuid, Path, description = "Combined order ID")
    ),
    responses(
        (status = 200, description = "Combined order with seller orders and their lines", body = ApiResponse<CombinedOrderWithSellers>),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Orders"
)]
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<CombinedOrderWithSellers>>> {
    let resp = order_service::get_order(&state, &user, id).await?;
    Ok(Json(resp))
}
