use axum::{Json, Router, extract::State, routing::post};

use crate::{
    dto::cart::{AddToCartRequest, ApplyCouponRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::CartItem,
    response::ApiResponse,
    services::cart_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(add_to_cart))
        .route("/coupon", post(apply_coupon))
}

#[utoipa::path(
    post,
    path = "/api/cart",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Add or update cart item", body = ApiResponse<CartItem>),
        (status = 400, description = "Bad request"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<AddToCartRequest>,
) -> AppResult<Json<ApiResponse<CartItem>>> {
    let resp = cart_service::add_to_cart(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/cart/coupon",
    request_body = ApplyCouponRequest,
    responses(
        (status = 200, description = "Coupon attached to the cart", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Unknown coupon or empty cart"),
    ),
    security(("bearer_auth" = [])),
    tag = "Cart"
)]
pub async fn apply_coupon(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ApplyCouponRequest>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = cart_service::apply_coupon(&state, &user, payload).await?;
    Ok(Json(resp))
}
