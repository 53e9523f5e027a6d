use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set, sea_query::Expr,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::cart::{AddToCartRequest, ApplyCouponRequest},
    entity::{
        cart_items::{ActiveModel as CartActive, Column as CartCol, Entity as CartItems},
        coupons::{Column as CouponCol, Entity as Coupons},
        products::Entity as Products,
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::CartItem,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Adds a line or replaces the quantity of an existing one, snapshotting the
/// current catalog price.
pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    payload: AddToCartRequest,
) -> AppResult<ApiResponse<CartItem>> {
    if payload.quantity <= 0 {
        return Err(AppError::BadRequest(
            "quantity must be greater than 0".to_string(),
        ));
    }

    let product = Products::find_by_id(payload.product_id)
        .one(&state.orm)
        .await?
        .filter(|p| p.published && p.approved)
        .ok_or_else(|| AppError::BadRequest("product not found".to_string()))?;

    let variation = payload.variation.unwrap_or_default();
    let exist = CartItems::find()
        .filter(
            Condition::all()
                .add(CartCol::UserId.eq(user.user_id))
                .add(CartCol::ProductId.eq(product.id))
                .add(CartCol::Variation.eq(variation.clone())),
        )
        .one(&state.orm)
        .await?;

    let cart_item = match exist {
        Some(item) => {
            let mut active: CartActive = item.into();
            active.quantity = Set(payload.quantity);
            active.unit_price = Set(product.unit_price);
            active.update(&state.orm).await?
        }
        None => {
            CartActive {
                id: Set(Uuid::new_v4()),
                user_id: Set(user.user_id),
                product_id: Set(product.id),
                variation: Set(variation),
                quantity: Set(payload.quantity),
                unit_price: Set(product.unit_price),
                coupon_code: Set(None),
                created_at: Set(Utc::now().into()),
            }
            .insert(&state.orm)
            .await?
        }
    };

    if let Err(err) = log_audit(
        &state.orm,
        Some(user.user_id),
        "cart_update",
        Some("cart_items"),
        Some(serde_json::json!({ "product_id": product.id, "quantity": payload.quantity })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success("OK", cart_item.into(), None))
}

/// Ties a coupon code to every line of the caller's cart. The coupon is only
/// checked for existence here; its terms are evaluated at checkout.
pub async fn apply_coupon(
    state: &AppState,
    user: &AuthUser,
    payload: ApplyCouponRequest,
) -> AppResult<ApiResponse<serde_json::Value>> {
    let code = payload.code.trim();
    if code.is_empty() {
        return Err(AppError::BadRequest("coupon code is required".to_string()));
    }

    let coupon = Coupons::find()
        .filter(CouponCol::Code.eq(code))
        .one(&state.orm)
        .await?;
    if coupon.is_none() {
        return Err(AppError::BadRequest("coupon not found".to_string()));
    }

    let result = CartItems::update_many()
        .col_expr(CartCol::CouponCode, Expr::value(code))
        .filter(CartCol::UserId.eq(user.user_id))
        .exec(&state.orm)
        .await?;

    if result.rows_affected == 0 {
        return Err(AppError::BadRequest("Cart is empty".to_string()));
    }

    Ok(ApiResponse::success(
        "Coupon applied",
        serde_json::json!({ "code": code, "lines": result.rows_affected }),
        Some(Meta::empty()),
    ))
}
