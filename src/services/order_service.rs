use std::collections::HashMap;

use sea_orm::{ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    dto::orders::{CombinedOrderWithSellers, SellerOrderWithDetails},
    entity::{
        combined_orders::{Column as CombinedCol, Entity as CombinedOrders},
        order_details::{Column as DetailCol, Entity as OrderDetails},
        seller_orders::{Column as SellerOrderCol, Entity as SellerOrders},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    response::{ApiResponse, Meta},
    state::AppState,
};

pub async fn get_order(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<CombinedOrderWithSellers>> {
    let order = CombinedOrders::find()
        .filter(
            Condition::all()
                .add(CombinedCol::UserId.eq(user.user_id))
                .add(CombinedCol::Id.eq(id)),
        )
        .one(&state.orm)
        .await?;
    let order = match order {
        Some(o) => o,
        None => return Err(AppError::NotFound),
    };

    let seller_orders = SellerOrders::find()
        .filter(SellerOrderCol::CombinedOrderId.eq(order.id))
        .order_by_asc(SellerOrderCol::SellerId)
        .all(&state.orm)
        .await?;

    let seller_order_ids: Vec<Uuid> = seller_orders.iter().map(|so| so.id).collect();
    let mut details_by_order: HashMap<Uuid, Vec<_>> = HashMap::new();
    for detail in OrderDetails::find()
        .filter(DetailCol::SellerOrderId.is_in(seller_order_ids))
        .order_by_asc(DetailCol::ProductId)
        .order_by_asc(DetailCol::Variation)
        .all(&state.orm)
        .await?
    {
        details_by_order
            .entry(detail.seller_order_id)
            .or_default()
            .push(detail);
    }

    let seller_orders = seller_orders
        .into_iter()
        .map(|seller_order| {
            let details = details_by_order.remove(&seller_order.id).unwrap_or_default();
            SellerOrderWithDetails {
                order: seller_order.into(),
                details: details.into_iter().map(Into::into).collect(),
            }
        })
        .collect();

    Ok(ApiResponse::success(
        "OK",
        CombinedOrderWithSellers {
            order: order.into(),
            seller_orders,
        },
        Some(Meta::empty()),
    ))
}
