use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{CombinedOrder, OrderDetail, SellerOrder};

#[derive(Debug, Serialize, ToSchema)]
pub struct SellerOrderWithDetails {
    #[serde(flatten)]
    pub order: SellerOrder,
    pub details: Vec<OrderDetail>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CombinedOrderWithSellers {
    pub order: CombinedOrder,
    pub seller_orders: Vec<SellerOrderWithDetails>,
}
