use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    cart_items::Model as CartItemModel, combined_orders::Model as CombinedOrderModel,
    order_details::Model as OrderDetailModel, seller_orders::Model as SellerOrderModel,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CartItem {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub variation: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub coupon_code: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CombinedOrder {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: String,
    #[schema(value_type = Object)]
    pub shipping_address: serde_json::Value,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_total: i64,
    pub item_discount_total: i64,
    pub coupon_discount: i64,
    pub grand_total: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SellerOrder {
    pub id: Uuid,
    pub combined_order_id: Uuid,
    pub seller_id: Uuid,
    pub code: String,
    pub payment_type: String,
    pub additional_info: Option<String>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub coupon_discount: i64,
    pub grand_total: i64,
    pub delivery_status: String,
    pub payment_status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OrderDetail {
    pub id: Uuid,
    pub seller_order_id: Uuid,
    pub product_id: Uuid,
    pub variation: String,
    pub price: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub quantity: i32,
    pub delivery_status: String,
    pub payment_status: String,
}

impl From<CartItemModel> for CartItem {
    fn from(model: CartItemModel) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            user_id: model.user_id,
            variation: model.variation,
            quantity: model.quantity,
            unit_price: model.unit_price,
            coupon_code: model.coupon_code,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<CombinedOrderModel> for CombinedOrder {
    fn from(model: CombinedOrderModel) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            code: model.code,
            // Written by checkout from a serialized struct; fall back to the raw text.
            shipping_address: serde_json::from_str(&model.shipping_address)
                .unwrap_or(serde_json::Value::String(model.shipping_address)),
            subtotal: model.subtotal,
            tax: model.tax,
            shipping_total: model.shipping_total,
            item_discount_total: model.item_discount_total,
            coupon_discount: model.coupon_discount,
            grand_total: model.grand_total,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<SellerOrderModel> for SellerOrder {
    fn from(model: SellerOrderModel) -> Self {
        Self {
            id: model.id,
            combined_order_id: model.combined_order_id,
            seller_id: model.seller_id,
            code: model.code,
            payment_type: model.payment_type,
            additional_info: model.additional_info,
            subtotal: model.subtotal,
            tax: model.tax,
            shipping_cost: model.shipping_cost,
            coupon_discount: model.coupon_discount,
            grand_total: model.grand_total,
            delivery_status: model.delivery_status,
            payment_status: model.payment_status,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<OrderDetailModel> for OrderDetail {
    fn from(model: OrderDetailModel) -> Self {
        Self {
            id: model.id,
            seller_order_id: model.seller_order_id,
            product_id: model.product_id,
            variation: model.variation,
            price: model.price,
            tax: model.tax,
            shipping_cost: model.shipping_cost,
            quantity: model.quantity,
            delivery_status: model.delivery_status,
            payment_status: model.payment_status,
        }
    }
}
