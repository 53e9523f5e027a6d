use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::money::Money;

/// Checkout submission. Fields are optional on the wire so that a missing
/// value is reported as a validation failure rather than a decode error.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub shipping_name: Option<String>,
    pub shipping_phone: Option<String>,
    pub shipping_address: Option<String>,
    pub shipping_city: Option<String>,
    pub shipping_state: Option<String>,
    pub shipping_postal_code: Option<String>,
    pub payment_method: Option<String>,
    pub additional_info: Option<String>,
    /// Client generated key; resubmitting the same key replays the first result.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExclusionReason {
    Unpublished,
    Unapproved,
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CheckoutWarning {
    /// The cart line was left in the cart and not ordered.
    LineExcluded {
        cart_item_id: Uuid,
        product_id: Uuid,
        reason: ExclusionReason,
    },
    /// The catalog price moved since the line was added; the live price was charged.
    PriceChanged {
        product_id: Uuid,
        was: Money,
        now: Money,
    },
    CouponRejected {
        code: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct CheckoutTotals {
    /// Before product discounts.
    pub gross_subtotal: Money,
    /// After product discounts: `gross_subtotal - item_discount_total`.
    pub subtotal: Money,
    pub tax: Money,
    pub shipping_total: Money,
    pub item_discount_total: Money,
    pub coupon_discount: Money,
    pub grand_total: Money,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SellerOrderSummary {
    pub id: Uuid,
    pub seller_id: Uuid,
    pub code: String,
    pub subtotal: Money,
    pub coupon_discount: Money,
    pub grand_total: Money,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CheckoutResult {
    pub combined_order_id: Uuid,
    pub code: String,
    pub totals: CheckoutTotals,
    pub seller_orders: Vec<SellerOrderSummary>,
    pub warnings: Vec<CheckoutWarning>,
    /// True when an earlier submission with the same idempotency key was returned.
    pub replayed: bool,
}
