//! The order transaction: validation rules, the phase model and the writes
//! performed while the transaction is open.

use std::fmt;

use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ConnectionTrait, DbErr, Set, SqlErr};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    checkout::{
        coupon::CouponOutcome,
        pricing::{PricedCart, Totals},
        snapshot::{CartLine, CartRepository},
        splitter::SellerGroup,
        stock,
    },
    dto::checkout::{CheckoutRequest, CheckoutTotals, SellerOrderSummary},
    entity::{
        checkout_submissions::ActiveModel as SubmissionActive,
        combined_orders::ActiveModel as CombinedOrderActive,
        coupon_usages::ActiveModel as CouponUsageActive,
        order_details::ActiveModel as OrderDetailActive,
        seller_orders::ActiveModel as SellerOrderActive,
    },
    error::{AppError, AppResult},
};

pub const DELIVERY_PENDING: &str = "pending";
pub const PAYMENT_UNPAID: &str = "unpaid";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Init,
    Validated,
    Persisting,
    Committed,
    Aborted,
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CheckoutPhase::Init => "init",
            CheckoutPhase::Validated => "validated",
            CheckoutPhase::Persisting => "persisting",
            CheckoutPhase::Committed => "committed",
            CheckoutPhase::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    CashOnDelivery,
    BankTransfer,
    Wallet,
    Card,
}

impl PaymentMethod {
    pub fn parse(value: &str) -> Option<PaymentMethod> {
        match value.trim().to_ascii_lowercase().as_str() {
            "cash_on_delivery" | "cod" => Some(PaymentMethod::CashOnDelivery),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "wallet" => Some(PaymentMethod::Wallet),
            "card" => Some(PaymentMethod::Card),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash_on_delivery",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::Wallet => "wallet",
            PaymentMethod::Card => "card",
        }
    }
}

/// Address snapshot stored on every order row as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShippingDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    pub additional_info: Option<String>,
    pub idempotency_key: Option<String>,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

/// Checks the request fields. Reports every missing field at once.
pub fn validate_request(request: &CheckoutRequest) -> AppResult<ValidatedRequest> {
    let required = [
        ("shipping_name", present(&request.shipping_name)),
        ("shipping_phone", present(&request.shipping_phone)),
        ("shipping_address", present(&request.shipping_address)),
        ("shipping_city", present(&request.shipping_city)),
        ("payment_method", present(&request.payment_method)),
    ];
    let missing: Vec<&str> = required
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    let [name, phone, address, city, payment] = required.map(|(_, v)| v.unwrap_or_default());

    let payment_method = PaymentMethod::parse(&payment)
        .ok_or_else(|| AppError::Validation(format!("unsupported payment method: {payment}")))?;

    let idempotency_key = present(&request.idempotency_key);
    if let Some(key) = &idempotency_key {
        if !(8..=128).contains(&key.len()) {
            return Err(AppError::Validation(
                "idempotency_key must be between 8 and 128 characters".into(),
            ));
        }
    }

    Ok(ValidatedRequest {
        shipping: ShippingDetails {
            name,
            phone,
            address,
            city,
            state: present(&request.shipping_state),
            postal_code: present(&request.shipping_postal_code),
        },
        payment_method,
        additional_info: present(&request.additional_info),
        idempotency_key,
    })
}

/// Cart-level checks that need the snapshot.
pub fn validate_cart(lines: &[CartLine]) -> AppResult<()> {
    if lines.is_empty() {
        return Err(AppError::Validation("Cart is empty".into()));
    }
    if let Some(line) = lines.iter().find(|line| line.quantity < 1) {
        return Err(AppError::Validation(format!(
            "Cart has invalid quantity for product {}",
            line.product_id
        )));
    }
    Ok(())
}

/// Everything decided before the first write.
#[derive(Debug, Clone)]
pub struct OrderPlan {
    pub cart: PricedCart,
    pub groups: Vec<SellerGroup>,
    pub coupon: CouponOutcome,
    pub consumed_cart_items: Vec<Uuid>,
}

#[derive(Debug, Clone)]
pub struct PersistedOrder {
    pub combined_order_id: Uuid,
    pub code: String,
    pub totals: CheckoutTotals,
    pub seller_orders: Vec<SellerOrderSummary>,
}

pub fn build_order_code(order_id: Uuid, now: DateTime<Utc>) -> String {
    let date = now.format("%Y%m%d");
    let suffix = order_id.simple().to_string();
    let short = suffix.get(..8).unwrap_or(&suffix).to_uppercase();
    format!("ORD-{date}-{short}")
}

pub fn seller_order_code(combined_code: &str, position: usize) -> String {
    format!("{combined_code}-{}", position + 1)
}

pub fn totals_view(totals: &Totals) -> CheckoutTotals {
    CheckoutTotals {
        gross_subtotal: totals.gross_subtotal,
        subtotal: totals.subtotal,
        tax: totals.tax,
        shipping_total: totals.shipping_total,
        item_discount_total: totals.item_discount_total,
        coupon_discount: totals.coupon_discount,
        grand_total: totals.grand_total(),
    }
}

/// Maps a unique index violation to `Conflict`; other errors pass through.
fn conflict_on_duplicate(err: DbErr, message: &str) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(message.to_owned()),
        _ => AppError::OrmError(err),
    }
}

/// Performs every write of a checkout on `txn`. The caller owns commit and
/// rollback; any error here leaves the transaction to be rolled back.
pub async fn persist<C: ConnectionTrait>(
    txn: &C,
    cart_repo: &CartRepository,
    request: &ValidatedRequest,
    plan: &OrderPlan,
    now: DateTime<Utc>,
) -> AppResult<PersistedOrder> {
    let user_id = cart_repo.user_id();
    let shipping_json = serde_json::to_string(&request.shipping)
        .map_err(|err| AppError::Internal(err.into()))?;
    let totals = plan.cart.totals;
    let combined_order_id = Uuid::new_v4();
    let code = build_order_code(combined_order_id, now);

    CombinedOrderActive {
        id: Set(combined_order_id),
        user_id: Set(user_id),
        code: Set(code.clone()),
        shipping_address: Set(shipping_json.clone()),
        subtotal: Set(totals.subtotal.minor()),
        tax: Set(totals.tax.minor()),
        shipping_total: Set(totals.shipping_total.minor()),
        item_discount_total: Set(totals.item_discount_total.minor()),
        coupon_discount: Set(totals.coupon_discount.minor()),
        grand_total: Set(totals.grand_total().minor()),
        created_at: Set(now.into()),
    }
    .insert(txn)
    .await?;

    stock::reserve(txn, &plan.cart.lines).await?;

    let mut seller_orders = Vec::with_capacity(plan.groups.len());
    for (position, group) in plan.groups.iter().enumerate() {
        let seller_order_id = Uuid::new_v4();
        let seller_code = seller_order_code(&code, position);
        SellerOrderActive {
            id: Set(seller_order_id),
            combined_order_id: Set(combined_order_id),
            seller_id: Set(group.seller_id),
            user_id: Set(user_id),
            code: Set(seller_code.clone()),
            shipping_address: Set(shipping_json.clone()),
            payment_type: Set(request.payment_method.as_str().to_owned()),
            additional_info: Set(request.additional_info.clone()),
            subtotal: Set(group.subtotal.minor()),
            tax: Set(group.tax.minor()),
            shipping_cost: Set(group.shipping.minor()),
            coupon_discount: Set(group.coupon_share.minor()),
            grand_total: Set(group.grand_total().minor()),
            delivery_status: Set(DELIVERY_PENDING.to_owned()),
            payment_status: Set(PAYMENT_UNPAID.to_owned()),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await?;

        for priced in &group.lines {
            let quantity = i32::try_from(priced.quantity()).map_err(|_| {
                AppError::Validation(format!("quantity out of range for {}", priced.line.product_id))
            })?;
            OrderDetailActive {
                id: Set(Uuid::new_v4()),
                seller_order_id: Set(seller_order_id),
                seller_id: Set(group.seller_id),
                product_id: Set(priced.line.product_id),
                variation: Set(priced.line.variation.clone()),
                price: Set(priced.line_total.minor()),
                tax: Set(priced.tax.minor()),
                shipping_cost: Set(priced.shipping.minor()),
                quantity: Set(quantity),
                delivery_status: Set(DELIVERY_PENDING.to_owned()),
                payment_status: Set(PAYMENT_UNPAID.to_owned()),
                created_at: Set(now.into()),
            }
            .insert(txn)
            .await?;
        }

        seller_orders.push(SellerOrderSummary {
            id: seller_order_id,
            seller_id: group.seller_id,
            code: seller_code,
            subtotal: group.subtotal,
            coupon_discount: group.coupon_share,
            grand_total: group.grand_total(),
        });
    }

    if let Some(coupon_id) = plan.coupon.coupon_id.filter(|_| !plan.coupon.discount.is_zero()) {
        CouponUsageActive {
            id: Set(Uuid::new_v4()),
            coupon_id: Set(coupon_id),
            user_id: Set(user_id),
            combined_order_id: Set(combined_order_id),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|err| conflict_on_duplicate(err, "coupon was already redeemed by this account"))?;
    }

    if let Some(key) = &request.idempotency_key {
        SubmissionActive {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            idempotency_key: Set(key.clone()),
            combined_order_id: Set(combined_order_id),
            created_at: Set(now.into()),
        }
        .insert(txn)
        .await
        .map_err(|err| {
            conflict_on_duplicate(err, "checkout with this idempotency key is already in progress")
        })?;
    }

    let cleared = cart_repo.clear_consumed(txn, &plan.consumed_cart_items).await?;
    tracing::debug!(%user_id, cleared, "consumed cart rows deleted");

    Ok(PersistedOrder {
        combined_order_id,
        code,
        totals: totals_view(&totals),
        seller_orders,
    })
}
