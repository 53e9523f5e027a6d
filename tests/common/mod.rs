#![allow(dead_code)]

use chrono::Utc;
use marketplace_checkout::{
    config::CheckoutConfig,
    db::{create_orm_conn, run_migrations},
    dto::{
        cart::{AddToCartRequest, ApplyCouponRequest},
        checkout::{CheckoutRequest, CheckoutResult},
    },
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems},
        coupons::{ActiveModel as CouponActive, Entity as Coupons},
        products::{ActiveModel as ProductActive, Entity as Products, Model as Product},
    },
    middleware::auth::AuthUser,
    services::{cart_service, checkout_service},
    state::AppState,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use uuid::Uuid;

pub const SELLER_ONE: Uuid = Uuid::from_u128(1);
pub const SELLER_TWO: Uuid = Uuid::from_u128(2);

pub async fn test_state() -> anyhow::Result<AppState> {
    let orm = create_orm_conn("sqlite::memory:").await?;
    run_migrations(&orm).await?;
    Ok(AppState {
        orm,
        checkout: CheckoutConfig::default(),
    })
}

pub fn customer() -> AuthUser {
    AuthUser {
        user_id: Uuid::new_v4(),
        role: "customer".to_string(),
    }
}

/// Catalog row with no tax or shipping unless the caller changes it.
pub struct NewProduct {
    pub seller_id: Uuid,
    pub unit_price: i64,
    pub discount: i64,
    pub discount_type: &'static str,
    pub tax: i64,
    pub tax_type: &'static str,
    pub shipping_cost: i64,
    pub stock: i64,
}

impl NewProduct {
    pub fn new(seller_id: Uuid, unit_price: i64, stock: i64) -> Self {
        Self {
            seller_id,
            unit_price,
            discount: 0,
            discount_type: "amount",
            tax: 0,
            tax_type: "percent",
            shipping_cost: 0,
            stock,
        }
    }

    pub fn percent_off(mut self, basis_points: i64) -> Self {
        self.discount = basis_points;
        self.discount_type = "percent";
        self
    }
}

pub async fn insert_product(state: &AppState, product: NewProduct) -> anyhow::Result<Product> {
    let id = Uuid::new_v4();
    Products::insert(ProductActive {
        id: Set(id),
        seller_id: Set(product.seller_id),
        name: Set(format!("product-{id}")),
        unit_price: Set(product.unit_price),
        discount: Set(product.discount),
        discount_type: Set(product.discount_type.to_string()),
        tax: Set(product.tax),
        tax_type: Set(product.tax_type.to_string()),
        shipping_cost: Set(product.shipping_cost),
        current_stock: Set(product.stock),
        num_of_sale: Set(0),
        published: Set(true),
        approved: Set(true),
        created_at: Set(Utc::now().into()),
    })
    .exec(&state.orm)
    .await?;

    Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {id} was not stored"))
}

pub async fn insert_coupon(
    state: &AppState,
    code: &str,
    discount: i64,
    discount_type: &str,
    min_buy: i64,
) -> anyhow::Result<()> {
    Coupons::insert(CouponActive {
        id: Set(Uuid::new_v4()),
        code: Set(code.to_string()),
        discount: Set(discount),
        discount_type: Set(discount_type.to_string()),
        active: Set(true),
        min_buy: Set(min_buy),
        max_discount: Set(None),
        expires_at: Set(None),
        created_at: Set(Utc::now().into()),
    })
    .exec(&state.orm)
    .await?;
    Ok(())
}

pub async fn add_to_cart(
    state: &AppState,
    user: &AuthUser,
    product_id: Uuid,
    quantity: i32,
) -> anyhow::Result<()> {
    cart_service::add_to_cart(
        state,
        user,
        AddToCartRequest {
            product_id,
            quantity,
            variation: None,
        },
    )
    .await?;
    Ok(())
}

pub async fn apply_coupon(state: &AppState, user: &AuthUser, code: &str) -> anyhow::Result<()> {
    cart_service::apply_coupon(
        state,
        user,
        ApplyCouponRequest {
            code: code.to_string(),
        },
    )
    .await?;
    Ok(())
}

pub fn shipping_request() -> CheckoutRequest {
    CheckoutRequest {
        shipping_name: Some("Dewi Lestari".to_string()),
        shipping_phone: Some("+62 812 0000 1111".to_string()),
        shipping_address: Some("Jl. Merdeka 10".to_string()),
        shipping_city: Some("Bandung".to_string()),
        shipping_state: Some("Jawa Barat".to_string()),
        shipping_postal_code: Some("40111".to_string()),
        payment_method: Some("cash_on_delivery".to_string()),
        additional_info: None,
        idempotency_key: None,
    }
}

pub async fn checkout_ok(state: &AppState, user: &AuthUser) -> anyhow::Result<CheckoutResult> {
    let response = checkout_service::checkout(state, user, shipping_request()).await?;
    response
        .into_data()
        .ok_or_else(|| anyhow::anyhow!("checkout returned no data"))
}

pub async fn cart_len(state: &AppState, user: &AuthUser) -> anyhow::Result<u64> {
    Ok(CartItems::find()
        .filter(CartCol::UserId.eq(user.user_id))
        .count(&state.orm)
        .await?)
}

pub async fn stock_of(state: &AppState, product_id: Uuid) -> anyhow::Result<i64> {
    let product = Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("product {product_id} missing"))?;
    Ok(product.current_stock)
}
