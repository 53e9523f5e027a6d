//! Reads an account's cart joined with live catalog fields, and removes the
//! rows a checkout consumed.

use std::collections::HashMap;

use sea_orm::sea_query::LockType;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use uuid::Uuid;

use crate::{
    dto::checkout::{CheckoutWarning, ExclusionReason},
    entity::{
        cart_items::{Column as CartCol, Entity as CartItems, Model as CartItemModel},
        products::{Column as ProdCol, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    money::{Discount, Money, Tax},
};

/// A cart row enriched with the product fields pricing needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub cart_item_id: Uuid,
    pub product_id: Uuid,
    pub seller_id: Uuid,
    pub variation: String,
    pub quantity: i64,
    /// Live catalog price.
    pub unit_price: Money,
    pub discount: Discount,
    pub tax: Tax,
    pub shipping_cost: Money,
    pub coupon_code: Option<String>,
}

#[derive(Debug, Default)]
pub struct CartSnapshot {
    pub lines: Vec<CartLine>,
    pub warnings: Vec<CheckoutWarning>,
}

impl CartSnapshot {
    /// First coupon code attached to the cart, in cart order.
    pub fn coupon_code(&self) -> Option<&str> {
        self.lines
            .iter()
            .filter_map(|line| line.coupon_code.as_deref())
            .map(str::trim)
            .find(|code| !code.is_empty())
    }

    pub fn cart_item_ids(&self) -> Vec<Uuid> {
        self.lines.iter().map(|line| line.cart_item_id).collect()
    }
}

/// Cart access scoped to a single account.
#[derive(Debug, Clone, Copy)]
pub struct CartRepository {
    user_id: Uuid,
}

impl CartRepository {
    pub fn for_account(user_id: Uuid) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    /// Loads the cart in insertion order, locking the rows when the backend
    /// supports it. Unpublished, unapproved and deleted products are left out
    /// and reported as warnings.
    pub async fn load_snapshot<C: ConnectionTrait>(&self, conn: &C) -> AppResult<CartSnapshot> {
        let rows = CartItems::find()
            .filter(CartCol::UserId.eq(self.user_id))
            .order_by_asc(CartCol::CreatedAt)
            .order_by_asc(CartCol::Id)
            .lock(LockType::Update)
            .all(conn)
            .await
            .map_err(AppError::from_read)?;

        if rows.is_empty() {
            return Ok(CartSnapshot::default());
        }

        let product_ids: Vec<Uuid> = rows.iter().map(|row| row.product_id).collect();
        let products: HashMap<Uuid, ProductModel> = Products::find()
            .filter(ProdCol::Id.is_in(product_ids))
            .all(conn)
            .await
            .map_err(AppError::from_read)?
            .into_iter()
            .map(|product| (product.id, product))
            .collect();

        let mut snapshot = CartSnapshot::default();
        for row in rows {
            let verdict = products
                .get(&row.product_id)
                .ok_or(ExclusionReason::Missing)
                .and_then(|product| orderable(product).map(|()| product));
            match verdict {
                Ok(product) => snapshot.lines.push(enrich(row, product, &mut snapshot.warnings)),
                Err(reason) => {
                    tracing::warn!(
                        user_id = %self.user_id,
                        product_id = %row.product_id,
                        ?reason,
                        "cart line excluded from checkout"
                    );
                    snapshot.warnings.push(CheckoutWarning::LineExcluded {
                        cart_item_id: row.id,
                        product_id: row.product_id,
                        reason,
                    });
                }
            }
        }

        tracing::debug!(
            user_id = %self.user_id,
            lines = snapshot.lines.len(),
            warnings = snapshot.warnings.len(),
            "cart snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Deletes exactly the given cart rows of this account.
    pub async fn clear_consumed<C: ConnectionTrait>(
        &self,
        conn: &C,
        cart_item_ids: &[Uuid],
    ) -> AppResult<u64> {
        if cart_item_ids.is_empty() {
            return Ok(0);
        }
        let result = CartItems::delete_many()
            .filter(CartCol::UserId.eq(self.user_id))
            .filter(CartCol::Id.is_in(cart_item_ids.iter().copied()))
            .exec(conn)
            .await?;
        Ok(result.rows_affected)
    }
}

fn orderable(product: &ProductModel) -> Result<(), ExclusionReason> {
    if !product.published {
        Err(ExclusionReason::Unpublished)
    } else if !product.approved {
        Err(ExclusionReason::Unapproved)
    } else {
        Ok(())
    }
}

fn enrich(row: CartItemModel, product: &ProductModel, warnings: &mut Vec<CheckoutWarning>) -> CartLine {
    if row.unit_price != product.unit_price {
        warnings.push(CheckoutWarning::PriceChanged {
            product_id: product.id,
            was: Money(row.unit_price),
            now: Money(product.unit_price),
        });
    }

    CartLine {
        cart_item_id: row.id,
        product_id: product.id,
        seller_id: product.seller_id,
        variation: row.variation,
        quantity: i64::from(row.quantity),
        unit_price: Money(product.unit_price).non_negative(),
        discount: product_discount(product),
        tax: product_tax(product),
        shipping_cost: Money(product.shipping_cost).non_negative(),
        coupon_code: row.coupon_code,
    }
}

/// Malformed discount data is zeroed rather than failing the checkout.
fn product_discount(product: &ProductModel) -> Discount {
    if product.discount == 0 {
        return Discount::Amount(Money::ZERO);
    }
    Discount::parse(&product.discount_type, product.discount).unwrap_or_else(|| {
        tracing::warn!(
            product_id = %product.id,
            discount = product.discount,
            discount_type = %product.discount_type,
            "malformed product discount, ignoring"
        );
        Discount::Amount(Money::ZERO)
    })
}

fn product_tax(product: &ProductModel) -> Tax {
    if product.tax == 0 {
        return Tax::Flat(Money::ZERO);
    }
    Tax::parse(&product.tax_type, product.tax).unwrap_or_else(|| {
        tracing::warn!(
            product_id = %product.id,
            tax = product.tax,
            tax_type = %product.tax_type,
            "malformed product tax, ignoring"
        );
        Tax::Flat(Money::ZERO)
    })
}
