//! Inventory reservation inside the order transaction.

use std::collections::BTreeMap;

use sea_orm::sea_query::Expr;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QuerySelect};
use uuid::Uuid;

use crate::{
    checkout::pricing::PricedLine,
    entity::products::{Column as ProdCol, Entity as Products},
    error::{AppError, AppResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    pub product_id: Uuid,
    pub quantity: i64,
}

/// Total requested quantity per product, ascending by product id.
pub fn demand(lines: &[PricedLine]) -> Vec<StockAdjustment> {
    let mut totals: BTreeMap<Uuid, i64> = BTreeMap::new();
    for priced in lines {
        *totals.entry(priced.line.product_id).or_default() += priced.quantity();
    }
    totals
        .into_iter()
        .map(|(product_id, quantity)| StockAdjustment {
            product_id,
            quantity,
        })
        .collect()
}

/// Decrements stock and bumps the sale counter for every product in `lines`.
///
/// Each decrement is a single conditional update (`stock >= qty`), so two
/// checkouts racing on the same product cannot both succeed past zero.
/// Products are touched in ascending id order to keep lock acquisition
/// consistent across concurrent transactions.
pub async fn reserve<C: ConnectionTrait>(
    conn: &C,
    lines: &[PricedLine],
) -> AppResult<Vec<StockAdjustment>> {
    let adjustments = demand(lines);
    for adjustment in &adjustments {
        let result = Products::update_many()
            .col_expr(
                ProdCol::CurrentStock,
                Expr::col(ProdCol::CurrentStock).sub(adjustment.quantity),
            )
            .col_expr(
                ProdCol::NumOfSale,
                Expr::col(ProdCol::NumOfSale).add(adjustment.quantity),
            )
            .filter(ProdCol::Id.eq(adjustment.product_id))
            .filter(ProdCol::CurrentStock.gte(adjustment.quantity))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            let available = Products::find_by_id(adjustment.product_id)
                .select_only()
                .column(ProdCol::CurrentStock)
                .into_tuple::<i64>()
                .one(conn)
                .await?
                .unwrap_or(0);
            return Err(AppError::StockUnavailable {
                product_id: adjustment.product_id,
                requested: adjustment.quantity,
                available,
            });
        }

        tracing::debug!(
            product_id = %adjustment.product_id,
            quantity = adjustment.quantity,
            "stock reserved"
        );
    }
    Ok(adjustments)
}
