use sea_orm::{EntityTrait, Schema};
use sea_orm_migration::prelude::*;

use crate::entity::{
    AuditLogs, CartItems, CheckoutSubmissions, CombinedOrders, CouponUsages, Coupons,
    OrderDetails, Products, SellerOrders, cart_items, checkout_submissions, coupon_usages,
    seller_orders,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        // Parents before children so foreign keys resolve.
        create(manager, &schema, Products).await?;
        create(manager, &schema, Coupons).await?;
        create(manager, &schema, CartItems).await?;
        create(manager, &schema, CombinedOrders).await?;
        create(manager, &schema, SellerOrders).await?;
        create(manager, &schema, OrderDetails).await?;
        create(manager, &schema, CouponUsages).await?;
        create(manager, &schema, CheckoutSubmissions).await?;
        create(manager, &schema, AuditLogs).await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_cart_items_user_id")
                    .table(CartItems)
                    .col(cart_items::Column::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_seller_orders_combined_order_id")
                    .table(SellerOrders)
                    .col(seller_orders::Column::CombinedOrderId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_checkout_submissions_user_key")
                    .table(CheckoutSubmissions)
                    .col(checkout_submissions::Column::UserId)
                    .col(checkout_submissions::Column::IdempotencyKey)
                    .to_owned(),
            )
            .await?;

        // A coupon is redeemable once per account.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .unique()
                    .name("uq_coupon_usages_coupon_user")
                    .table(CouponUsages)
                    .col(coupon_usages::Column::CouponId)
                    .col(coupon_usages::Column::UserId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            Table::drop().table(AuditLogs).if_exists().to_owned(),
            Table::drop().table(CheckoutSubmissions).if_exists().to_owned(),
            Table::drop().table(CouponUsages).if_exists().to_owned(),
            Table::drop().table(OrderDetails).if_exists().to_owned(),
            Table::drop().table(SellerOrders).if_exists().to_owned(),
            Table::drop().table(CombinedOrders).if_exists().to_owned(),
            Table::drop().table(CartItems).if_exists().to_owned(),
            Table::drop().table(Coupons).if_exists().to_owned(),
            Table::drop().table(Products).if_exists().to_owned(),
        ] {
            manager.drop_table(table).await?;
        }
        Ok(())
    }
}

async fn create<E: EntityTrait>(
    manager: &SchemaManager<'_>,
    schema: &Schema,
    entity: E,
) -> Result<(), DbErr> {
    manager
        .create_table(schema.create_table_from_entity(entity).if_not_exists().to_owned())
        .await
}
