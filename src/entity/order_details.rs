use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "order_details")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub seller_order_id: Uuid,
    pub seller_id: Uuid,
    pub product_id: Uuid,
    pub variation: String,
    /// Discounted line total (`effective_price * quantity`).
    pub price: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub quantity: i32,
    pub delivery_status: String,
    pub payment_status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::seller_orders::Entity",
        from = "Column::SellerOrderId",
        to = "super::seller_orders::Column::Id"
    )]
    SellerOrders,
    #[sea_orm(
        belongs_to = "super::products::Entity",
        from = "Column::ProductId",
        to = "super::products::Column::Id"
    )]
    Products,
}

impl Related<super::seller_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellerOrders.def()
    }
}

impl Related<super::products::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Products.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
