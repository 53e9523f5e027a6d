use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "combined_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    /// JSON snapshot of the shipping address at checkout time.
    pub shipping_address: String,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_total: i64,
    pub item_discount_total: i64,
    pub coupon_discount: i64,
    pub grand_total: i64,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::seller_orders::Entity")]
    SellerOrders,
}

impl Related<super::seller_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SellerOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
