use sea_orm::entity::prelude::*;

/// Catalog row. Only `current_stock` and `num_of_sale` are written by checkout.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub seller_id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
    pub unit_price: i64,
    /// Basis points when `discount_type` is `percent`, minor units otherwise.
    pub discount: i64,
    pub discount_type: String,
    pub tax: i64,
    pub tax_type: String,
    pub shipping_cost: i64,
    pub current_stock: i64,
    pub num_of_sale: i64,
    pub published: bool,
    pub approved: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cart_items::Entity")]
    CartItems,
    #[sea_orm(has_many = "super::order_details::Entity")]
    OrderDetails,
}

impl Related<super::cart_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
