use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "seller_orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub combined_order_id: Uuid,
    pub seller_id: Uuid,
    pub user_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub shipping_address: String,
    pub payment_type: String,
    pub additional_info: Option<String>,
    pub subtotal: i64,
    pub tax: i64,
    pub shipping_cost: i64,
    pub coupon_discount: i64,
    pub grand_total: i64,
    pub delivery_status: String,
    pub payment_status: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::combined_orders::Entity",
        from = "Column::CombinedOrderId",
        to = "super::combined_orders::Column::Id"
    )]
    CombinedOrders,
    #[sea_orm(has_many = "super::order_details::Entity")]
    OrderDetails,
}

impl Related<super::combined_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CombinedOrders.def()
    }
}

impl Related<super::order_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
