use sea_orm::entity::prelude::*;

/// One row per accepted idempotency key, unique per `(user_id, idempotency_key)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "checkout_submissions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub idempotency_key: String,
    pub combined_order_id: Uuid,
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
}

impl Related<super::combined_orders::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CombinedOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
