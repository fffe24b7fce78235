use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "imei_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub imei: String,
    /// Name of the party the handset was bought from.
    pub purchase: String,
    pub amount: i64,
    pub date: Option<Date>,
    /// Free-text snapshot of the brand name, not a foreign key.
    pub brand: String,
    pub model: String,
    pub color: String,
    pub ram: String,
    pub storage: String,
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::sold_records::Entity")]
    SoldRecords,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::sold_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SoldRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
