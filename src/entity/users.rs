use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub password_hash: String,
    pub role: String,
    /// Raw stored shape; run it through `normalize_permissions` before use.
    pub permissions: Option<Json>,
    /// For staff, the admin whose company they belong to.
    pub created_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::imei_records::Entity")]
    ImeiRecords,
    #[sea_orm(has_many = "super::sold_records::Entity")]
    SoldRecords,
}

impl Related<super::imei_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ImeiRecords.def()
    }
}

impl Related<super::sold_records::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SoldRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
