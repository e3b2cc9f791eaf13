use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub external_id: Uuid,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    /// Subject id issued by the identity provider.
    #[sea_orm(unique)]
    pub identity_id: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::word::Entity")]
    Words,
}

impl Related<super::word::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Words.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
