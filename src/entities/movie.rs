use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub description: String,
    pub released_at: String,
    pub rating: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::movie_category::Entity")]
    MovieCategory,
}

impl Related<super::movie_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MovieCategory.def()
    }
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        super::movie_category::Relation::Category.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::movie_category::Relation::Movie.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
