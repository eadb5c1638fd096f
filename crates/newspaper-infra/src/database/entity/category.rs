//! Category entity for SeaORM.

use sea_orm::Set;
use sea_orm::entity::prelude::*;

use newspaper_core::domain::Category;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
    #[sea_orm(has_many = "super::category_subscriber::Entity")]
    Subscriber,
}

impl Related<super::post_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostCategory.def()
    }
}

impl Related<super::category_subscriber::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Subscriber.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn into_domain(self, subscribers: Vec<String>) -> Category {
        Category {
            id: self.id,
            name: self.name,
            subscribers,
        }
    }
}

impl From<&Category> for ActiveModel {
    fn from(category: &Category) -> Self {
        Self {
            id: Set(category.id),
            name: Set(category.name.clone()),
        }
    }
}
