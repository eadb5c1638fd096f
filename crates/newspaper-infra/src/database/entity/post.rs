//! Post entity for SeaORM.

use sea_orm::Set;
use sea_orm::sea_query::StringLen;
use sea_orm::entity::prelude::*;

use newspaper_core::domain::{Post, PostKind};

/// Stored form of [`PostKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Kind {
    #[sea_orm(string_value = "news")]
    News,
    #[sea_orm(string_value = "article")]
    Article,
}

impl From<PostKind> for Kind {
    fn from(kind: PostKind) -> Self {
        match kind {
            PostKind::News => Kind::News,
            PostKind::Article => Kind::Article,
        }
    }
}

impl From<Kind> for PostKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::News => PostKind::News,
            Kind::Article => PostKind::Article,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "posts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub kind: Kind,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub preview: String,
    #[sea_orm(column_type = "Text")]
    pub body: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::post_category::Entity")]
    PostCategory,
}

impl Related<super::post_category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PostCategory.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Convert to the domain post, given its attached category ids.
    pub fn into_domain(self, categories: Vec<Uuid>) -> Post {
        Post {
            id: self.id,
            kind: self.kind.into(),
            title: self.title,
            preview: self.preview,
            body: self.body,
            created_at: self.created_at.into(),
            categories,
        }
    }
}

/// Conversion from Domain Post to SeaORM ActiveModel. Category links are not columns.
impl From<&Post> for ActiveModel {
    fn from(post: &Post) -> Self {
        Self {
            id: Set(post.id),
            kind: Set(post.kind.into()),
            title: Set(post.title.clone()),
            preview: Set(post.preview.clone()),
            body: Set(post.body.clone()),
            created_at: Set(post.created_at.into()),
        }
    }
}
