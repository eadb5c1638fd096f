//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DbConn, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use newspaper_core::domain::{Category, Post};
use newspaper_core::error::RepoError;
use newspaper_core::ports::{BaseRepository, CategoryRepository, PostRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::category_subscriber::{self, Entity as SubscriberEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL post store.
pub struct PostgresPostRepository {
    base: PostgresBaseRepository<PostEntity>,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            base: PostgresBaseRepository::new(db),
        }
    }

    fn db(&self) -> &DbConn {
        &self.base.db
    }

    /// Category ids linked to each of the given posts.
    async fn links(&self, post_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<Uuid>>, RepoError> {
        let mut links: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        if post_ids.is_empty() {
            return Ok(links);
        }

        let rows = PostCategoryEntity::find()
            .filter(post_category::Column::PostId.is_in(post_ids.iter().copied()))
            .all(self.db())
            .await
            .map_err(query_error)?;

        for row in rows {
            links.entry(row.post_id).or_default().push(row.category_id);
        }
        Ok(links)
    }

    async fn linked_ids(&self, post_id: Uuid) -> Result<Vec<Uuid>, RepoError> {
        Ok(self
            .links(&[post_id])
            .await?
            .remove(&post_id)
            .unwrap_or_default())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        match self.base.find_model(id).await? {
            Some(model) => {
                let categories = self.linked_ids(id).await?;
                Ok(Some(model.into_domain(categories)))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let exists = self.base.find_model(entity.id).await?.is_some();
        let model = self
            .base
            .persist(post::ActiveModel::from(&entity), exists)
            .await?;

        let categories = self.linked_ids(model.id).await?;
        Ok(model.into_domain(categories))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        // Links go with the post through the ON DELETE CASCADE foreign key.
        self.base.delete_by_id(id).await
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .order_by_asc(post::Column::Id)
            .all(self.db())
            .await
            .map_err(query_error)?;

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut links = self.links(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let categories = links.remove(&m.id).unwrap_or_default();
                m.into_domain(categories)
            })
            .collect())
    }

    async fn attach_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError> {
        let linked = self.linked_ids(post_id).await?;
        let candidates = category_ids.iter().filter(|id| !linked.contains(id));

        // A link inserted concurrently since the read above counts as not added.
        let mut added = Vec::new();
        for category_id in candidates {
            let row = post_category::ActiveModel {
                post_id: Set(post_id),
                category_id: Set(*category_id),
            };
            let inserted = PostCategoryEntity::insert(row)
                .on_conflict(
                    OnConflict::columns([
                        post_category::Column::PostId,
                        post_category::Column::CategoryId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .exec_without_returning(self.db())
                .await
                .map_err(write_error)?;
            if inserted > 0 {
                added.push(*category_id);
            }
        }

        if !added.is_empty() {
            tracing::debug!(post_id = %post_id, added = added.len(), "Categories attached");
        }
        Ok(added)
    }

    async fn detach_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError> {
        let linked = self.linked_ids(post_id).await?;
        let removed: Vec<Uuid> = category_ids
            .iter()
            .filter(|id| linked.contains(id))
            .copied()
            .collect();

        if removed.is_empty() {
            return Ok(removed);
        }

        PostCategoryEntity::delete_many()
            .filter(post_category::Column::PostId.eq(post_id))
            .filter(post_category::Column::CategoryId.is_in(removed.iter().copied()))
            .exec(self.db())
            .await
            .map_err(query_error)?;

        tracing::debug!(post_id = %post_id, removed = removed.len(), "Categories detached");
        Ok(removed)
    }
}

/// PostgreSQL category registry.
pub struct PostgresCategoryRepository {
    base: PostgresBaseRepository<CategoryEntity>,
}

impl PostgresCategoryRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            base: PostgresBaseRepository::new(db),
        }
    }

    fn db(&self) -> &DbConn {
        &self.base.db
    }

    /// Subscribers of each category, in subscription order.
    async fn subscribers(
        &self,
        category_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<String>>, RepoError> {
        let mut subscribers: HashMap<Uuid, Vec<String>> = HashMap::new();
        if category_ids.is_empty() {
            return Ok(subscribers);
        }

        let rows = SubscriberEntity::find()
            .filter(category_subscriber::Column::CategoryId.is_in(category_ids.iter().copied()))
            .order_by_asc(category_subscriber::Column::SubscribedAt)
            .all(self.db())
            .await
            .map_err(query_error)?;

        for row in rows {
            subscribers.entry(row.category_id).or_default().push(row.email);
        }
        Ok(subscribers)
    }

    async fn hydrate(&self, models: Vec<category::Model>) -> Result<Vec<Category>, RepoError> {
        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let mut subscribers = self.subscribers(&ids).await?;

        Ok(models
            .into_iter()
            .map(|m| {
                let emails = subscribers.remove(&m.id).unwrap_or_default();
                m.into_domain(emails)
            })
            .collect())
    }

    async fn find_subscription(
        &self,
        category_id: Uuid,
        email: &str,
    ) -> Result<Option<category_subscriber::Model>, RepoError> {
        SubscriberEntity::find()
            .filter(category_subscriber::Column::CategoryId.eq(category_id))
            .filter(category_subscriber::Column::Email.eq(email))
            .one(self.db())
            .await
            .map_err(query_error)
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for PostgresCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        match self.base.find_model(id).await? {
            Some(model) => Ok(self.hydrate(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, entity: Category) -> Result<Category, RepoError> {
        let exists = self.base.find_model(entity.id).await?.is_some();
        let model = self
            .base
            .persist(category::ActiveModel::from(&entity), exists)
            .await?;

        Ok(self.hydrate(vec![model]).await?.pop().unwrap_or(entity))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.base.delete_by_id(id).await
    }
}

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let models = CategoryEntity::find()
            .order_by_asc(category::Column::Name)
            .all(self.db())
            .await
            .map_err(query_error)?;

        self.hydrate(models).await
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(self.db())
            .await
            .map_err(query_error)?;

        let mut found = self.hydrate(models).await?;
        let mut ordered = Vec::with_capacity(found.len());
        for id in ids {
            if let Some(pos) = found.iter().position(|c| c.id == *id) {
                ordered.push(found.swap_remove(pos));
            }
        }
        Ok(ordered)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        let model = CategoryEntity::find()
            .filter(category::Column::Name.eq(name))
            .one(self.db())
            .await
            .map_err(query_error)?;

        match model {
            Some(model) => Ok(self.hydrate(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn add_subscriber(&self, category_id: Uuid, email: &str) -> Result<bool, RepoError> {
        if self.find_subscription(category_id, email).await?.is_some() {
            return Ok(false);
        }

        let row = category_subscriber::ActiveModel {
            category_id: Set(category_id),
            email: Set(email.to_string()),
            subscribed_at: Set(Utc::now().into()),
        };
        SubscriberEntity::insert(row)
            .exec_without_returning(self.db())
            .await
            .map_err(write_error)?;

        tracing::debug!(category_id = %category_id, "Subscriber added");
        Ok(true)
    }

    async fn remove_subscriber(&self, category_id: Uuid, email: &str) -> Result<bool, RepoError> {
        let result = SubscriberEntity::delete_many()
            .filter(category_subscriber::Column::CategoryId.eq(category_id))
            .filter(category_subscriber::Column::Email.eq(email))
            .exec(self.db())
            .await
            .map_err(query_error)?;

        Ok(result.rows_affected > 0)
    }
}
