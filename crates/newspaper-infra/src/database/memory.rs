//! In-memory post store and category registry.
//!
//! Used when no database is configured and in tests.
//! Note: Data is lost on process restart.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use newspaper_core::domain::{Category, Post};
use newspaper_core::error::RepoError;
use newspaper_core::ports::{BaseRepository, CategoryRepository, PostRepository};

/// In-memory post store keyed by post id.
#[derive(Default)]
pub struct InMemoryPostRepository {
    posts: RwLock<HashMap<Uuid, Post>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        Ok(self.posts.read().await.get(&id).cloned())
    }

    async fn save(&self, mut entity: Post) -> Result<Post, RepoError> {
        let mut posts = self.posts.write().await;
        entity.categories = posts
            .get(&entity.id)
            .map(|stored| stored.categories.clone())
            .unwrap_or_default();
        posts.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.posts.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError> {
        let mut posts: Vec<Post> = self.posts.read().await.values().cloned().collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(posts)
    }

    async fn attach_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;

        let mut added = Vec::new();
        for id in category_ids {
            if !post.categories.contains(id) {
                post.categories.push(*id);
                added.push(*id);
            }
        }
        Ok(added)
    }

    async fn detach_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts.get_mut(&post_id).ok_or(RepoError::NotFound)?;

        let removed: Vec<Uuid> = category_ids
            .iter()
            .filter(|id| post.categories.contains(id))
            .copied()
            .collect();
        post.categories.retain(|id| !removed.contains(id));
        Ok(removed)
    }
}

/// In-memory category registry keyed by category id.
#[derive(Default)]
pub struct InMemoryCategoryRepository {
    categories: RwLock<HashMap<Uuid, Category>>,
}

impl InMemoryCategoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryCategoryRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Category>, RepoError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn save(&self, mut entity: Category) -> Result<Category, RepoError> {
        let mut categories = self.categories.write().await;

        if categories
            .values()
            .any(|c| c.id != entity.id && c.name == entity.name)
        {
            return Err(RepoError::Constraint(format!(
                "category name '{}' is taken",
                entity.name
            )));
        }

        entity.subscribers = categories
            .get(&entity.id)
            .map(|stored| stored.subscribers.clone())
            .unwrap_or_default();
        categories.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        match self.categories.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(RepoError::NotFound),
        }
    }
}

#[async_trait]
impl CategoryRepository for InMemoryCategoryRepository {
    async fn list(&self) -> Result<Vec<Category>, RepoError> {
        let mut categories: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let categories = self.categories.read().await;
        Ok(ids.iter().filter_map(|id| categories.get(id).cloned()).collect())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError> {
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn add_subscriber(&self, category_id: Uuid, email: &str) -> Result<bool, RepoError> {
        let mut categories = self.categories.write().await;
        let category = categories.get_mut(&category_id).ok_or(RepoError::NotFound)?;
        Ok(category.subscribe(email))
    }

    async fn remove_subscriber(&self, category_id: Uuid, email: &str) -> Result<bool, RepoError> {
        let mut categories = self.categories.write().await;
        let category = categories.get_mut(&category_id).ok_or(RepoError::NotFound)?;
        Ok(category.unsubscribe(email))
    }
}
