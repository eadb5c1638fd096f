use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post store.
///
/// `save` persists the post's own columns only; the category links are
/// managed with `attach_categories` / `detach_categories`, and the returned
/// post carries the links currently stored.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Every post, most recent first.
    async fn list_recent(&self) -> Result<Vec<Post>, RepoError>;

    /// Link categories to a post. Returns the ids that were not linked before,
    /// in the order they were given.
    async fn attach_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError>;

    /// Unlink categories from a post. Returns the ids that were actually linked.
    async fn detach_categories(
        &self,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, RepoError>;
}

/// Category registry.
///
/// `save` persists the name only; subscribers go through
/// `add_subscriber` / `remove_subscriber`.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    /// All categories ordered by name.
    async fn list(&self) -> Result<Vec<Category>, RepoError>;

    /// Categories with the given ids, in the order of `ids`. Unknown ids are skipped.
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Category>, RepoError>;

    /// Returns `false` when the address was already subscribed.
    async fn add_subscriber(&self, category_id: Uuid, email: &str) -> Result<bool, RepoError>;

    /// Returns `false` when the address was not subscribed.
    async fn remove_subscriber(&self, category_id: Uuid, email: &str)
    -> Result<bool, RepoError>;
}
