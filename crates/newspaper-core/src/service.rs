//! Application service behind every view.
//!
//! Each mutating operation checks the caller's permissions before touching
//! any repository. Category additions are routed to the
//! [`NotificationDispatcher`] in the same unit of work; a delivery failure is
//! reported after the mutation has been committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use garde::Validate;
use uuid::Uuid;

use crate::domain::{
    Caller, Category, NewCategory, POST_EDITOR, Permission, Post, PostDraft, PostKind, Subscription,
};
use crate::error::{DomainError, FieldError, RepoError, field_errors};
use crate::filter::PostFilter;
use crate::notify::{CategoryChange, Dispatch, NotificationDispatcher};
use crate::pagination::{Page, PageRequest};
use crate::ports::{CategoryRepository, PostRepository};

/// A page of the post list together with the server time.
#[derive(Debug, Clone)]
pub struct PostListing {
    pub page: Page<Post>,
    pub time_now: DateTime<Utc>,
}

/// A page of search results and the filter that produced it.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub page: Page<Post>,
    pub filter: PostFilter,
}

/// A post after a mutation, with what happened to the notification.
#[derive(Debug, Clone)]
pub struct PostChange {
    pub post: Post,
    pub notification: Dispatch,
}

#[derive(Clone)]
pub struct NewsService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    dispatcher: NotificationDispatcher,
}

impl NewsService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            posts,
            categories,
            dispatcher,
        }
    }

    pub async fn list(&self, page: PageRequest) -> Result<PostListing, DomainError> {
        let posts = self.posts.list_recent().await?;
        Ok(PostListing {
            page: Page::paginate(posts, page)?,
            time_now: Utc::now(),
        })
    }

    pub async fn detail(&self, id: Uuid) -> Result<Post, DomainError> {
        self.posts
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Post",
                id,
            })
    }

    pub async fn search(
        &self,
        filter: PostFilter,
        page: PageRequest,
    ) -> Result<SearchResults, DomainError> {
        let posts = filter.apply(self.posts.list_recent().await?);
        Ok(SearchResults {
            page: Page::paginate(posts, page)?,
            filter,
        })
    }

    /// Load a post for an editor, e.g. to prefill the edit or delete form.
    pub async fn editable(&self, caller: &Caller, id: Uuid) -> Result<Post, DomainError> {
        caller.require(&POST_EDITOR)?;
        self.detail(id).await
    }

    /// Publish a new post of `kind` and attach the categories named in the draft.
    pub async fn create(
        &self,
        caller: &Caller,
        kind: PostKind,
        draft: PostDraft,
    ) -> Result<PostChange, DomainError> {
        caller.require(&POST_EDITOR)?;
        let category_ids = self.validate_draft(&draft).await?;

        let post = self.posts.save(Post::new(kind, &draft)).await?;
        tracing::info!(post_id = %post.id, kind = %kind, "Post created");

        self.attach(post, &category_ids).await
    }

    /// Replace the editable fields and the category set of a post.
    pub async fn update(
        &self,
        caller: &Caller,
        id: Uuid,
        draft: PostDraft,
    ) -> Result<PostChange, DomainError> {
        caller.require(&POST_EDITOR)?;
        let mut post = self.detail(id).await?;
        let wanted = self.validate_draft(&draft).await?;

        let removed: Vec<Uuid> = post
            .categories
            .iter()
            .filter(|id| !wanted.contains(id))
            .copied()
            .collect();

        post.apply(&draft);
        let mut post = self.posts.save(post).await?;
        tracing::info!(post_id = %post.id, "Post updated");

        if !removed.is_empty() {
            post = self.detach(post, &removed).await?;
        }
        self.attach(post, &wanted).await
    }

    pub async fn delete(&self, caller: &Caller, id: Uuid) -> Result<(), DomainError> {
        caller.require(&POST_EDITOR)?;
        self.posts.delete(id).await.map_err(|e| match e {
            RepoError::NotFound => DomainError::NotFound {
                entity_type: "Post",
                id,
            },
            other => other.into(),
        })?;
        tracing::info!(post_id = %id, "Post deleted");
        Ok(())
    }

    /// Attach categories to an existing post, notifying subscribers of the
    /// categories that were not attached before.
    pub async fn attach_categories(
        &self,
        caller: &Caller,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<PostChange, DomainError> {
        caller.require(&POST_EDITOR)?;
        let post = self.detail(post_id).await?;
        let ids = self.existing_categories(category_ids).await?;
        self.attach(post, &ids).await
    }

    pub async fn detach_categories(
        &self,
        caller: &Caller,
        post_id: Uuid,
        category_ids: &[Uuid],
    ) -> Result<Post, DomainError> {
        caller.require(&POST_EDITOR)?;
        let post = self.detail(post_id).await?;
        self.detach(post, &dedup(category_ids)).await
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self.categories.list().await?)
    }

    pub async fn create_category(&self, caller: &Caller, name: &str) -> Result<Category, DomainError> {
        caller.require(&[Permission::AddCategory])?;
        let input = NewCategory::new(name);
        input.validate(&())?;

        let category = Category::new(input.name);
        if self.categories.find_by_name(&category.name).await?.is_some() {
            return Err(DomainError::Duplicate(format!(
                "category '{}' already exists",
                category.name
            )));
        }

        let category = self.categories.save(category).await.map_err(|e| match e {
            RepoError::Constraint(msg) => DomainError::Duplicate(msg),
            other => other.into(),
        })?;
        tracing::info!(category_id = %category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Subscribe an address to a category. Returns `false` if it already was.
    /// Addresses are stored lowercased.
    pub async fn subscribe(&self, category_id: Uuid, email: &str) -> Result<bool, DomainError> {
        let subscription = Subscription::new(email);
        subscription.validate(&())?;

        self.category(category_id).await?;
        Ok(self
            .categories
            .add_subscriber(category_id, &subscription.email)
            .await?)
    }

    /// Returns `false` if the address was not subscribed.
    pub async fn unsubscribe(&self, category_id: Uuid, email: &str) -> Result<bool, DomainError> {
        self.category(category_id).await?;
        Ok(self
            .categories
            .remove_subscriber(category_id, &Subscription::new(email).email)
            .await?)
    }

    async fn category(&self, id: Uuid) -> Result<Category, DomainError> {
        self.categories
            .find_by_id(id)
            .await?
            .ok_or(DomainError::NotFound {
                entity_type: "Category",
                id,
            })
    }

    /// Validate the form fields and the category choices together.
    async fn validate_draft(&self, draft: &PostDraft) -> Result<Vec<Uuid>, DomainError> {
        let mut errors = draft.validate(&()).err().map(field_errors).unwrap_or_default();
        let ids = dedup(&draft.categories);
        let found = self.categories.find_by_ids(&ids).await?;

        errors.extend(unknown_categories(&ids, &found));
        if errors.is_empty() {
            Ok(ids)
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    async fn existing_categories(&self, ids: &[Uuid]) -> Result<Vec<Uuid>, DomainError> {
        let ids = dedup(ids);
        let found = self.categories.find_by_ids(&ids).await?;
        let errors = unknown_categories(&ids, &found);
        if errors.is_empty() {
            Ok(ids)
        } else {
            Err(DomainError::Validation(errors))
        }
    }

    async fn attach(&self, mut post: Post, ids: &[Uuid]) -> Result<PostChange, DomainError> {
        if ids.is_empty() {
            return Ok(PostChange {
                post,
                notification: Dispatch::Ignored,
            });
        }

        let added = self.posts.attach_categories(post.id, ids).await?;
        post.categories.extend(added.iter().copied());
        if added.is_empty() {
            return Ok(PostChange {
                post,
                notification: Dispatch::Ignored,
            });
        }

        let categories = self.categories.find_by_ids(&added).await?;
        let notification = self
            .dispatcher
            .handle(&post, &CategoryChange::Added(categories))
            .await?;

        Ok(PostChange { post, notification })
    }

    async fn detach(&self, mut post: Post, ids: &[Uuid]) -> Result<Post, DomainError> {
        let removed = self.posts.detach_categories(post.id, ids).await?;
        post.categories.retain(|id| !removed.contains(id));

        if !removed.is_empty() {
            let categories = self.categories.find_by_ids(&removed).await?;
            self.dispatcher
                .handle(&post, &CategoryChange::Removed(categories))
                .await?;
        }
        Ok(post)
    }
}

fn dedup(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

fn unknown_categories(ids: &[Uuid], found: &[Category]) -> Vec<FieldError> {
    ids.iter()
        .filter(|id| !found.iter().any(|c| c.id == **id))
        .map(|id| {
            FieldError::new(
                "categories",
                format!("Select a valid choice. {id} is not one of the available choices."),
            )
        })
        .collect()
}
