//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::response::FieldErrorResponse;

/// Create/update form for a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostForm {
    pub title: String,
    /// Derived from the body when omitted or blank.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview: Option<String>,
    pub body: String,
    #[serde(default)]
    pub categories: Vec<Uuid>,
}

/// A post as shown to readers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub preview: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub categories: Vec<Uuid>,
}

/// One page of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

/// Body of the post list view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: PageResponse<PostResponse>,
    pub time_now: DateTime<Utc>,
}

/// Criteria the search view actually applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchCriteria {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
}

/// Body of the search view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub news: PageResponse<PostResponse>,
    pub filter: SearchCriteria,
    /// Parameters that were ignored because they did not parse.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldErrorResponse>,
}

/// What happened to the subscriber notification after a mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSummary {
    /// `sent`, `skipped` (no subscribers) or `none` (nothing was added).
    pub status: String,
    pub recipients: usize,
}

/// A post after create/update/attach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostChangeResponse {
    pub post: PostResponse,
    pub notification: NotificationSummary,
}

/// Category ids to attach to or detach from a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryIdsRequest {
    pub categories: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
    pub subscriber_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub category_id: Uuid,
    pub subscribed: bool,
    /// False when the request did not change anything.
    pub changed: bool,
}
