use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use garde::Validate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::required;

/// Longest title a post may carry.
pub const TITLE_MAX_LEN: usize = 128;

/// Number of body characters kept in a derived preview.
pub const PREVIEW_LEN: usize = 124;

/// Classification of a post, fixed by the workflow that created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostKind {
    News,
    Article,
}

impl PostKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PostKind::News => "news",
            PostKind::Article => "article",
        }
    }
}

impl fmt::Display for PostKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "news" => Ok(PostKind::News),
            "article" => Ok(PostKind::Article),
            other => Err(format!("unknown post kind '{other}'")),
        }
    }
}

/// Post entity - a news item or an article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub kind: PostKind,
    pub title: String,
    pub preview: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Ids of the attached categories.
    pub categories: Vec<Uuid>,
}

impl Post {
    /// Create a new post from a validated draft.
    ///
    /// Categories are not copied from the draft: attaching them is a separate
    /// step because it may notify subscribers.
    pub fn new(kind: PostKind, draft: &PostDraft) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            title: draft.title.trim().to_string(),
            preview: draft.resolved_preview(),
            body: draft.body.clone(),
            created_at: Utc::now(),
            categories: Vec::new(),
        }
    }

    /// Overwrite the editable fields. Kind, creation time and categories stay as they are.
    pub fn apply(&mut self, draft: &PostDraft) {
        self.title = draft.title.trim().to_string();
        self.preview = draft.resolved_preview();
        self.body = draft.body.clone();
    }
}

/// Editable fields of a post as submitted by an editor.
///
/// Category existence is checked by the service, not here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PostDraft {
    #[garde(custom(required), length(chars, max = TITLE_MAX_LEN))]
    pub title: String,
    #[serde(default)]
    #[garde(skip)]
    pub preview: Option<String>,
    #[garde(custom(required))]
    pub body: String,
    #[serde(default)]
    #[garde(skip)]
    pub categories: Vec<Uuid>,
}

impl PostDraft {
    fn resolved_preview(&self) -> String {
        match self.preview.as_deref().map(str::trim) {
            Some(preview) if !preview.is_empty() => preview.to_string(),
            _ => derive_preview(&self.body),
        }
    }
}

impl From<&Post> for PostDraft {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            preview: Some(post.preview.clone()),
            body: post.body.clone(),
            categories: post.categories.clone(),
        }
    }
}

/// Short teaser built from the start of the body.
pub fn derive_preview(body: &str) -> String {
    let mut chars = body.chars();
    let head: String = chars.by_ref().take(PREVIEW_LEN).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}
