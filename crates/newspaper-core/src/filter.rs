//! Query-string driven post filter used by the search view.
//!
//! Unknown keys and empty values are ignored. Values that do not parse are
//! dropped from the criteria and reported through [`PostFilter::errors`], so a
//! half-filled search form still returns results.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{Post, PostKind};
use crate::error::FieldError;

/// Criteria narrowing a sequence of posts. All present criteria must match.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostFilter {
    /// Case-insensitive substring of the title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<PostKind>,
    /// Inclusive lower bound on the creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_after: Option<DateTime<Utc>>,
    /// Exclusive upper bound on the creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_before: Option<DateTime<Utc>>,
    #[serde(skip)]
    errors: Vec<FieldError>,
}

impl PostFilter {
    /// Build a filter from raw query parameters. Later duplicates of a key win.
    pub fn from_params<I, K, V>(params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();

        for (key, value) in params {
            let value = value.as_ref().trim();
            if value.is_empty() {
                continue;
            }

            match key.as_ref() {
                "title" => filter.title = Some(value.to_string()),
                "category" => match Uuid::parse_str(value) {
                    Ok(id) => filter.category = Some(id),
                    Err(_) => filter.reject("category", "Enter a valid category id."),
                },
                "kind" => match value.parse() {
                    Ok(kind) => filter.kind = Some(kind),
                    Err(_) => filter.reject("kind", "Select either news or article."),
                },
                "created_after" => match parse_bound(value) {
                    Some(bound) => filter.created_after = Some(bound),
                    None => filter.reject("created_after", "Enter a valid date."),
                },
                "created_before" => match parse_bound(value) {
                    Some(bound) => filter.created_before = Some(bound),
                    None => filter.reject("created_before", "Enter a valid date."),
                },
                _ => {}
            }
        }

        filter
    }

    fn reject(&mut self, field: &'static str, message: &str) {
        self.errors.retain(|e| e.field != field);
        self.errors.push(FieldError::new(field, message));
    }

    /// Parameters that could not be used.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.category.is_none()
            && self.kind.is_none()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }

    pub fn matches(&self, post: &Post) -> bool {
        if let Some(title) = &self.title {
            if !post.title.to_lowercase().contains(&title.to_lowercase()) {
                return false;
            }
        }
        if let Some(category) = self.category {
            if !post.categories.contains(&category) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if post.kind != kind {
                return false;
            }
        }
        if let Some(after) = self.created_after {
            if post.created_at < after {
                return false;
            }
        }
        if let Some(before) = self.created_before {
            if post.created_at >= before {
                return false;
            }
        }
        true
    }

    /// Keep the matching posts, preserving their order.
    pub fn apply(&self, mut posts: Vec<Post>) -> Vec<Post> {
        if !self.is_empty() {
            posts.retain(|post| self.matches(post));
        }
        posts
    }
}

/// RFC 3339 timestamp, or a bare `YYYY-MM-DD` date meaning midnight UTC.
fn parse_bound(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn post(title: &str, kind: PostKind, age_days: i64, categories: Vec<Uuid>) -> Post {
        Post {
            id: Uuid::new_v4(),
            kind,
            title: title.to_string(),
            preview: String::new(),
            body: "body".to_string(),
            created_at: Utc::now() - Duration::days(age_days),
            categories,
        }
    }

    fn sample() -> (Vec<Post>, Uuid) {
        let tech = Uuid::new_v4();
        let posts = vec![
            post("Rust 2024 released", PostKind::News, 0, vec![tech]),
            post("Weekly sport digest", PostKind::Article, 3, vec![]),
            post("Why rust matters", PostKind::Article, 10, vec![tech]),
        ];
        (posts, tech)
    }

    fn titles(posts: &[Post]) -> Vec<&str> {
        posts.iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_empty_params_return_everything_in_order() {
        let (posts, _) = sample();
        let filter = PostFilter::from_params(Vec::<(&str, &str)>::new());
        assert!(filter.is_empty());
        assert_eq!(filter.apply(posts.clone()), posts);
    }

    #[test]
    fn test_title_is_case_insensitive() {
        let (posts, _) = sample();
        let filter = PostFilter::from_params([("title", "RUST")]);
        assert_eq!(
            titles(&filter.apply(posts)),
            vec!["Rust 2024 released", "Why rust matters"]
        );
    }

    #[test]
    fn test_criteria_combine() {
        let (posts, tech) = sample();
        let tech = tech.to_string();
        let filter = PostFilter::from_params([("category", tech.as_str()), ("kind", "article")]);
        assert_eq!(titles(&filter.apply(posts)), vec!["Why rust matters"]);
    }

    #[test]
    fn test_date_bounds() {
        let (posts, _) = sample();
        let after = (Utc::now() - Duration::days(5)).date_naive().to_string();
        let filter = PostFilter::from_params([("created_after", after.as_str())]);
        assert_eq!(
            titles(&filter.apply(posts.clone())),
            vec!["Rust 2024 released", "Weekly sport digest"]
        );

        let before = (Utc::now() - Duration::days(1)).to_rfc3339();
        let filter = PostFilter::from_params([("created_before", before.as_str())]);
        assert_eq!(
            titles(&filter.apply(posts)),
            vec!["Weekly sport digest", "Why rust matters"]
        );
    }

    #[test]
    fn test_filter_is_idempotent() {
        let (posts, _) = sample();
        let filter = PostFilter::from_params([("title", "rust"), ("kind", "news")]);
        let once = filter.apply(posts);
        let twice = filter.apply(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_invalid_values_are_reported_and_ignored() {
        let (posts, _) = sample();
        let filter = PostFilter::from_params([
            ("category", "not-a-uuid"),
            ("kind", "blog"),
            ("created_after", "yesterday"),
            ("page", "2"),
            ("title", ""),
        ]);

        assert!(filter.is_empty());
        let fields: Vec<_> = filter.errors().iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["category", "kind", "created_after"]);
        assert_eq!(filter.apply(posts.clone()), posts);
    }

    #[test]
    fn test_later_duplicate_wins() {
        let filter = PostFilter::from_params([("kind", "blog"), ("kind", "news")]);
        assert_eq!(filter.kind, Some(PostKind::News));
    }
}
