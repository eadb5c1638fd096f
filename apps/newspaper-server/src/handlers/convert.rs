//! Domain to DTO conversions.

use newspaper_core::domain::{Category, Post};
use newspaper_core::{Dispatch, Page, PostFilter};
use newspaper_shared::dto::{
    CategoryResponse, NotificationSummary, PageResponse, PostResponse, SearchCriteria,
};

pub fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        kind: post.kind.to_string(),
        title: post.title,
        preview: post.preview,
        body: post.body,
        created_at: post.created_at,
        categories: post.categories,
    }
}

pub fn page_response<T, U>(page: Page<T>, f: impl FnMut(T) -> U) -> PageResponse<U> {
    let page = page.map(f);
    PageResponse {
        items: page.items,
        page: page.page,
        per_page: page.per_page,
        total: page.total,
        total_pages: page.total_pages,
        has_next: page.has_next,
        has_previous: page.has_previous,
    }
}

pub fn notification_summary(dispatch: &Dispatch) -> NotificationSummary {
    let (status, recipients) = match dispatch {
        Dispatch::Sent { recipients } => ("sent", *recipients),
        Dispatch::Skipped => ("skipped", 0),
        Dispatch::Ignored => ("none", 0),
    };
    NotificationSummary {
        status: status.to_string(),
        recipients,
    }
}

pub fn search_criteria(filter: &PostFilter) -> SearchCriteria {
    SearchCriteria {
        title: filter.title.clone(),
        category: filter.category,
        kind: filter.kind.map(|k| k.to_string()),
        created_after: filter.created_after,
        created_before: filter.created_before,
    }
}

pub fn category_response(category: Category) -> CategoryResponse {
    CategoryResponse {
        id: category.id,
        subscriber_count: category.subscribers.len(),
        name: category.name,
    }
}
