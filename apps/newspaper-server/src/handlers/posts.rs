//! Post views: list, detail, search and the editor forms.

use actix_web::{HttpResponse, http::header, web};
use serde::Deserialize;
use uuid::Uuid;

use newspaper_core::domain::{PostDraft, PostKind};
use newspaper_core::service::PostChange;
use newspaper_core::{PageRequest, PostFilter};
use newspaper_shared::ApiResponse;
use newspaper_shared::dto::{
    CategoryIdsRequest, PostChangeResponse, PostForm, PostListResponse, SearchResponse,
};

use super::convert::{notification_summary, page_response, post_response, search_criteria};
use crate::middleware::auth::{Authorized, PostEditor};
use crate::middleware::error::{AppResult, field_errors};
use crate::state::AppState;

/// Where editors land after a successful change.
pub const POST_LIST_PATH: &str = "/news/";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    page: Option<String>,
}

fn draft(form: PostForm) -> PostDraft {
    PostDraft {
        title: form.title,
        preview: form.preview,
        body: form.body,
        categories: form.categories,
    }
}

fn change_response(change: PostChange) -> PostChangeResponse {
    PostChangeResponse {
        notification: notification_summary(&change.notification),
        post: post_response(change.post),
    }
}

fn see_other<T: serde::Serialize>(body: ApiResponse<T>) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, POST_LIST_PATH))
        .json(body)
}

/// GET /news/
pub async fn list(state: web::Data<AppState>, query: web::Query<PageQuery>) -> AppResult<HttpResponse> {
    let page = PageRequest::parse(query.page.as_deref())?;
    let listing = state.news.list(page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostListResponse {
        posts: page_response(listing.page, post_response),
        time_now: listing.time_now,
    })))
}

/// GET /news/{id}
pub async fn detail(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.news.detail(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// GET /news/search
pub async fn search(
    state: web::Data<AppState>,
    query: web::Query<Vec<(String, String)>>,
) -> AppResult<HttpResponse> {
    let params = query.into_inner();
    let page = params
        .iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str());
    let page = PageRequest::parse(page)?;

    let filter = PostFilter::from_params(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let results = state.news.search(filter, page).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SearchResponse {
        news: page_response(results.page, post_response),
        filter: search_criteria(&results.filter),
        errors: field_errors(results.filter.errors().to_vec()),
    })))
}

/// GET /news/create and /news/articles/create
pub async fn create_form(_editor: Authorized<PostEditor>) -> AppResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::ok(PostForm::default())))
}

async fn create(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    kind: PostKind,
    form: PostForm,
) -> AppResult<HttpResponse> {
    let change = state.news.create(editor.caller(), kind, draft(form)).await?;
    Ok(see_other(ApiResponse::ok_with_message(
        change_response(change),
        format!("{kind} published"),
    )))
}

/// POST /news/create
pub async fn create_news(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    create(editor, state, PostKind::News, body.into_inner()).await
}

/// POST /news/articles/create
pub async fn create_article(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    create(editor, state, PostKind::Article, body.into_inner()).await
}

/// GET /news/{id}/edit/
pub async fn edit_form(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.news.editable(editor.caller(), path.into_inner()).await?;
    let form = PostForm {
        title: post.title,
        preview: Some(post.preview),
        body: post.body,
        categories: post.categories,
    };
    Ok(HttpResponse::Ok().json(ApiResponse::ok(form)))
}

/// POST /news/{id}/edit/
pub async fn update(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostForm>,
) -> AppResult<HttpResponse> {
    let change = state
        .news
        .update(editor.caller(), path.into_inner(), draft(body.into_inner()))
        .await?;
    Ok(see_other(ApiResponse::ok_with_message(
        change_response(change),
        "Post updated",
    )))
}

/// GET /news/{id}/delete/
pub async fn delete_confirm(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = state.news.editable(editor.caller(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}

/// POST /news/{id}/delete/
pub async fn delete(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.news.delete(editor.caller(), id).await?;
    Ok(see_other(ApiResponse::ok_with_message(id, "Post deleted")))
}

/// POST /news/{id}/categories
pub async fn attach(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryIdsRequest>,
) -> AppResult<HttpResponse> {
    let change = state
        .news
        .attach_categories(editor.caller(), path.into_inner(), &body.categories)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(change_response(change))))
}

/// DELETE /news/{id}/categories
pub async fn detach(
    editor: Authorized<PostEditor>,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<CategoryIdsRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .news
        .detach_categories(editor.caller(), path.into_inner(), &body.categories)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(post))))
}
