//! Category listing and email subscriptions.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use newspaper_shared::ApiResponse;
use newspaper_shared::dto::{CreateCategoryRequest, SubscriptionRequest, SubscriptionResponse};

use super::convert::category_response;
use crate::middleware::auth::{Authorized, CategoryEditor};
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /categories/
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories = state.news.list_categories().await?;
    let body: Vec<_> = categories.into_iter().map(category_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /categories/
pub async fn create(
    editor: Authorized<CategoryEditor>,
    state: web::Data<AppState>,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let category = state.news.create_category(editor.caller(), &body.name).await?;
    Ok(HttpResponse::Created().json(ApiResponse::ok(category_response(category))))
}

/// POST /categories/{id}/subscribe
pub async fn subscribe(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let category_id = path.into_inner();
    let changed = state.news.subscribe(category_id, &body.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SubscriptionResponse {
        category_id,
        subscribed: true,
        changed,
    })))
}

/// POST /categories/{id}/unsubscribe
pub async fn unsubscribe(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let category_id = path.into_inner();
    let changed = state.news.unsubscribe(category_id, &body.email).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(SubscriptionResponse {
        category_id,
        subscribed: false,
        changed,
    })))
}
