use std::sync::Arc;

use actix_web::http::{StatusCode, header};
use actix_web::middleware::NormalizePath;
use actix_web::{App, test, web};
use serde_json::{Value, json};

use newspaper_core::NotificationConfig;
use newspaper_core::ports::TokenService;
use newspaper_infra::{InMemoryMailer, JwtConfig, JwtTokenService};

use super::configure_routes;
use super::posts::POST_LIST_PATH;
use crate::middleware::error::{json_config, path_config};
use crate::state::AppState;

struct Fixture {
    state: AppState,
    mailer: Arc<InMemoryMailer>,
    tokens: Arc<JwtTokenService>,
}

impl Fixture {
    fn new() -> Self {
        let mailer = Arc::new(InMemoryMailer::new());
        let tokens = Arc::new(JwtTokenService::new(JwtConfig::default()));
        let state = AppState::in_memory(
            NotificationConfig::new("http://news.test/", "news@test"),
            mailer.clone(),
            tokens.clone(),
        );
        Self { state, mailer, tokens }
    }

    fn token(&self, permissions: &[&str]) -> String {
        let perms = permissions.iter().map(|p| p.to_string()).collect();
        let token = self.tokens.generate_token("editor", perms).unwrap();
        format!("Bearer {token}")
    }

    fn editor(&self) -> String {
        self.token(&[
            "news.add_post",
            "news.change_post",
            "news.delete_post",
            "news.add_category",
        ])
    }
}

macro_rules! init_app {
    ($fixture:expr) => {
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data(web::Data::new($fixture.state.clone()))
                .app_data(json_config())
                .app_data(path_config())
                .configure(configure_routes),
        )
        .await
    };
}

fn post_form(title: &str, preview: &str, categories: &[&str]) -> Value {
    json!({
        "title": title,
        "preview": preview,
        "body": format!("Body of {title}"),
        "categories": categories,
    })
}

#[actix_web::test]
async fn test_health_check() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_empty_list_and_page_bounds() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let res = test::call_service(&app, test::TestRequest::get().uri("/news/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["posts"]["page"], 1);
    assert_eq!(body["data"]["posts"]["items"], json!([]));
    assert!(body["data"]["time_now"].is_string());

    for uri in ["/news/?page=2", "/news/?page=0", "/news/?page=abc"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[actix_web::test]
async fn test_create_requires_permissions() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let anonymous = test::TestRequest::post()
        .uri("/news/create/")
        .set_json(post_form("T", "P", &[]))
        .to_request();
    assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::FORBIDDEN);

    let partial = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.token(&["news.add_post"])))
        .set_json(post_form("T", "P", &[]))
        .to_request();
    assert_eq!(test::call_service(&app, partial).await.status(), StatusCode::FORBIDDEN);

    let bad_token = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, "Bearer not-a-token"))
        .set_json(post_form("T", "P", &[]))
        .to_request();
    assert_eq!(test::call_service(&app, bad_token).await.status(), StatusCode::UNAUTHORIZED);

    let form = test::TestRequest::get().uri("/news/create/").to_request();
    assert_eq!(test::call_service(&app, form).await.status(), StatusCode::FORBIDDEN);

    let res = test::call_service(&app, test::TestRequest::get().uri("/news/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["posts"]["total"], 0);
}

#[actix_web::test]
async fn test_kind_is_fixed_by_path() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    for (uri, kind) in [("/news/create/", "news"), ("/news/articles/create/", "article")] {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, fixture.editor()))
            .set_json(post_form("Title", "Preview", &[]))
            .to_request();
        let res = test::call_service(&app, req).await;

        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers().get(header::LOCATION).unwrap(), POST_LIST_PATH);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["data"]["post"]["kind"], kind);
        assert_eq!(body["data"]["notification"]["status"], "none");
    }
}

#[actix_web::test]
async fn test_invalid_form_is_unprocessable() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let unknown = uuid::Uuid::new_v4().to_string();
    let req = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(json!({ "title": "", "body": "x", "categories": [unknown] }))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"title"));
    assert!(fields.contains(&"categories"));
}

#[actix_web::test]
async fn test_malformed_json_is_bad_request() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{not json")
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_unknown_and_malformed_ids_are_not_found() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let missing = format!("/news/{}", uuid::Uuid::new_v4());
    for uri in [missing.as_str(), "/news/not-a-uuid"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

/// Creates category "Tech" with one subscriber and evaluates to its id.
macro_rules! tech_category {
    ($app:expr, $fixture:expr, $subscriber:expr) => {{
        let req = test::TestRequest::post()
            .uri("/categories/")
            .insert_header((header::AUTHORIZATION, $fixture.editor()))
            .set_json(json!({ "name": "Tech" }))
            .to_request();
        let res = test::call_service(&$app, req).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(res).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let req = test::TestRequest::post()
            .uri(&format!("/categories/{id}/subscribe"))
            .set_json(json!({ "email": $subscriber }))
            .to_request();
        assert_eq!(test::call_service(&$app, req).await.status(), StatusCode::OK);

        id
    }};
}

#[actix_web::test]
async fn test_attach_notifies_subscribers_end_to_end() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);
    let tech = tech_category!(app, fixture, "a@x.com");

    let req = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(post_form("T", "P", &[]))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let post_id = body["data"]["post"]["id"].as_str().unwrap().to_string();

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/news/{post_id}")).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["title"], "T");
    assert!(fixture.mailer.sent().await.is_empty());

    let req = test::TestRequest::post()
        .uri(&format!("/news/{post_id}/categories"))
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(json!({ "categories": [tech] }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["notification"]["status"], "sent");

    let sent = fixture.mailer.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "T");
    assert_eq!(sent[0].to, vec!["a@x.com".to_string()]);
    assert!(sent[0].html_body.contains("P"));
    assert!(sent[0].html_body.contains(&format!("http://news.test/news/{post_id}")));
}

#[actix_web::test]
async fn test_edit_and_detach_do_not_notify_for_removed_categories() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);
    let tech = tech_category!(app, fixture, "a@x.com");

    let req = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(post_form("T", "P", &[tech.as_str()]))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let post_id = body["data"]["post"]["id"].as_str().unwrap().to_string();
    assert_eq!(fixture.mailer.sent().await.len(), 1);

    let req = test::TestRequest::get()
        .uri(&format!("/news/{post_id}/edit/"))
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["data"]["categories"], json!([tech]));

    let req = test::TestRequest::post()
        .uri(&format!("/news/{post_id}/edit/"))
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(post_form("T2", "P2", &[]))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["post"]["title"], "T2");
    assert_eq!(body["data"]["post"]["kind"], "news");
    assert_eq!(body["data"]["post"]["categories"], json!([]));

    let req = test::TestRequest::delete()
        .uri(&format!("/news/{post_id}/categories"))
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(json!({ "categories": [tech] }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    assert_eq!(fixture.mailer.sent().await.len(), 1);
}

#[actix_web::test]
async fn test_delete_flow() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    let req = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(post_form("Doomed", "P", &[]))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    let post_id = body["data"]["post"]["id"].as_str().unwrap().to_string();
    let delete_uri = format!("/news/{post_id}/delete/");

    let anonymous = test::TestRequest::post().uri(&delete_uri).to_request();
    assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::FORBIDDEN);

    let confirm = test::TestRequest::get()
        .uri(&delete_uri)
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, confirm).await).await;
    assert_eq!(body["data"]["title"], "Doomed");

    let req = test::TestRequest::post()
        .uri(&delete_uri)
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).unwrap(), POST_LIST_PATH);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri(&format!("/news/{post_id}")).to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_search_filters_and_reports_bad_params() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);

    for (uri, title) in [
        ("/news/create/", "Rust released"),
        ("/news/articles/create/", "Rust in depth"),
        ("/news/create/", "Weather"),
    ] {
        let req = test::TestRequest::post()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, fixture.editor()))
            .set_json(post_form(title, "P", &[]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    }

    let req = test::TestRequest::get()
        .uri("/news/search?title=rust&kind=news&created_after=yesterday")
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;

    let titles: Vec<&str> = body["data"]["news"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Rust released"]);
    assert_eq!(body["data"]["filter"]["title"], "rust");
    assert_eq!(body["data"]["filter"]["kind"], "news");
    assert_eq!(body["data"]["errors"][0]["field"], "created_after");

    let res = test::call_service(&app, test::TestRequest::get().uri("/news/search").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"]["news"]["total"], 3);
    assert_eq!(body["data"]["news"]["items"][0]["title"], "Weather");

    let req = test::TestRequest::get().uri("/news/search?title=rust&page=2").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_category_rules() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);
    let tech = tech_category!(app, fixture, "A@X.com");

    let duplicate = test::TestRequest::post()
        .uri("/categories/")
        .insert_header((header::AUTHORIZATION, fixture.editor()))
        .set_json(json!({ "name": "Tech" }))
        .to_request();
    assert_eq!(test::call_service(&app, duplicate).await.status(), StatusCode::CONFLICT);

    let anonymous = test::TestRequest::post()
        .uri("/categories/")
        .set_json(json!({ "name": "Sport" }))
        .to_request();
    assert_eq!(test::call_service(&app, anonymous).await.status(), StatusCode::FORBIDDEN);

    let again = test::TestRequest::post()
        .uri(&format!("/categories/{tech}/subscribe"))
        .set_json(json!({ "email": "a@x.com" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, again).await).await;
    assert_eq!(body["data"]["changed"], false);

    let invalid = test::TestRequest::post()
        .uri(&format!("/categories/{tech}/subscribe"))
        .set_json(json!({ "email": "not-an-email" }))
        .to_request();
    assert_eq!(
        test::call_service(&app, invalid).await.status(),
        StatusCode::UNPROCESSABLE_ENTITY
    );

    let res = test::call_service(&app, test::TestRequest::get().uri("/categories/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"][0]["name"], "Tech");
    assert_eq!(body["data"][0]["subscriber_count"], 1);

    let unsubscribe = test::TestRequest::post()
        .uri(&format!("/categories/{tech}/unsubscribe"))
        .set_json(json!({ "email": "a@x.com" }))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, unsubscribe).await).await;
    assert_eq!(body["data"]["changed"], true);
    assert_eq!(body["data"]["subscribed"], false);
}

#[actix_web::test]
async fn test_permission_is_checked_before_the_body() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);
    let post = format!("/news/{}/edit/", uuid::Uuid::new_v4());
    let links = format!("/news/{}/categories", uuid::Uuid::new_v4());

    let editor_routes = [
        "/news/create/",
        "/news/articles/create/",
        post.as_str(),
        links.as_str(),
        "/categories/",
    ];
    for uri in editor_routes {
        let empty = test::TestRequest::post().uri(uri).to_request();
        assert_eq!(test::call_service(&app, empty).await.status(), StatusCode::FORBIDDEN, "{uri}");

        let incomplete = test::TestRequest::post().uri(uri).set_json(json!({})).to_request();
        assert_eq!(
            test::call_service(&app, incomplete).await.status(),
            StatusCode::FORBIDDEN,
            "{uri}"
        );
    }

    let partial = test::TestRequest::post()
        .uri("/news/create/")
        .insert_header((header::AUTHORIZATION, fixture.token(&["news.add_post"])))
        .to_request();
    assert_eq!(test::call_service(&app, partial).await.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_subscribe_rejects_addresses_that_are_not_mailboxes() {
    let fixture = Fixture::new();
    let app = init_app!(fixture);
    let tech = tech_category!(app, fixture, "a@x.com");

    for email in ["a(b)@x.com", "a<b>@x.com", "a\"b@x.com", "a@x_y!.com"] {
        let req = test::TestRequest::post()
            .uri(&format!("/categories/{tech}/subscribe"))
            .set_json(json!({ "email": email }))
            .to_request();
        let res = test::call_service(&app, req).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY, "{email}");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["errors"][0]["field"], "email");
    }

    let res = test::call_service(&app, test::TestRequest::get().uri("/categories/").to_request()).await;
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["data"][0]["subscriber_count"], 1);
}
