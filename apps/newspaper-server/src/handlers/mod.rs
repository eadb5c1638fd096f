//! HTTP handlers and route configuration.

mod categories;
mod convert;
mod health;
mod posts;

#[cfg(test)]
mod tests;

use actix_web::web;

/// Configure all application routes.
///
/// Paths are registered without a trailing slash; the app is wrapped in
/// `NormalizePath::trim()` so `/news/` and `/news/{id}/edit/` resolve here.
/// Static segments come before `/{id}`.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .service(
            web::scope("/news")
                .route("", web::get().to(posts::list))
                .route("/search", web::get().to(posts::search))
                .service(
                    web::resource("/create")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create_news)),
                )
                .service(
                    web::resource("/articles/create")
                        .route(web::get().to(posts::create_form))
                        .route(web::post().to(posts::create_article)),
                )
                .route("/{id}", web::get().to(posts::detail))
                .service(
                    web::resource("/{id}/edit")
                        .route(web::get().to(posts::edit_form))
                        .route(web::post().to(posts::update)),
                )
                .service(
                    web::resource("/{id}/delete")
                        .route(web::get().to(posts::delete_confirm))
                        .route(web::post().to(posts::delete)),
                )
                .service(
                    web::resource("/{id}/categories")
                        .route(web::post().to(posts::attach))
                        .route(web::delete().to(posts::detach)),
                ),
        )
        .service(
            web::scope("/categories")
                .service(
                    web::resource("")
                        .route(web::get().to(categories::list))
                        .route(web::post().to(categories::create)),
                )
                .route("/{id}/subscribe", web::post().to(categories::subscribe))
                .route("/{id}/unsubscribe", web::post().to(categories::unsubscribe)),
        );
}
