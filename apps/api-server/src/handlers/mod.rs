//! HTTP handlers and route configuration.

mod health;
mod posts;
mod quotes;
mod settings;

use actix_web::web;

use crate::state::AppState;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/quotes")
                    .route("", web::get().to(quotes::list_quotes))
                    .route("/upload", web::post().to(quotes::upload_quotes)),
            )
            .service(
                web::scope("/settings")
                    .route("", web::get().to(settings::get_settings))
                    .route("", web::post().to(settings::update_settings)),
            )
            .service(post_routes(state)),
    );
}

#[cfg_attr(not(feature = "rate-limit"), allow(unused_variables))]
fn post_routes(state: &AppState) -> actix_web::Scope {
    let generate = web::resource("/generate").route(web::post().to(posts::generate));
    let regenerate = web::resource("/{id}/regenerate").route(web::post().to(posts::regenerate));

    // Generation spends paid API quota.
    #[cfg(feature = "rate-limit")]
    let (generate, regenerate) = {
        use crate::middleware::rate_limit::RateLimitMiddleware;
        (
            generate.wrap(RateLimitMiddleware::new(state.rate_limiter.clone())),
            regenerate.wrap(RateLimitMiddleware::new(state.rate_limiter.clone())),
        )
    };

    web::scope("/posts")
        .route("/queue", web::get().to(posts::list_queue))
        .route("/approved", web::get().to(posts::list_approved))
        .service(generate)
        .service(regenerate)
        .route("/{id}", web::get().to(posts::get_post))
        .route("/{id}/approve", web::post().to(posts::approve))
        .route("/{id}/download", web::get().to(posts::download))
}
