//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};

#[cfg(debug_assertions)]
use social_backend::ApiDoc;
use social_backend::inbound::http::comments::{comment_thread, create_comment};
use social_backend::inbound::http::cities::list_cities;
use social_backend::inbound::http::error::{
    json_error_handler, path_error_handler, query_error_handler,
};
use social_backend::inbound::http::health::{HealthState, live, ready};
use social_backend::inbound::http::posts::{
    create_post, delete_post, like_post, list_posts, posts_by_author,
};
use social_backend::inbound::http::state::HttpState;
use social_backend::inbound::http::users::{current_user, login, register};
use social_backend::outbound::persistence::DbPool;
use social_backend::{RequestContext, Trace};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    db_pool: DbPool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        db_pool,
    } = deps;

    let api = web::scope("/api")
        .wrap(RequestContext::new(db_pool))
        .service(register)
        .service(login)
        .service(current_user)
        .service(list_cities)
        .service(create_post)
        .service(list_posts)
        .service(posts_by_author)
        .service(like_post)
        .service(delete_post)
        .service(create_comment)
        .service(comment_thread);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

#[cfg(feature = "metrics")]
fn build_metrics() -> std::io::Result<PrometheusMetrics> {
    PrometheusMetricsBuilder::new("social")
        .endpoint("/metrics")
        .build()
        .map_err(|err| std::io::Error::other(format!("metrics registration failed: {err}")))
}

/// Construct the Actix HTTP server.
///
/// Marks `health_state` ready once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        db_pool,
        tokens,
    } = config;
    let http_state = build_http_state(tokens);

    #[cfg(feature = "metrics")]
    let metrics = build_metrics()?;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            db_pool: db_pool.clone(),
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
