pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod notify;
pub mod routes;
pub mod seed;
pub mod state;
pub mod utils;

use std::time::Duration;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::openapi::security::{
    ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme,
};
use utoipa::{Modify, OpenApi};
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CorsConfig;
use crate::extractors::auth::SESSION_COOKIE;
use crate::extractors::csrf::{CSRF_HEADER, enforce_csrf};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "InternHub API",
        version = "1.0.0",
        description = "API connecting students with companies offering internships"
    ),
    paths(handlers::media::serve_media),
    tags(
        (name = "Auth", description = "Registration, login and sessions"),
        (name = "Students", description = "The logged-in student's profile"),
        (name = "Institutions", description = "Educational institutions"),
        (name = "Companies", description = "Verified companies and the logged-in company's profile"),
        (name = "Internships", description = "Public internship listings"),
        (name = "Applications", description = "A student's own applications"),
        (name = "Reviews", description = "Company reviews"),
        (name = "Company Portal", description = "Internships and applications of the logged-in company"),
        (name = "Media", description = "Uploaded resumes and logos"),
    ),
    modifiers(&SecurityAddon),
)]
struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_default();
        components.add_security_scheme(
            "session",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some(
                        "The login token. Browsers may send it in the `session` cookie instead.",
                    ))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "session_cookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(SESSION_COOKIE))),
        );
    }
}

fn cors_layer(config: &CorsConfig) -> Option<CorsLayer> {
    let origins: Vec<HeaderValue> = config
        .allow_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if origins.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static(CSRF_HEADER),
            ])
            .allow_credentials(true)
            .max_age(Duration::from_secs(config.max_age)),
    )
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes(&state.config))
        .split_for_parts();

    let cors = cors_layer(&state.config.server.cors);
    let router = router
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            enforce_csrf,
        ))
        .with_state(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api.clone()))
        .merge(Scalar::with_url("/scalar", api));

    match cors {
        Some(layer) => router.layer(layer),
        None => router,
    }
}
