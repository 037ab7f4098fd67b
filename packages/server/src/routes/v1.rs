use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes(config))
        .nest("/institutions", institution_routes())
        .nest("/companies", company_routes())
        .nest("/internships", internship_routes())
        .nest("/applications", application_routes())
        .nest("/reviews", review_routes())
        .nest("/company", company_portal_routes())
        .nest("/media", media_routes())
}

/// Multipart framing adds a little on top of the file itself.
fn upload_body_limit(config: &AppConfig) -> DefaultBodyLimit {
    let max = usize::try_from(config.storage.max_upload_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(max.saturating_add(16 * 1024))
}

fn auth_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let session = OpenApiRouter::new()
        .routes(routes!(handlers::auth::csrf_token))
        .routes(routes!(handlers::auth::status))
        .routes(routes!(handlers::auth::logout));

    let students = OpenApiRouter::new()
        .routes(routes!(handlers::auth::register_student))
        .routes(routes!(handlers::auth::login_student))
        .routes(routes!(
            handlers::auth::get_student_profile,
            handlers::auth::update_student_profile
        ));

    let companies = OpenApiRouter::new()
        .routes(routes!(handlers::auth::register_company))
        .routes(routes!(handlers::auth::login_company))
        .routes(routes!(
            handlers::auth::get_company_profile,
            handlers::auth::update_company_profile
        ));

    let uploads = OpenApiRouter::new()
        .routes(routes!(handlers::auth::upload_resume))
        .routes(routes!(handlers::auth::upload_logo))
        .layer(upload_body_limit(config));

    session.merge(students).merge(companies).merge(uploads)
}

fn institution_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::institution::list_institutions))
        .routes(routes!(handlers::institution::get_institution))
}

fn company_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::company::list_companies))
        .routes(routes!(handlers::company::list_companies_with_internships))
        .routes(routes!(handlers::company::get_company))
}

fn internship_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::internship::list_internships))
        .routes(routes!(handlers::internship::list_available_techs))
        .routes(routes!(handlers::internship::get_internship))
}

fn application_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::application::list_applications,
            handlers::application::create_application
        ))
        .routes(routes!(
            handlers::application::get_application,
            handlers::application::update_application
        ))
}

fn review_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(
        handlers::review::list_reviews,
        handlers::review::create_review
    ))
}

fn company_portal_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::company_portal::list_own_internships,
            handlers::company_portal::create_internship
        ))
        .routes(routes!(
            handlers::company_portal::get_own_internship,
            handlers::company_portal::update_internship,
            handlers::company_portal::delete_internship
        ))
        .routes(routes!(handlers::company_portal::list_received_applications))
        .routes(routes!(handlers::company_portal::get_received_application))
        .routes(routes!(handlers::company_portal::decide_application))
}

/// Wildcard keys are not expressible through `routes!`; the operation is listed on
/// the API document directly.
fn media_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().route("/{*key}", get(handlers::media::serve_media))
}
