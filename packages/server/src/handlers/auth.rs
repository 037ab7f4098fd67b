use axum::{Json, extract::Multipart, extract::State, http::StatusCode, response::IntoResponse};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::Utc;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::user::AccountRole;
use crate::entity::{company, institution, session, student, user};
use crate::error::{AppError, ErrorBody, FieldErrors, conflict_on_unique};
use crate::extractors::auth::{MaybePrincipal, Principal, SESSION_COOKIE};
use crate::extractors::csrf::{CSRF_COOKIE, generate_token};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    AuthStatusResponse, CompanyRegisterRequest, CsrfResponse, LoginRequest, LoginResponse,
    ProfileResponse, StudentRegisterRequest, validate_company_register, validate_login_request,
    validate_student_register,
};
use crate::models::company::{
    CompanyProfileResponse, UpdateCompanyProfileRequest, validate_update_company_profile,
};
use crate::models::student::{
    StudentProfileResponse, UpdateStudentProfileRequest, validate_update_student_profile,
};
use crate::state::AppState;
use crate::utils::access::{require_company, require_student};
use crate::utils::media::{UploadKind, store_upload};
use crate::utils::{hash, jwt, present};

#[utoipa::path(
    get,
    path = "/csrf",
    tag = "Auth",
    operation_id = "getCsrfToken",
    summary = "Issue an anti-forgery token",
    description = "Sets a readable `csrftoken` cookie and returns the same value. Browser clients \
        authenticated by the session cookie must echo it in `X-CSRF-Token` on POST, PUT, PATCH \
        and DELETE requests.",
    responses((status = 200, description = "Token issued", body = CsrfResponse)),
)]
#[instrument(skip(state, jar))]
pub async fn csrf_token(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<CsrfResponse>) {
    let token = generate_token();
    let cookie = Cookie::build((CSRF_COOKIE, token.clone()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::hours(state.config.auth.session_ttl_hours))
        .build();
    (jar.add(cookie), Json(CsrfResponse { csrf_token: token }))
}

#[utoipa::path(
    get,
    path = "/status",
    tag = "Auth",
    operation_id = "getAuthStatus",
    summary = "Report the caller's session",
    responses((status = 200, description = "Session status", body = AuthStatusResponse)),
)]
#[instrument(skip_all)]
pub async fn status(MaybePrincipal(principal): MaybePrincipal) -> Json<AuthStatusResponse> {
    Json(match principal {
        Some(p) => AuthStatusResponse {
            authenticated: true,
            username: Some(p.username),
            role: Some(p.role),
        },
        None => AuthStatusResponse {
            authenticated: false,
            username: None,
            role: None,
        },
    })
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "End the current session",
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, jar), fields(user_id = principal.user_id))]
pub async fn logout(
    principal: Principal,
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AppError> {
    session::Entity::delete_by_id(principal.session_id)
        .exec(&state.db)
        .await?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

/// Persist a session row and build its token and cookie.
async fn open_session(
    state: &AppState,
    account: &user::Model,
) -> Result<(String, Cookie<'static>), AppError> {
    let ttl_hours = state.config.auth.session_ttl_hours;
    let now = Utc::now();
    let expires_at = now + chrono::Duration::hours(ttl_hours);

    let row = session::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(account.id),
        created_at: Set(now),
        expires_at: Set(expires_at),
    }
    .insert(&state.db)
    .await?;

    match session::purge_expired(&state.db).await {
        Ok(0) => {}
        Ok(n) => tracing::debug!(removed = n, "Purged expired sessions"),
        Err(e) => tracing::warn!(error = %e, "Failed to purge expired sessions"),
    }

    let token = jwt::sign(
        account.id,
        &account.username,
        account.role,
        row.id,
        expires_at,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {e}")))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(time::Duration::hours(ttl_hours))
        .build();

    Ok((token, cookie))
}

/// Check credentials for an account of the given role.
async fn authenticate(
    db: &DatabaseConnection,
    payload: &LoginRequest,
    role: AccountRole,
) -> Result<user::Model, AppError> {
    validate_login_request(payload)?;

    let account = user::Entity::find()
        .filter(user::Column::Username.eq(payload.username.trim()))
        .one(db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let is_valid = hash::verify_password(&payload.password, &account.password)
        .map_err(|e| AppError::Internal(format!("Password verify error: {e}")))?;

    // A student cannot sign in through the company endpoint and vice versa.
    if !is_valid || account.role != role {
        return Err(AppError::InvalidCredentials);
    }
    Ok(account)
}

/// Record uniqueness problems of a new or renamed account.
async fn check_account_unique<C: ConnectionTrait>(
    db: &C,
    username: Option<&str>,
    email: Option<&str>,
    exclude_user: Option<i32>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    let others = || {
        let mut q = user::Entity::find();
        if let Some(id) = exclude_user {
            q = q.filter(user::Column::Id.ne(id));
        }
        q
    };
    if let Some(username) = username
        && others()
            .filter(user::Column::Username.eq(username))
            .one(db)
            .await?
            .is_some()
    {
        errors.add("username", "A user with that username already exists");
    }
    if let Some(email) = email
        && others()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await?
            .is_some()
    {
        errors.add("email", "A user with that email already exists");
    }
    Ok(())
}

async fn check_institution<C: ConnectionTrait>(
    db: &C,
    institution_id: Option<i32>,
    errors: &mut FieldErrors,
) -> Result<(), AppError> {
    if let Some(id) = institution_id
        && institution::Entity::find_by_id(id).one(db).await?.is_none()
    {
        errors.add("institution_id", "Institution does not exist");
    }
    Ok(())
}

fn new_account(
    username: &str,
    email: &str,
    password_hash: String,
    first_name: &str,
    last_name: &str,
    role: AccountRole,
) -> user::ActiveModel {
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password: Set(password_hash),
        first_name: Set(first_name.trim().to_string()),
        last_name: Set(last_name.trim().to_string()),
        role: Set(role),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
}

fn hash_password(password: &str) -> Result<String, AppError> {
    hash::hash_password(password)
        .map_err(|e| AppError::Internal(format!("Password hash error: {e}")))
}

#[utoipa::path(
    post,
    path = "/students/register",
    tag = "Auth",
    operation_id = "registerStudent",
    summary = "Register a student account",
    description = "Creates the credential account and the linked student profile, then opens a \
        session for it.",
    request_body = StudentRegisterRequest,
    responses(
        (status = 201, description = "Student registered and logged in", body = LoginResponse),
        (status = 400, description = "Invalid or duplicate fields (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn register_student(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<StudentRegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = validate_student_register(&payload);
    let username = payload.username.trim();
    let email = payload.email.trim();
    check_account_unique(&state.db, Some(username), Some(email), None, &mut errors).await?;
    check_institution(&state.db, payload.institution_id, &mut errors).await?;
    errors.into_result()?;

    let password_hash = hash_password(&payload.password)?;
    let now = Utc::now();

    let txn = state.db.begin().await?;
    let account = new_account(
        username,
        email,
        password_hash,
        &payload.first_name,
        &payload.last_name,
        AccountRole::Student,
    )
    .insert(&txn)
    .await
    .map_err(|e| conflict_on_unique(e, "Username or email is already registered"))?;

    let profile = student::ActiveModel {
        user_id: Set(account.id),
        institution_id: Set(payload.institution_id),
        phone: Set(payload.phone.trim().to_string()),
        course: Set(payload.course),
        specialization: Set(payload.specialization.trim().to_string()),
        bio: Set(payload.bio),
        resume: Set(None),
        skills: Set(payload.skills.to_json()),
        interests: Set(payload.interests.to_json()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    tracing::info!(user_id = account.id, "Student registered");

    let (token, cookie) = open_session(&state, &account).await?;
    let profile = present::student_profile(
        &state.db,
        &state.config.server.public_url,
        account.clone(),
        profile,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(LoginResponse {
            token,
            username: account.username,
            role: AccountRole::Student,
            profile: ProfileResponse::Student(profile),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/students/login",
    tag = "Auth",
    operation_id = "loginStudent",
    summary = "Log in as a student",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `session` cookie set", body = LoginResponse),
        (status = 400, description = "Missing fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn login_student(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let account = authenticate(&state.db, &payload, AccountRole::Student).await?;
    let profile = student::Entity::find()
        .filter(student::Column::UserId.eq(account.id))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let (token, cookie) = open_session(&state, &account).await?;
    let profile = present::student_profile(
        &state.db,
        &state.config.server.public_url,
        account.clone(),
        profile,
    )
    .await?;

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            username: account.username,
            role: AccountRole::Student,
            profile: ProfileResponse::Student(profile),
        }),
    ))
}

async fn load_account<C: ConnectionTrait>(db: &C, principal: &Principal) -> Result<user::Model, AppError> {
    user::Entity::find_by_id(principal.user_id)
        .one(db)
        .await?
        .ok_or(AppError::TokenInvalid)
}

#[utoipa::path(
    get,
    path = "/students/profile",
    tag = "Students",
    operation_id = "getStudentProfile",
    summary = "Read the caller's student profile",
    responses(
        (status = 200, description = "Profile", body = StudentProfileResponse),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no student profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn get_student_profile(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<StudentProfileResponse>, AppError> {
    let profile = require_student(&state.db, &principal).await?;
    let account = load_account(&state.db, &principal).await?;
    Ok(Json(
        present::student_profile(&state.db, &state.config.server.public_url, account, profile)
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/students/profile",
    tag = "Students",
    operation_id = "updateStudentProfile",
    summary = "Update the caller's student profile",
    description = "Only supplied fields change. `skills` and `interests` accept a JSON array or \
        a comma-separated string.",
    request_body = UpdateStudentProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = StudentProfileResponse),
        (status = 400, description = "Invalid or duplicate fields (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no student profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id))]
pub async fn update_student_profile(
    principal: Principal,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateStudentProfileRequest>,
) -> Result<Json<StudentProfileResponse>, AppError> {
    validate_update_student_profile(&payload)?;
    let profile = require_student(&state.db, &principal).await?;
    let account = load_account(&state.db, &principal).await?;

    let email = payload.email.as_deref().map(str::trim);
    let mut errors = FieldErrors::new();
    check_account_unique(&state.db, None, email, Some(account.id), &mut errors).await?;
    if let Some(institution_id) = payload.institution_id {
        check_institution(&state.db, institution_id, &mut errors).await?;
    }
    errors.into_result()?;

    let txn = state.db.begin().await?;

    let mut account_am: user::ActiveModel = account.into();
    if let Some(first) = payload.first_name {
        account_am.first_name = Set(first.trim().to_string());
    }
    if let Some(last) = payload.last_name {
        account_am.last_name = Set(last.trim().to_string());
    }
    if let Some(email) = email {
        account_am.email = Set(email.to_string());
    }
    let account = account_am
        .update(&txn)
        .await
        .map_err(|e| conflict_on_unique(e, "Email is already registered"))?;

    let mut profile_am: student::ActiveModel = profile.into();
    if let Some(institution_id) = payload.institution_id {
        profile_am.institution_id = Set(institution_id);
    }
    if let Some(course) = payload.course {
        profile_am.course = Set(course);
    }
    if let Some(phone) = payload.phone {
        profile_am.phone = Set(phone.trim().to_string());
    }
    if let Some(spec) = payload.specialization {
        profile_am.specialization = Set(spec.trim().to_string());
    }
    if let Some(bio) = payload.bio {
        profile_am.bio = Set(bio);
    }
    if let Some(skills) = payload.skills {
        profile_am.skills = Set(skills.to_json());
    }
    if let Some(interests) = payload.interests {
        profile_am.interests = Set(interests.to_json());
    }
    profile_am.updated_at = Set(Utc::now());
    let profile = profile_am.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(
        present::student_profile(&state.db, &state.config.server.public_url, account, profile)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/students/profile/resume",
    tag = "Students",
    operation_id = "uploadResume",
    summary = "Upload the caller's resume",
    description = "Multipart upload with a `file` field (pdf, doc or docx). Replaces any previous resume.",
    request_body(content_type = "multipart/form-data", description = "Resume file"),
    responses(
        (status = 200, description = "Updated profile", body = StudentProfileResponse),
        (status = 400, description = "Missing, oversized or unsupported file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no student profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, multipart), fields(user_id = principal.user_id))]
pub async fn upload_resume(
    principal: Principal,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<StudentProfileResponse>, AppError> {
    let profile = require_student(&state.db, &principal).await?;
    let account = load_account(&state.db, &principal).await?;

    let stored = store_upload(
        &mut multipart,
        UploadKind::Resume,
        &*state.files,
        state.config.storage.max_upload_size,
    )
    .await?;
    let mut am: student::ActiveModel = profile.into();
    am.resume = Set(Some(stored.key.to_string()));
    am.updated_at = Set(Utc::now());
    let profile = am.update(&state.db).await?;

    tracing::info!(key = %stored.key, size = stored.size, "Resume stored");

    Ok(Json(
        present::student_profile(&state.db, &state.config.server.public_url, account, profile)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/companies/register",
    tag = "Auth",
    operation_id = "registerCompany",
    summary = "Register a company account",
    description = "Creates the credential account and the linked company profile, then opens a \
        session for it. New companies are unverified and stay out of public listings until a \
        moderator verifies them.",
    request_body = CompanyRegisterRequest,
    responses(
        (status = 201, description = "Company registered and logged in", body = LoginResponse),
        (status = 400, description = "Invalid or duplicate fields (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn register_company(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<CompanyRegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut errors = validate_company_register(&payload);
    let username = payload.username.trim();
    let email = payload.email.trim();
    let name = payload.company_name.trim();
    check_account_unique(&state.db, Some(username), Some(email), None, &mut errors).await?;
    if !name.is_empty()
        && company::Entity::find()
            .filter(company::Column::Name.eq(name))
            .one(&state.db)
            .await?
            .is_some()
    {
        errors.add("company_name", "A company with that name already exists");
    }
    errors.into_result()?;

    let password_hash = hash_password(&payload.password)?;

    let txn = state.db.begin().await?;
    let account = new_account(username, email, password_hash, "", "", AccountRole::Company)
        .insert(&txn)
        .await
        .map_err(|e| conflict_on_unique(e, "Username or email is already registered"))?;

    let profile = company::ActiveModel {
        user_id: Set(Some(account.id)),
        name: Set(name.to_string()),
        description: Set(payload.description),
        website: Set(payload.website.trim().to_string()),
        address: Set(payload.address.trim().to_string()),
        email: Set(payload
            .contact_email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty())),
        latitude: Set(payload.latitude),
        longitude: Set(payload.longitude),
        logo: Set(None),
        is_verified: Set(false),
        is_active: Set(true),
        has_blue_checkmark: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| conflict_on_unique(e, "A company with that name already exists"))?;
    txn.commit().await?;

    tracing::info!(user_id = account.id, company_id = profile.id, "Company registered");

    let (token, cookie) = open_session(&state, &account).await?;
    let profile = present::company_profile(
        &state.db,
        &state.config.server.public_url,
        account.clone(),
        profile,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        jar.add(cookie),
        Json(LoginResponse {
            token,
            username: account.username,
            role: AccountRole::Company,
            profile: ProfileResponse::Company(profile),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/companies/login",
    tag = "Auth",
    operation_id = "loginCompany",
    summary = "Log in as a company",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `session` cookie set", body = LoginResponse),
        (status = 400, description = "Missing fields (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Wrong credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(username = %payload.username))]
pub async fn login_company(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let account = authenticate(&state.db, &payload, AccountRole::Company).await?;
    let profile = company::Entity::find()
        .filter(company::Column::UserId.eq(account.id))
        .one(&state.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let (token, cookie) = open_session(&state, &account).await?;
    let profile = present::company_profile(
        &state.db,
        &state.config.server.public_url,
        account.clone(),
        profile,
    )
    .await?;

    Ok((
        jar.add(cookie),
        Json(LoginResponse {
            token,
            username: account.username,
            role: AccountRole::Company,
            profile: ProfileResponse::Company(profile),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/companies/profile",
    tag = "Companies",
    operation_id = "getCompanyProfile",
    summary = "Read the caller's company profile",
    responses(
        (status = 200, description = "Profile", body = CompanyProfileResponse),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no company profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal), fields(user_id = principal.user_id))]
pub async fn get_company_profile(
    principal: Principal,
    State(state): State<AppState>,
) -> Result<Json<CompanyProfileResponse>, AppError> {
    let profile = require_company(&state.db, &principal).await?;
    let account = load_account(&state.db, &principal).await?;
    Ok(Json(
        present::company_profile(&state.db, &state.config.server.public_url, account, profile)
            .await?,
    ))
}

#[utoipa::path(
    patch,
    path = "/companies/profile",
    tag = "Companies",
    operation_id = "updateCompanyProfile",
    summary = "Update the caller's company profile",
    description = "Only supplied fields change. Send `\"email\": null` to clear the notification address.",
    request_body = UpdateCompanyProfileRequest,
    responses(
        (status = 200, description = "Updated profile", body = CompanyProfileResponse),
        (status = 400, description = "Invalid or duplicate fields (VALIDATION_ERROR, CONFLICT)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no company profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, payload), fields(user_id = principal.user_id))]
pub async fn update_company_profile(
    principal: Principal,
    State(state): State<AppState>,
    AppJson(payload): AppJson<UpdateCompanyProfileRequest>,
) -> Result<Json<CompanyProfileResponse>, AppError> {
    validate_update_company_profile(&payload)?;
    let profile = require_company(&state.db, &principal).await?;
    let account = load_account(&state.db, &principal).await?;

    if let Some(name) = payload.name.as_deref().map(str::trim)
        && company::Entity::find()
            .filter(company::Column::Name.eq(name))
            .filter(company::Column::Id.ne(profile.id))
            .one(&state.db)
            .await?
            .is_some()
    {
        let mut errors = FieldErrors::new();
        errors.add("name", "A company with that name already exists");
        return Err(AppError::InvalidFields(errors));
    }

    let mut am: company::ActiveModel = profile.into();
    if let Some(name) = payload.name {
        am.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        am.description = Set(description);
    }
    if let Some(website) = payload.website {
        am.website = Set(website.trim().to_string());
    }
    if let Some(address) = payload.address {
        am.address = Set(address.trim().to_string());
    }
    if let Some(email) = payload.email {
        am.email = Set(email.map(|e| e.trim().to_string()).filter(|e| !e.is_empty()));
    }
    if let Some(lat) = payload.latitude {
        am.latitude = Set(lat);
    }
    if let Some(lng) = payload.longitude {
        am.longitude = Set(lng);
    }
    let profile = am
        .update(&state.db)
        .await
        .map_err(|e| conflict_on_unique(e, "A company with that name already exists"))?;

    Ok(Json(
        present::company_profile(&state.db, &state.config.server.public_url, account, profile)
            .await?,
    ))
}

#[utoipa::path(
    post,
    path = "/companies/profile/logo",
    tag = "Companies",
    operation_id = "uploadLogo",
    summary = "Upload the caller's company logo",
    description = "Multipart upload with a `file` field (png, jpg, jpeg or webp). Replaces any previous logo.",
    request_body(content_type = "multipart/form-data", description = "Logo image"),
    responses(
        (status = 200, description = "Updated profile", body = CompanyProfileResponse),
        (status = 400, description = "Missing, oversized or unsupported file (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Not logged in (NOT_AUTHENTICATED, SESSION_INVALID)", body = ErrorBody),
        (status = 404, description = "Caller has no company profile (NOT_FOUND)", body = ErrorBody),
    ),
    security(("session" = [])),
)]
#[instrument(skip(state, principal, multipart), fields(user_id = principal.user_id))]
pub async fn upload_logo(
    principal: Principal,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<CompanyProfileResponse>, AppError> {
    let profile = require_company(&state.db, &principal).await?;
    let account = load_account(&state.db, &principal).await?;

    let stored = store_upload(
        &mut multipart,
        UploadKind::Logo,
        &*state.files,
        state.config.storage.max_upload_size,
    )
    .await?;
    let mut am: company::ActiveModel = profile.into();
    am.logo = Set(Some(stored.key.to_string()));
    let profile = am.update(&state.db).await?;

    tracing::info!(key = %stored.key, size = stored.size, "Logo stored");

    Ok(Json(
        present::company_profile(&state.db, &state.config.server.public_url, account, profile)
            .await?,
    ))
}
