use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRequestParts, State};
use axum::http::{header, request::Parts, HeaderMap, StatusCode};
use axum::Json;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use tracing::{debug, info};

use models::auth_user;
use service::auth::domain::{AdminBootstrap, LoginInput, PublicUser, RegisterInput};
use service::identity::{Identity, IdentityVerifier};
use service::Services;

use crate::errors::JsonApiError;

/// Legacy session cookie.
pub const SESSION_COOKIE: &str = "token";
/// Identity-provider session cookie.
pub const IDENTITY_COOKIE: &str = "__session";

#[derive(Clone)]
pub struct ServerState {
    pub services: Services,
    pub identity: Arc<dyn IdentityVerifier>,
    pub cookie_secure: bool,
    /// Mount `/api/debug/admin`.
    pub debug_routes: bool,
}

/// `Authorization: Bearer <token>`; any other scheme is rejected outright.
fn bearer_token(headers: &HeaderMap) -> Result<Option<String>, JsonApiError> {
    let Some(authz) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return Ok(None);
    };
    match authz.strip_prefix("Bearer ") {
        Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
        _ => {
            debug!("invalid Authorization format (expect Bearer)");
            Err(JsonApiError::unauthorized("Authorization header must be a Bearer token"))
        }
    }
}

fn session_token(headers: &HeaderMap, cookie_name: &str) -> Result<String, JsonApiError> {
    if let Some(t) = bearer_token(headers)? {
        return Ok(t);
    }
    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| JsonApiError::unauthorized("Not authenticated"))
}

/// Account behind a valid legacy session.
pub struct SessionUser(pub auth_user::Model);

#[async_trait]
impl FromRequestParts<ServerState> for SessionUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, SESSION_COOKIE)?;
        let claims = state.services.auth.verify_token(&token)?;
        let user = state.services.auth.current_user(&claims).await?;
        Ok(SessionUser(user))
    }
}

/// Legacy session whose account has the ADMIN role.
pub struct AdminUser(pub auth_user::Model);

#[async_trait]
impl FromRequestParts<ServerState> for AdminUser {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let SessionUser(user) = SessionUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(JsonApiError::new(StatusCode::FORBIDDEN, "FORBIDDEN", "Admin access required"));
        }
        Ok(AdminUser(user))
    }
}

/// Caller authenticated by the identity provider.
pub struct CurrentIdentity(pub Identity);

#[async_trait]
impl FromRequestParts<ServerState> for CurrentIdentity {
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let token = session_token(&parts.headers, IDENTITY_COOKIE)?;
        Ok(CurrentIdentity(state.identity.verify(&token)?))
    }
}

fn session_cookie(token: String, ttl_hours: i64, secure: bool) -> Cookie<'static> {
    let max_age = ttl_hours.max(0) * 3600;
    let mut cookie = Cookie::parse(format!("{SESSION_COOKIE}={token}; Max-Age={max_age}"))
        .unwrap_or_else(|_| Cookie::new(SESSION_COOKIE, String::new()));
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(secure);
    cookie.set_same_site(SameSite::Lax);
    cookie
}

#[derive(Serialize)]
pub struct SessionOutput {
    pub message: &'static str,
    pub user: PublicUser,
}

#[utoipa::path(post, path = "/api/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, CookieJar, Json<SessionOutput>), JsonApiError> {
    let session = state.services.auth.register(input).await?;
    let jar = jar.add(session_cookie(session.token, state.services.auth.token_ttl_hours(), state.cookie_secure));
    let user = PublicUser::from(&session.user);
    Ok((StatusCode::CREATED, jar, Json(SessionOutput { message: "Registration successful", user })))
}

#[utoipa::path(post, path = "/api/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    Json(input): Json<LoginInput>,
) -> Result<(CookieJar, Json<SessionOutput>), JsonApiError> {
    let session = state.services.auth.login(input).await?;
    let jar = jar.add(session_cookie(session.token, state.services.auth.token_ttl_hours(), state.cookie_secure));
    let user = PublicUser::from(&session.user);
    Ok((jar, Json(SessionOutput { message: "Login successful", user })))
}

pub async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(SessionUser(user): SessionUser) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "user": user }))
}

pub async fn debug_admin_status(State(state): State<ServerState>) -> Result<Json<serde_json::Value>, JsonApiError> {
    let body = match state.services.auth.admin_account().await? {
        Some(user) => serde_json::json!({ "status": "EXISTS", "user": PublicUser::from(&user), "role": user.role }),
        None => serde_json::json!({ "status": "MISSING", "message": "Admin user does not exist." }),
    };
    Ok(Json(body))
}

pub async fn debug_admin_bootstrap(State(state): State<ServerState>) -> Result<Json<serde_json::Value>, JsonApiError> {
    let (user, outcome) = state.services.auth.bootstrap_admin().await?;
    let message = match outcome {
        AdminBootstrap::Created => "Admin created successfully.",
        AdminBootstrap::Restored => "Admin role restored.",
    };
    info!(user_id = %user.id, ?outcome, "admin bootstrap via debug route");
    Ok(Json(serde_json::json!({ "message": message, "user": PublicUser::from(&user) })))
}
