use async_trait::async_trait;
use axum::extract::State;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::HeaderMap;
use axum::response::AppendHeaders;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use time::Duration;
use uuid::Uuid;

use mehfil_db::{now_rfc3339, Document};
use mehfil_http::error::AppError;
use mehfil_kernel::{AppState, InitCtx, Module};
use mehfil_services::ServiceError;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(rename = "idToken")]
    pub id_token: Option<String>,
    #[serde(rename = "userData", default)]
    pub user_data: Option<Map<String, Value>>,
}

/// Auth module: id-token login and session introspection.
///
/// Credential verification stays delegated to the identity provider; this
/// side records the user document and a session row backing the cookie.
pub struct AuthModule;

impl AuthModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for AuthModule {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            cookie = %ctx.settings.auth.session_cookie,
            "auth module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router<AppState> {
        Router::new()
            .route("/login", post(login))
            .route("/me", get(me))
    }

    fn collections(&self) -> Vec<&'static str> {
        vec!["users", "sessions"]
    }
}

/// Verify the id token, upsert the user, and mint a session cookie.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<(AppendHeaders<[(axum::http::HeaderName, String); 1]>, Json<Value>), AppError> {
    let id_token = body
        .id_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::bad_request("idToken is required"))?;

    let claims = state
        .identity
        .verify_id_token(&id_token)
        .await
        .map_err(identity_error)?;

    // Caller-supplied profile fields merge beneath the verified claims.
    let mut fields = body.user_data.unwrap_or_default();
    fields.insert("uid".to_string(), Value::String(claims.uid.clone()));
    if let Some(email) = claims.email {
        fields.insert("email".to_string(), Value::String(email));
    }
    if let Some(name) = claims.name {
        fields.insert("name".to_string(), Value::String(name));
    }
    fields.insert("lastLoginAt".to_string(), Value::String(now_rfc3339()?));
    if state.store.get("users", &claims.uid).await?.is_none() {
        fields.insert("createdAt".to_string(), Value::String(now_rfc3339()?));
    }
    state.store.upsert_merge("users", &claims.uid, fields).await?;

    let ttl = state.settings.auth.session_ttl_secs;
    let session_id = Uuid::new_v4().to_string();
    let mut session = Map::new();
    session.insert("uid".to_string(), Value::String(claims.uid));
    session.insert("expiresAt".to_string(), Value::String(expiry(ttl)?));
    state
        .store
        .upsert_merge("sessions", &session_id, session)
        .await?;

    let cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        state.settings.auth.session_cookie, session_id, ttl
    );

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Json(json!({ "success": true })),
    ))
}

/// Resolve the session cookie to the logged-in user, or 401.
pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let session_id = cookie_value(&headers, &state.settings.auth.session_cookie)
        .ok_or_else(|| AppError::unauthorized("no session cookie"))?;

    let session = state
        .store
        .get("sessions", &session_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("unknown session"))?;

    if session_expired(&session)? {
        return Err(AppError::unauthorized("session expired"));
    }

    let uid = session
        .str_field("uid")
        .ok_or_else(|| AppError::unauthorized("malformed session"))?;
    let user = state
        .store
        .get("users", uid)
        .await?
        .ok_or_else(|| AppError::unauthorized("unknown user"))?;

    Ok(Json(json!({ "user": user })))
}

fn identity_error(err: ServiceError) -> AppError {
    match err {
        ServiceError::Rejected => AppError::unauthorized("id token rejected"),
        other => AppError::Internal(other.into()),
    }
}

fn expiry(ttl_secs: i64) -> anyhow::Result<String> {
    mehfil_db::rfc3339(time::OffsetDateTime::now_utc() + Duration::seconds(ttl_secs))
}

/// Timestamps are fixed-width RFC 3339, so string comparison is enough.
fn session_expired(session: &Document) -> anyhow::Result<bool> {
    let expires_at = session.str_field("expiresAt").unwrap_or("");
    Ok(expires_at.is_empty() || expires_at < now_rfc3339()?.as_str())
}

/// Extract a named cookie from the request headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(COOKIE) {
        let raw = header.to_str().ok()?;
        for pair in raw.split(';') {
            if let Some((key, value)) = pair.trim().split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Create a new instance of the auth module.
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(AuthModule::new())
}
