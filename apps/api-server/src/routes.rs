//! # HTTP Routes
//!
//! Action-dispatched JSON API: two endpoints, one `?action=` selector each.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Route Map                                      │
//! │                                                                         │
//! │  /api?action=...                 session required (cookie)              │
//! │  ├── read        GET    → invoice list, newest first                   │
//! │  ├── create      POST   → new invoice, server-priced                   │
//! │  ├── update      POST   → replace contents of an owned invoice         │
//! │  └── delete      POST   → remove an owned invoice                      │
//! │                                                                         │
//! │  /auth?action=...                                                       │
//! │  ├── register         POST   → new account                             │
//! │  ├── login            POST   → fresh session token + cookie            │
//! │  ├── check            GET    → {authenticated, ...}, never 401         │
//! │  ├── logout           POST   → session destroyed, cookie cleared       │
//! │  ├── forgot-password  POST   → reset code stored + mailed              │
//! │  ├── verify-code      POST   → code checked, NOT consumed              │
//! │  ├── reset-password   POST   → code consumed, password replaced        │
//! │  └── update-profile   POST   → partial profile update (session)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The owner of every invoice operation is the verified session's user;
//! nothing in a request body can redirect an operation at someone else's
//! data.

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{Duration, Utc};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use invoice_core::types::{PasswordResetCode, Session, User};
use invoice_core::validation::{
    validate_email, validate_password, validate_reset_code, validate_username,
};

use crate::auth::{self, generate_reset_code};
use crate::dto::*;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_token";

/// Builds the application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api", get(invoice_dispatch).post(invoice_dispatch))
        .route("/auth", get(auth_dispatch).post(auth_dispatch))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ActionQuery {
    action: String,
}

/// Parses a JSON request body, mapping failures to a 400.
fn parse_body<T: DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| ApiError::BadRequest(format!("invalid body: {e}")))
}

fn session_token(jar: &CookieJar) -> Option<&str> {
    jar.get(SESSION_COOKIE).map(|c| c.value())
}

// =============================================================================
// /api — invoice operations (session required)
// =============================================================================

async fn invoice_dispatch(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ActionQuery>,
    body: Bytes,
) -> ApiResult<Response> {
    // Every invoice action is gated; the owner id comes from the session
    let session = state.sessions.require(session_token(&jar)).await?;

    match query.action.as_str() {
        "read" => read_invoices(&state, &session).await,
        "create" => create_invoice(&state, &session, &body).await,
        "update" => update_invoice(&state, &session, &body).await,
        "delete" => delete_invoice(&state, &session, &body).await,
        other => Err(ApiError::BadRequest(format!("unknown action: {other}"))),
    }
}

async fn read_invoices(state: &AppState, session: &Session) -> ApiResult<Response> {
    let invoices = state.db.invoices().list_for_owner(&session.user_id).await?;
    let views: Vec<InvoiceView> = invoices.into_iter().map(InvoiceView::from).collect();
    Ok(Json(views).into_response())
}

async fn create_invoice(state: &AppState, session: &Session, body: &Bytes) -> ApiResult<Response> {
    let req: CreateInvoiceRequest = parse_body(body)?;
    let items = into_item_inputs(req.items)?;

    let invoice = state
        .db
        .invoices()
        .create(&session.user_id, &req.customer_name, &items)
        .await?;

    let view = InvoiceView::from(invoice);
    Ok(Json(json!({
        "success": true,
        "id": view.id.clone(),
        "invoice": view,
    }))
    .into_response())
}

async fn update_invoice(state: &AppState, session: &Session, body: &Bytes) -> ApiResult<Response> {
    let req: UpdateInvoiceRequest = parse_body(body)?;
    let items = into_item_inputs(req.items)?;

    let invoice = state
        .db
        .invoices()
        .replace(&req.id, &session.user_id, &req.customer_name, &items)
        .await?;

    Ok(Json(json!({
        "success": true,
        "invoice": InvoiceView::from(invoice),
    }))
    .into_response())
}

async fn delete_invoice(state: &AppState, session: &Session, body: &Bytes) -> ApiResult<Response> {
    let req: DeleteInvoiceRequest = parse_body(body)?;
    state.db.invoices().delete(&req.id, &session.user_id).await?;
    Ok(Json(json!({ "success": true })).into_response())
}

// =============================================================================
// /auth — account and session operations
// =============================================================================

async fn auth_dispatch(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<ActionQuery>,
    body: Bytes,
) -> ApiResult<Response> {
    match query.action.as_str() {
        "register" => register(&state, &body).await,
        "login" => login(&state, jar, &body).await,
        "check" => check(&state, &jar).await,
        "logout" => logout(&state, jar).await,
        "forgot-password" => forgot_password(&state, &body).await,
        "verify-code" => verify_code(&state, &body).await,
        "reset-password" => reset_password(&state, &body).await,
        "update-profile" => update_profile(&state, &jar, &body).await,
        other => Err(ApiError::BadRequest(format!("unknown action: {other}"))),
    }
}

async fn register(state: &AppState, body: &Bytes) -> ApiResult<Response> {
    let req: RegisterRequest = parse_body(body)?;

    let username = req.username.trim().to_string();
    let email = req.email.trim().to_lowercase();
    validate_username(&username)?;
    validate_email(&email)?;
    validate_password(&req.password)?;

    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4().to_string(),
        username,
        email,
        password_hash: auth::hash_password(&req.password)?,
        shop_name: None,
        shop_address: None,
        phone: None,
        tax_id: None,
        logo: None,
        signature: None,
        created_at: now,
        updated_at: now,
    };

    state.db.users().insert(&user).await?;

    Ok(Json(json!({ "success": true })).into_response())
}

async fn login(state: &AppState, jar: CookieJar, body: &Bytes) -> ApiResult<Response> {
    let req: LoginRequest = parse_body(body)?;

    // Emails are stored lowercased at registration, so an email-shaped
    // identifier is folded the same way before lookup
    let identifier = req.username.trim();
    let identifier = if identifier.contains('@') {
        identifier.to_lowercase()
    } else {
        identifier.to_string()
    };

    // One rejection message for both unknown user and wrong password
    let invalid = || ApiError::Unauthorized("invalid username or password".to_string());

    let user = state
        .db
        .users()
        .find_by_identifier(&identifier)
        .await?
        .ok_or_else(invalid)?;

    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(invalid());
    }

    let session = state.sessions.issue(&user.id).await?;

    let cookie = Cookie::build((SESSION_COOKIE, session.token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .build();

    info!(username = %user.username, "Login succeeded");

    Ok((
        jar.add(cookie),
        Json(json!({ "success": true, "username": user.username })),
    )
        .into_response())
}

async fn check(state: &AppState, jar: &CookieJar) -> ApiResult<Response> {
    let session = state.sessions.check(session_token(jar)).await?;

    let response = match session {
        Some(session) => match state.db.users().find_by_id(&session.user_id).await? {
            Some(user) => CheckResponse {
                authenticated: true,
                username: Some(user.username.clone()),
                profile: Some(profile_of(&user)),
            },
            None => CheckResponse {
                authenticated: false,
                username: None,
                profile: None,
            },
        },
        None => CheckResponse {
            authenticated: false,
            username: None,
            profile: None,
        },
    };

    Ok(Json(response).into_response())
}

async fn logout(state: &AppState, jar: CookieJar) -> ApiResult<Response> {
    if let Some(token) = session_token(&jar) {
        state.sessions.logout(token).await?;
    }

    let removal = Cookie::build((SESSION_COOKIE, "")).path("/").build();
    Ok((jar.remove(removal), Json(json!({ "success": true }))).into_response())
}

async fn forgot_password(state: &AppState, body: &Bytes) -> ApiResult<Response> {
    let req: ForgotPasswordRequest = parse_body(body)?;
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;

    // Whether or not the address is registered the response is the same;
    // account existence is not disclosed here
    if let Some(user) = state.db.users().find_by_email(&email).await? {
        let now = Utc::now();
        let code = PasswordResetCode {
            email: user.email.clone(),
            code: generate_reset_code(),
            expires_at: now + Duration::seconds(state.config.reset_code_ttl_secs),
            created_at: now,
        };

        state.db.reset_codes().put(&code).await?;
        state
            .mailer
            .send_reset_code(&user.email, &code.code)
            .map_err(|e| ApiError::Delivery(e.to_string()))?;

        info!("Reset code issued");
    }

    Ok(Json(json!({ "success": true })).into_response())
}

/// Checks a reset code against the stored one without consuming it.
async fn check_reset_code(state: &AppState, email: &str, code: &str) -> ApiResult<()> {
    validate_reset_code(code)?;

    let invalid = || ApiError::BadRequest("invalid or expired code".to_string());

    let stored = state
        .db
        .reset_codes()
        .find(email)
        .await?
        .ok_or_else(invalid)?;

    if stored.code != code || !stored.is_valid_at(Utc::now()) {
        return Err(invalid());
    }

    Ok(())
}

async fn verify_code(state: &AppState, body: &Bytes) -> ApiResult<Response> {
    let req: VerifyCodeRequest = parse_body(body)?;
    let email = req.email.trim().to_lowercase();

    check_reset_code(state, &email, &req.code).await?;

    Ok(Json(json!({ "success": true })).into_response())
}

async fn reset_password(state: &AppState, body: &Bytes) -> ApiResult<Response> {
    let req: ResetPasswordRequest = parse_body(body)?;
    let email = req.email.trim().to_lowercase();
    validate_password(&req.new_password)?;

    check_reset_code(state, &email, &req.code).await?;

    // A valid code implies the account exists; a vanished account gets the
    // same rejection as a bad code
    let user = state
        .db
        .users()
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::BadRequest("invalid or expired code".to_string()))?;

    let hash = auth::hash_password(&req.new_password)?;
    state.db.users().update_password_by_email(&email, &hash).await?;

    // Single use: the code dies with the reset, and so do open sessions
    state.db.reset_codes().delete(&email).await?;
    state.sessions.logout_all(&user.id).await?;

    info!("Password reset completed");
    Ok(Json(json!({ "success": true })).into_response())
}

async fn update_profile(state: &AppState, jar: &CookieJar, body: &Bytes) -> ApiResult<Response> {
    let session = state.sessions.require(session_token(jar)).await?;
    let req: UpdateProfileRequest = parse_body(body)?;

    let user = state
        .db
        .users()
        .update_profile(&session.user_id, &req.into())
        .await?;

    Ok(Json(json!({
        "success": true,
        "profile": profile_of(&user),
    }))
    .into_response())
}
