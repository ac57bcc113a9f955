/// Registration, login and profile endpoints
use crate::{
    account::ApplicationProfile,
    auth::AuthContext,
    context::AppContext,
    db::account::{Account, CommunicationEntry, Session},
    error::{HubError, HubResult},
};
use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build server routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/server/register", post(register))
        .route("/api/server/login", post(login))
        .route("/api/server/logout", post(logout))
        .route("/api/server/profile", get(profile))
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    email: String,
    password: String,
    display_name: String,
    phone: Option<String>,
    room_number: Option<String>,
    institution: Option<String>,
}

/// Submit a residence application
async fn register(
    State(ctx): State<AppContext>,
    Json(req): Json<RegisterRequest>,
) -> HubResult<Json<Account>> {
    let profile = ApplicationProfile {
        display_name: req.display_name,
        phone: req.phone,
        room_number: req.room_number,
        institution: req.institution,
    };

    let account = ctx
        .account_manager
        .submit_application(&req.email, &req.password, profile)
        .await?;

    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    account: Account,
    access_token: String,
    expires_at: chrono::DateTime<chrono::Utc>,
}

/// Authenticate and open a session
async fn login(
    State(ctx): State<AppContext>,
    Json(req): Json<LoginRequest>,
) -> HubResult<Json<LoginResponse>> {
    let (account, session): (Account, Session) =
        ctx.account_manager.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        account,
        access_token: session.access_token,
        expires_at: session.expires_at,
    }))
}

/// Close the current session
async fn logout(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> HubResult<Json<serde_json::Value>> {
    ctx.account_manager
        .delete_session(&auth.session.session_id)
        .await?;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

#[derive(Debug, Serialize)]
struct ProfileResponse {
    account: Account,
    communication_log: Vec<CommunicationEntry>,
}

/// Current account profile with its communication log
async fn profile(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> HubResult<Json<ProfileResponse>> {
    let account = ctx
        .account_manager
        .get_account(&auth.account_id)
        .await?
        .ok_or_else(|| HubError::NotFound("Account not found".to_string()))?;

    let communication_log = ctx.account_manager.communication_log(&auth.account_id).await?;

    Ok(Json(ProfileResponse {
        account,
        communication_log,
    }))
}
