/// Admin API endpoints
use crate::{
    account::{ApplicationDecision, Role, SentBy},
    auth::AdminAuthContext,
    context::AppContext,
    db::account::{Account, CommunicationEntry},
    error::HubResult,
    requests::{Request, RequestKind, RequestPayload, RequestStatus},
};
use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build admin routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/admin/stats", get(get_stats))
        .route("/api/admin/accounts", get(list_accounts))
        .route("/api/admin/accounts/:id", delete(delete_account))
        .route("/api/admin/accounts/:id/role", post(set_role))
        .route("/api/admin/applications", get(list_applications))
        .route("/api/admin/applications/:id/decide", post(decide_application))
        .route("/api/admin/requests", get(list_requests))
        .route("/api/admin/requests/:id/transition", post(transition_request))
        .route("/api/admin/communications", post(add_communication))
}

#[derive(Debug, Serialize)]
struct AccountsResponse {
    accounts: Vec<Account>,
}

/// All accounts
async fn list_accounts(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> HubResult<Json<AccountsResponse>> {
    let accounts = ctx.account_manager.list_accounts().await?;

    Ok(Json(AccountsResponse { accounts }))
}

#[derive(Debug, Serialize)]
struct ApplicationsResponse {
    applications: Vec<Account>,
}

/// Applications awaiting a decision
async fn list_applications(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> HubResult<Json<ApplicationsResponse>> {
    let applications = ctx.account_manager.list_pending_applications().await?;

    Ok(Json(ApplicationsResponse { applications }))
}

#[derive(Debug, Deserialize)]
struct DecideApplicationRequest {
    decision: ApplicationDecision,
    message: String,
}

/// Accept or deny a pending application
async fn decide_application(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(account_id): Path<String>,
    Json(req): Json<DecideApplicationRequest>,
) -> HubResult<Json<Account>> {
    let account = ctx
        .account_manager
        .decide_application(
            &account_id,
            req.decision,
            &req.message,
            Role::Admin,
            &auth.account_id,
        )
        .await?;

    // Best-effort email; the decision stands even if delivery fails
    if let Err(e) = ctx
        .mailer
        .send_application_decision_email(
            &account.email,
            &account.display_name,
            req.decision.as_str(),
            &req.message,
        )
        .await
    {
        tracing::warn!("Failed to send decision email to {}: {}", account.email, e);
    }

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "application.decide",
            Some(&account_id),
            Some(req.decision.as_str()),
        )
        .await;

    Ok(Json(account))
}

#[derive(Debug, Deserialize)]
struct SetRoleRequest {
    role: Role,
}

/// Change an account's role
async fn set_role(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(account_id): Path<String>,
    Json(req): Json<SetRoleRequest>,
) -> HubResult<Json<Account>> {
    let account = ctx
        .account_manager
        .set_role(&account_id, req.role, Role::Admin, &auth.account_id)
        .await?;

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "account.set_role",
            Some(&account_id),
            Some(req.role.as_str()),
        )
        .await;

    Ok(Json(account))
}

/// Delete an account
async fn delete_account(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(account_id): Path<String>,
) -> HubResult<Json<serde_json::Value>> {
    ctx.account_manager
        .delete_account(&account_id, Role::Admin, &auth.account_id)
        .await?;

    let _ = ctx
        .account_manager
        .log_action(&auth.account_id, "account.delete", Some(&account_id), None)
        .await;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
struct ListRequestsQuery {
    kind: Option<RequestKind>,
    status: Option<RequestStatus>,
}

#[derive(Debug, Serialize)]
struct RequestsResponse {
    requests: Vec<Request>,
}

/// All requests, optionally filtered by kind and status
async fn list_requests(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
    Query(query): Query<ListRequestsQuery>,
) -> HubResult<Json<RequestsResponse>> {
    let requests = ctx
        .request_manager
        .list_all(query.kind, query.status)
        .await?;

    Ok(Json(RequestsResponse { requests }))
}

#[derive(Debug, Deserialize)]
struct TransitionRequest {
    status: RequestStatus,
    admin_response: Option<String>,
}

/// Move a request along its status graph
async fn transition_request(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(request_id): Path<String>,
    Json(req): Json<TransitionRequest>,
) -> HubResult<Json<Request>> {
    let request = ctx
        .request_manager
        .transition(
            &request_id,
            req.status,
            Role::Admin,
            req.admin_response.as_deref(),
        )
        .await?;

    // Best-effort email to the owner
    if let Ok(Some(owner)) = ctx.account_manager.get_account(&request.owner_id).await {
        if let Err(e) = ctx
            .mailer
            .send_request_update_email(
                &owner.email,
                &owner.display_name,
                request.kind().as_str(),
                &request_summary(&request),
                request.status.as_str(),
                request.admin_response.as_deref(),
            )
            .await
        {
            tracing::warn!("Failed to send status email to {}: {}", owner.email, e);
        }
    }

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "request.transition",
            Some(&request_id),
            Some(request.status.as_str()),
        )
        .await;

    Ok(Json(request))
}

fn request_summary(request: &Request) -> String {
    match &request.payload {
        RequestPayload::Complaint { title, .. } | RequestPayload::Maintenance { title, .. } => {
            title.clone()
        }
        RequestPayload::Sleepover { guest_name, .. } | RequestPayload::Guest { guest_name, .. } => {
            guest_name.clone()
        }
    }
}

#[derive(Debug, Deserialize)]
struct AddCommunicationRequest {
    account_id: String,
    message: String,
}

/// Send a message to an account's communication log
async fn add_communication(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Json(req): Json<AddCommunicationRequest>,
) -> HubResult<Json<CommunicationEntry>> {
    let entry = ctx
        .account_manager
        .add_communication(&req.account_id, &req.message, SentBy::Admin)
        .await?;

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "communication.send",
            Some(&req.account_id),
            None,
        )
        .await;

    Ok(Json(entry))
}

/// Dashboard statistics
async fn get_stats(
    State(ctx): State<AppContext>,
    _auth: AdminAuthContext,
) -> HubResult<Json<serde_json::Value>> {
    let total_accounts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account")
        .fetch_one(&ctx.db)
        .await?;

    let pending_applications: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE application_status = 'pending'")
            .fetch_one(&ctx.db)
            .await?;

    let pending_requests: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM request WHERE status = 'pending'")
            .fetch_one(&ctx.db)
            .await?;

    let announcements: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM announcement")
        .fetch_one(&ctx.db)
        .await?;

    Ok(Json(serde_json::json!({
        "total_accounts": total_accounts,
        "pending_applications": pending_applications,
        "pending_requests": pending_requests,
        "announcements": announcements,
    })))
}
