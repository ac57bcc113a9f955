/// Student request endpoints
use crate::{
    account::Role,
    auth::AuthContext,
    context::AppContext,
    error::{HubError, HubResult},
    requests::{Request, RequestKind, RequestPayload},
};
use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build request routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/requests", post(create_request).get(list_my_requests))
        .route("/api/requests/:id", get(get_request))
}

/// Submit a new request. Only accepted students may submit.
async fn create_request(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Json(payload): Json<RequestPayload>,
) -> HubResult<Json<Request>> {
    if auth.role != Role::Student {
        return Err(HubError::Forbidden(
            "Only students may submit requests".to_string(),
        ));
    }

    let request = ctx
        .request_manager
        .create_request(&auth.account_id, payload)
        .await?;

    Ok(Json(request))
}

#[derive(Debug, Deserialize)]
struct ListRequestsQuery {
    kind: Option<RequestKind>,
}

#[derive(Debug, Serialize)]
struct RequestsResponse {
    requests: Vec<Request>,
}

/// The caller's own requests, newest first
async fn list_my_requests(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Query(query): Query<ListRequestsQuery>,
) -> HubResult<Json<RequestsResponse>> {
    let requests = ctx
        .request_manager
        .list_for_owner(&auth.account_id, query.kind)
        .await?;

    Ok(Json(RequestsResponse { requests }))
}

/// One request; visible to its owner and to admins
async fn get_request(
    State(ctx): State<AppContext>,
    auth: AuthContext,
    Path(request_id): Path<String>,
) -> HubResult<Json<Request>> {
    let request = ctx
        .request_manager
        .get_request(&request_id)
        .await?
        .ok_or_else(|| HubError::NotFound(format!("Request {} not found", request_id)))?;

    if request.owner_id != auth.account_id && !auth.role.is_admin() {
        return Err(HubError::Forbidden(
            "Requests are visible to their owner only".to_string(),
        ));
    }

    Ok(Json(request))
}
