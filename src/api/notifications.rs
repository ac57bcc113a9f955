/// Notification feed endpoint
use crate::{
    auth::AuthContext, context::AppContext, error::HubResult, notifications::Notification,
};
use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

/// Build notification routes
pub fn routes() -> Router<AppContext> {
    Router::new().route("/api/notifications", get(list_notifications))
}

#[derive(Debug, Serialize)]
struct NotificationsResponse {
    notifications: Vec<Notification>,
    /// Suggested client polling interval
    poll_interval_secs: u64,
}

/// Status-change notices for the caller's requests, newest first.
/// Recomputed from the store on every poll.
async fn list_notifications(
    State(ctx): State<AppContext>,
    auth: AuthContext,
) -> HubResult<Json<NotificationsResponse>> {
    let notifications = ctx.notifications.for_owner(&auth.account_id).await?;

    Ok(Json(NotificationsResponse {
        notifications,
        poll_interval_secs: ctx.config.notifications.poll_interval_secs,
    }))
}
