/// Announcement endpoints
use crate::{
    account::Role,
    announcements::Announcement,
    auth::{AdminAuthContext, AuthContext},
    context::AppContext,
    error::HubResult,
};
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

/// Build announcement routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .route("/api/announcements", get(list_announcements))
        .route("/api/admin/announcements", post(create_announcement))
        .route(
            "/api/admin/announcements/:id",
            put(update_announcement).delete(delete_announcement),
        )
}

#[derive(Debug, Serialize)]
struct AnnouncementsResponse {
    announcements: Vec<Announcement>,
}

/// All announcements, newest first
async fn list_announcements(
    State(ctx): State<AppContext>,
    _auth: AuthContext,
) -> HubResult<Json<AnnouncementsResponse>> {
    let announcements = ctx.announcement_manager.list().await?;

    Ok(Json(AnnouncementsResponse { announcements }))
}

#[derive(Debug, Deserialize)]
struct AnnouncementBody {
    title: String,
    content: String,
}

/// Post an announcement
async fn create_announcement(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Json(body): Json<AnnouncementBody>,
) -> HubResult<Json<Announcement>> {
    let announcement = ctx
        .announcement_manager
        .create(&body.title, &body.content, Role::Admin, &auth.account_id)
        .await?;

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "announcement.create",
            Some(&announcement.id),
            Some(&announcement.title),
        )
        .await;

    Ok(Json(announcement))
}

/// Edit an announcement
async fn update_announcement(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(announcement_id): Path<String>,
    Json(body): Json<AnnouncementBody>,
) -> HubResult<Json<serde_json::Value>> {
    ctx.announcement_manager
        .update(&announcement_id, &body.title, &body.content, Role::Admin)
        .await?;

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "announcement.update",
            Some(&announcement_id),
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}

/// Delete an announcement
async fn delete_announcement(
    State(ctx): State<AppContext>,
    auth: AdminAuthContext,
    Path(announcement_id): Path<String>,
) -> HubResult<Json<serde_json::Value>> {
    ctx.announcement_manager
        .delete(&announcement_id, Role::Admin)
        .await?;

    let _ = ctx
        .account_manager
        .log_action(
            &auth.account_id,
            "announcement.delete",
            Some(&announcement_id),
            None,
        )
        .await;

    Ok(Json(serde_json::json!({ "status": "ok" })))
}
