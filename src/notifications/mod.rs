/// Notification feed
///
/// Derives "my request changed state" notices from the current request
/// snapshot. Nothing is persisted; callers re-poll and recompute.
use crate::error::HubResult;
use crate::requests::manager::parse_request;
use crate::requests::{Request, RequestKind, RequestPayload};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// A single feed entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: RequestKind,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Compute the notification feed for one owner from a request snapshot.
///
/// Pure: the same snapshot always yields the same list. Requests still
/// pending produce no entry; read state is the caller's concern.
pub fn compute_notifications(owner_id: &str, snapshot: &[Request]) -> Vec<Notification> {
    let mut notifications: Vec<Notification> = snapshot
        .iter()
        .filter(|r| r.owner_id == owner_id && r.status != crate::requests::RequestStatus::Pending)
        .map(notification_for)
        .collect();

    notifications.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(a.id.cmp(&b.id)));
    notifications
}

fn notification_for(request: &Request) -> Notification {
    let status = request.status.as_str();
    let (title, message) = match &request.payload {
        RequestPayload::Complaint { title, .. } => (
            "Complaint Update",
            format!("Your complaint \"{}\" has been {}", title, status),
        ),
        RequestPayload::Maintenance { title, .. } => (
            "Maintenance Request Update",
            format!("Your maintenance request \"{}\" has been {}", title, status),
        ),
        RequestPayload::Sleepover { guest_name, .. } => (
            "Sleepover Request Update",
            format!(
                "Your sleepover request for {} has been {}",
                guest_name, status
            ),
        ),
        RequestPayload::Guest { guest_name, .. } => (
            "Guest Registration Update",
            format!("Guest registration for {} has been {}", guest_name, status),
        ),
    };

    Notification {
        id: request.id.clone(),
        kind: request.kind(),
        title: title.to_string(),
        message,
        timestamp: request.updated_at,
    }
}

/// Store-backed feed: loads the full request snapshot and applies the
/// pure computation. Invoked per poll by the HTTP layer.
#[derive(Clone)]
pub struct NotificationService {
    db: SqlitePool,
}

impl NotificationService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Current full snapshot of all request collections
    pub async fn load_snapshot(&self) -> HubResult<Vec<Request>> {
        let rows = sqlx::query(
            "SELECT id, owner_id, kind, title, description, priority, guest_name, \
             guest_email, visit_date, visit_time, purpose, start_date, end_date, \
             status, admin_response, created_at, updated_at FROM request",
        )
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_request).collect()
    }

    pub async fn for_owner(&self, owner_id: &str) -> HubResult<Vec<Notification>> {
        let snapshot = self.load_snapshot().await?;
        Ok(compute_notifications(owner_id, &snapshot))
    }
}
