/// Account database models
use crate::account::{ApplicationStatus, Role, SentBy};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account record in the database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub room_number: Option<String>,
    pub institution: Option<String>,
    pub role: Role,
    pub application_status: Option<ApplicationStatus>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Session record in the database
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub account_id: String,
    pub access_token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Append-only communication log entry attached to an account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationEntry {
    pub id: i64,
    pub account_id: String,
    pub message: String,
    pub sent_by: SentBy,
    pub timestamp: DateTime<Utc>,
}
