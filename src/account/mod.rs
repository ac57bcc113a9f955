/// Account management system
///
/// Handles applications, authentication, sessions, communication logs and
/// admin decisions over accounts.
mod manager;

pub use manager::AccountManager;

use crate::error::{HubError, HubResult};
use serde::{Deserialize, Serialize};

/// Account role. New registrations start as applicants and become
/// students once an admin accepts the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Admin,
    Applicant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Admin => "admin",
            Role::Applicant => "applicant",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "admin" => Ok(Role::Admin),
            "applicant" => Ok(Role::Applicant),
            _ => Err(HubError::Validation(format!("Invalid role: {}", s))),
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// Application review state. Admin accounts carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Denied,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Denied => "denied",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ApplicationStatus::Pending),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "denied" => Ok(ApplicationStatus::Denied),
            _ => Err(HubError::Validation(format!(
                "Invalid application status: {}",
                s
            ))),
        }
    }
}

/// Admin decision over a pending application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationDecision {
    Accepted,
    Denied,
}

impl ApplicationDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationDecision::Accepted => "accepted",
            ApplicationDecision::Denied => "denied",
        }
    }

    pub fn status(&self) -> ApplicationStatus {
        match self {
            ApplicationDecision::Accepted => ApplicationStatus::Accepted,
            ApplicationDecision::Denied => ApplicationStatus::Denied,
        }
    }
}

/// Who authored a communication log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentBy {
    Admin,
    Student,
}

impl SentBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentBy::Admin => "admin",
            SentBy::Student => "student",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(SentBy::Admin),
            "student" => Ok(SentBy::Student),
            _ => Err(HubError::Validation(format!("Invalid sender: {}", s))),
        }
    }
}

/// Profile fields submitted with an application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationProfile {
    pub display_name: String,
    pub phone: Option<String>,
    pub room_number: Option<String>,
    pub institution: Option<String>,
}

/// Validated session from bearer token
#[derive(Debug, Clone)]
pub struct ValidatedSession {
    pub account_id: String,
    pub session_id: String,
    pub role: Role,
}
