/// Request lifecycle state machine
///
/// One validated state machine shared by all four request kinds. Status
/// transitions are monotonic along each kind's directed graph; terminal
/// states allow no further transition.
use crate::error::{HubError, HubResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Request kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Complaint,
    Maintenance,
    Sleepover,
    Guest,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Complaint => "complaint",
            RequestKind::Maintenance => "maintenance",
            RequestKind::Sleepover => "sleepover",
            RequestKind::Guest => "guest",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "complaint" => Ok(RequestKind::Complaint),
            "maintenance" => Ok(RequestKind::Maintenance),
            "sleepover" => Ok(RequestKind::Sleepover),
            "guest" => Ok(RequestKind::Guest),
            _ => Err(HubError::Validation(format!("Invalid request kind: {}", s))),
        }
    }

    /// Whether the kind's graph permits `from -> to`
    pub fn allows(&self, from: RequestStatus, to: RequestStatus) -> bool {
        use RequestStatus::*;
        match self {
            RequestKind::Complaint => matches!(
                (from, to),
                (Pending, InProgress) | (Pending, Rejected) | (InProgress, Resolved) | (InProgress, Rejected)
            ),
            RequestKind::Maintenance => matches!(
                (from, to),
                (Pending, InProgress) | (Pending, Rejected) | (InProgress, Completed) | (InProgress, Rejected)
            ),
            RequestKind::Sleepover | RequestKind::Guest => {
                matches!((from, to), (Pending, Approved) | (Pending, Rejected))
            }
        }
    }
}

/// Request status, shared across kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    InProgress,
    Resolved,
    Completed,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Resolved => "resolved",
            RequestStatus::Completed => "completed",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "in_progress" => Ok(RequestStatus::InProgress),
            "resolved" => Ok(RequestStatus::Resolved),
            "completed" => Ok(RequestStatus::Completed),
            "approved" => Ok(RequestStatus::Approved),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(HubError::Validation(format!("Invalid request status: {}", s))),
        }
    }

    /// Terminal statuses allow no further transition
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RequestStatus::Resolved
                | RequestStatus::Completed
                | RequestStatus::Approved
                | RequestStatus::Rejected
        )
    }
}

/// Maintenance request priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn from_str(s: &str) -> HubResult<Self> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(HubError::Validation(format!("Invalid priority: {}", s))),
        }
    }
}

/// Kind-specific request payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RequestPayload {
    Complaint {
        title: String,
        description: String,
    },
    Maintenance {
        title: String,
        description: String,
        priority: Priority,
    },
    Sleepover {
        guest_name: String,
        guest_email: String,
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    Guest {
        guest_name: String,
        guest_email: String,
        visit_date: NaiveDate,
        visit_time: String,
        purpose: String,
    },
}

fn require(field: &str, value: &str) -> HubResult<()> {
    if value.trim().is_empty() {
        return Err(HubError::Validation(format!(
            "Required field '{}' is missing",
            field
        )));
    }
    Ok(())
}

fn require_email(field: &str, value: &str) -> HubResult<()> {
    require(field, value)?;
    if !value.contains('@') {
        return Err(HubError::Validation(format!(
            "Field '{}' must be a valid email address",
            field
        )));
    }
    Ok(())
}

impl RequestPayload {
    pub fn kind(&self) -> RequestKind {
        match self {
            RequestPayload::Complaint { .. } => RequestKind::Complaint,
            RequestPayload::Maintenance { .. } => RequestKind::Maintenance,
            RequestPayload::Sleepover { .. } => RequestKind::Sleepover,
            RequestPayload::Guest { .. } => RequestKind::Guest,
        }
    }

    /// Check payload completeness and date ordering for the kind.
    /// `today` anchors the guest visit-date check.
    pub fn validate(&self, today: NaiveDate) -> HubResult<()> {
        match self {
            RequestPayload::Complaint { title, description } => {
                require("title", title)?;
                require("description", description)?;
            }
            RequestPayload::Maintenance {
                title, description, ..
            } => {
                require("title", title)?;
                require("description", description)?;
            }
            RequestPayload::Sleepover {
                guest_name,
                guest_email,
                start_date,
                end_date,
            } => {
                require("guest_name", guest_name)?;
                require_email("guest_email", guest_email)?;
                if start_date > end_date {
                    return Err(HubError::Validation(
                        "start_date must not be after end_date".to_string(),
                    ));
                }
            }
            RequestPayload::Guest {
                guest_name,
                guest_email,
                visit_date,
                visit_time,
                purpose,
            } => {
                require("guest_name", guest_name)?;
                require_email("guest_email", guest_email)?;
                require("visit_time", visit_time)?;
                require("purpose", purpose)?;
                if *visit_date < today {
                    return Err(HubError::Validation(
                        "visit_date must be today or later".to_string(),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// A request record, any kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub id: String,
    pub owner_id: String,
    #[serde(flatten)]
    pub payload: RequestPayload,
    pub status: RequestStatus,
    pub admin_response: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        self.payload.kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn test_kind_round_trip() {
        for kind in ["complaint", "maintenance", "sleepover", "guest"] {
            assert_eq!(RequestKind::from_str(kind).unwrap().as_str(), kind);
        }
        assert!(RequestKind::from_str("laundry").is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            "pending",
            "in_progress",
            "resolved",
            "completed",
            "approved",
            "rejected",
        ] {
            assert_eq!(RequestStatus::from_str(status).unwrap().as_str(), status);
        }
        assert!(RequestStatus::from_str("open").is_err());
    }

    #[test]
    fn test_complaint_graph() {
        use RequestStatus::*;
        let kind = RequestKind::Complaint;

        assert!(kind.allows(Pending, InProgress));
        assert!(kind.allows(Pending, Rejected));
        assert!(kind.allows(InProgress, Resolved));
        assert!(kind.allows(InProgress, Rejected));

        assert!(!kind.allows(Pending, Resolved));
        assert!(!kind.allows(InProgress, Pending));
        assert!(!kind.allows(Pending, Completed));
        assert!(!kind.allows(Pending, Approved));
    }

    #[test]
    fn test_maintenance_graph() {
        use RequestStatus::*;
        let kind = RequestKind::Maintenance;

        assert!(kind.allows(Pending, InProgress));
        assert!(kind.allows(InProgress, Completed));
        assert!(kind.allows(InProgress, Rejected));

        assert!(!kind.allows(Pending, Completed));
        assert!(!kind.allows(InProgress, Pending));
        assert!(!kind.allows(Pending, Resolved));
    }

    #[test]
    fn test_sleepover_and_guest_graphs() {
        use RequestStatus::*;
        for kind in [RequestKind::Sleepover, RequestKind::Guest] {
            assert!(kind.allows(Pending, Approved));
            assert!(kind.allows(Pending, Rejected));

            assert!(!kind.allows(Pending, InProgress));
            assert!(!kind.allows(Approved, Rejected));
            assert!(!kind.allows(Rejected, Pending));
        }
    }

    #[test]
    fn test_no_transition_out_of_terminal_states() {
        use RequestStatus::*;
        let all = [Pending, InProgress, Resolved, Completed, Approved, Rejected];
        let kinds = [
            RequestKind::Complaint,
            RequestKind::Maintenance,
            RequestKind::Sleepover,
            RequestKind::Guest,
        ];

        for kind in kinds {
            for from in all.iter().filter(|s| s.is_terminal()) {
                for to in all {
                    assert!(
                        !kind.allows(*from, to),
                        "{:?} allowed {:?} -> {:?}",
                        kind,
                        from,
                        to
                    );
                }
            }
        }
    }

    #[test]
    fn test_validate_complaint_requires_fields() {
        let today = date("2025-03-10");

        let payload = RequestPayload::Complaint {
            title: "Noisy corridor".to_string(),
            description: "Loud music after midnight".to_string(),
        };
        assert!(payload.validate(today).is_ok());

        let payload = RequestPayload::Complaint {
            title: "  ".to_string(),
            description: "Loud music".to_string(),
        };
        assert!(payload.validate(today).is_err());
    }

    #[test]
    fn test_validate_sleepover_date_ordering() {
        let today = date("2025-03-10");

        let ok = RequestPayload::Sleepover {
            guest_name: "Sam Okafor".to_string(),
            guest_email: "sam@example.com".to_string(),
            start_date: date("2025-03-14"),
            end_date: date("2025-03-14"),
        };
        assert!(ok.validate(today).is_ok());

        let bad = RequestPayload::Sleepover {
            guest_name: "Sam Okafor".to_string(),
            guest_email: "sam@example.com".to_string(),
            start_date: date("2025-03-15"),
            end_date: date("2025-03-14"),
        };
        assert!(bad.validate(today).is_err());
    }

    #[test]
    fn test_validate_guest_visit_date() {
        let today = date("2025-03-10");

        let same_day = RequestPayload::Guest {
            guest_name: "Ada Obi".to_string(),
            guest_email: "ada@example.com".to_string(),
            visit_date: date("2025-03-10"),
            visit_time: "14:00".to_string(),
            purpose: "Study session".to_string(),
        };
        assert!(same_day.validate(today).is_ok());

        let past = RequestPayload::Guest {
            guest_name: "Ada Obi".to_string(),
            guest_email: "ada@example.com".to_string(),
            visit_date: date("2025-03-09"),
            visit_time: "14:00".to_string(),
            purpose: "Study session".to_string(),
        };
        assert!(past.validate(today).is_err());
    }

    #[test]
    fn test_validate_guest_email_shape() {
        let today = date("2025-03-10");

        let bad = RequestPayload::Guest {
            guest_name: "Ada Obi".to_string(),
            guest_email: "not-an-email".to_string(),
            visit_date: date("2025-03-11"),
            visit_time: "14:00".to_string(),
            purpose: "Visit".to_string(),
        };
        assert!(bad.validate(today).is_err());
    }

    #[test]
    fn test_payload_kind_tagging() {
        let payload = RequestPayload::Maintenance {
            title: "Leaking tap".to_string(),
            description: "Kitchen sink".to_string(),
            priority: Priority::High,
        };
        assert_eq!(payload.kind(), RequestKind::Maintenance);

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "maintenance");
        assert_eq!(json["priority"], "high");
    }
}
