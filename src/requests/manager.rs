/// Request lifecycle persistence
use crate::error::{HubError, HubResult};
use crate::account::Role;
use crate::requests::lifecycle::{Priority, Request, RequestKind, RequestPayload, RequestStatus};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Request manager
#[derive(Clone)]
pub struct RequestManager {
    db: SqlitePool,
}

const REQUEST_COLUMNS: &str = "id, owner_id, kind, title, description, priority, guest_name, \
     guest_email, visit_date, visit_time, purpose, start_date, end_date, \
     status, admin_response, created_at, updated_at";

impl RequestManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Create a request with status `pending`
    pub async fn create_request(&self, owner_id: &str, payload: RequestPayload) -> HubResult<Request> {
        let now = Utc::now();
        payload.validate(now.date_naive())?;

        let id = Uuid::new_v4().to_string();
        let columns = PayloadColumns::from(&payload);

        sqlx::query(
            r#"
            INSERT INTO request
            (id, owner_id, kind, title, description, priority, guest_name, guest_email,
             visit_date, visit_time, purpose, start_date, end_date, status, admin_response,
             created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'pending', NULL, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(owner_id)
        .bind(payload.kind().as_str())
        .bind(&columns.title)
        .bind(&columns.description)
        .bind(&columns.priority)
        .bind(&columns.guest_name)
        .bind(&columns.guest_email)
        .bind(&columns.visit_date)
        .bind(&columns.visit_time)
        .bind(&columns.purpose)
        .bind(&columns.start_date)
        .bind(&columns.end_date)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::info!(
            "Created {} request {} for {}",
            payload.kind().as_str(),
            id,
            owner_id
        );

        Ok(Request {
            id,
            owner_id: owner_id.to_string(),
            payload,
            status: RequestStatus::Pending,
            admin_response: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Move a request along its kind's status graph. Admin-only.
    ///
    /// A non-empty admin response is appended to the owner's communication
    /// log alongside the status change.
    pub async fn transition(
        &self,
        request_id: &str,
        new_status: RequestStatus,
        actor_role: Role,
        admin_response: Option<&str>,
    ) -> HubResult<Request> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may change request status".to_string(),
            ));
        }

        let mut request = self
            .get_request(request_id)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("Request {} not found", request_id)))?;

        if !request.kind().allows(request.status, new_status) {
            return Err(HubError::InvalidTransition(format!(
                "{} request cannot move from {} to {}",
                request.kind().as_str(),
                request.status.as_str(),
                new_status.as_str()
            )));
        }

        let now = Utc::now();
        sqlx::query(
            r#"
            UPDATE request
            SET status = ?,
                admin_response = COALESCE(?, admin_response),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(new_status.as_str())
        .bind(admin_response)
        .bind(now.to_rfc3339())
        .bind(request_id)
        .execute(&self.db)
        .await?;

        let response = admin_response.map(str::trim).filter(|s| !s.is_empty());
        if let Some(message) = response {
            sqlx::query(
                r#"
                INSERT INTO communication_log (account_id, message, sent_by, timestamp)
                VALUES (?, ?, 'admin', ?)
                "#,
            )
            .bind(&request.owner_id)
            .bind(message)
            .bind(now.to_rfc3339())
            .execute(&self.db)
            .await?;
        }

        tracing::info!(
            "Request {} moved {} -> {}",
            request_id,
            request.status.as_str(),
            new_status.as_str()
        );

        request.status = new_status;
        if let Some(message) = response {
            request.admin_response = Some(message.to_string());
        }
        request.updated_at = now;

        Ok(request)
    }

    /// Get request by ID
    pub async fn get_request(&self, request_id: &str) -> HubResult<Option<Request>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM request WHERE id = ?",
            REQUEST_COLUMNS
        ))
        .bind(request_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(row) = row {
            Ok(Some(parse_request(row)?))
        } else {
            Ok(None)
        }
    }

    /// All requests owned by one account, newest first
    pub async fn list_for_owner(
        &self,
        owner_id: &str,
        kind: Option<RequestKind>,
    ) -> HubResult<Vec<Request>> {
        let rows = if let Some(kind) = kind {
            sqlx::query(&format!(
                "SELECT {} FROM request WHERE owner_id = ? AND kind = ? \
                 ORDER BY created_at DESC, id ASC",
                REQUEST_COLUMNS
            ))
            .bind(owner_id)
            .bind(kind.as_str())
            .fetch_all(&self.db)
            .await?
        } else {
            sqlx::query(&format!(
                "SELECT {} FROM request WHERE owner_id = ? \
                 ORDER BY created_at DESC, id ASC",
                REQUEST_COLUMNS
            ))
            .bind(owner_id)
            .fetch_all(&self.db)
            .await?
        };

        rows.into_iter().map(parse_request).collect()
    }

    /// All requests, optionally filtered, newest first
    pub async fn list_all(
        &self,
        kind: Option<RequestKind>,
        status: Option<RequestStatus>,
    ) -> HubResult<Vec<Request>> {
        let mut sql = format!("SELECT {} FROM request", REQUEST_COLUMNS);
        let mut clauses = Vec::new();
        if kind.is_some() {
            clauses.push("kind = ?");
        }
        if status.is_some() {
            clauses.push("status = ?");
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY created_at DESC, id ASC");

        let mut query = sqlx::query(&sql);
        if let Some(kind) = kind {
            query = query.bind(kind.as_str());
        }
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }

        let rows = query.fetch_all(&self.db).await?;
        rows.into_iter().map(parse_request).collect()
    }
}

/// Column values for the kind-specific payload fields
#[derive(Default)]
struct PayloadColumns {
    title: Option<String>,
    description: Option<String>,
    priority: Option<String>,
    guest_name: Option<String>,
    guest_email: Option<String>,
    visit_date: Option<String>,
    visit_time: Option<String>,
    purpose: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl From<&RequestPayload> for PayloadColumns {
    fn from(payload: &RequestPayload) -> Self {
        let mut columns = Self::default();
        match payload {
            RequestPayload::Complaint { title, description } => {
                columns.title = Some(title.clone());
                columns.description = Some(description.clone());
            }
            RequestPayload::Maintenance {
                title,
                description,
                priority,
            } => {
                columns.title = Some(title.clone());
                columns.description = Some(description.clone());
                columns.priority = Some(priority.as_str().to_string());
            }
            RequestPayload::Sleepover {
                guest_name,
                guest_email,
                start_date,
                end_date,
            } => {
                columns.guest_name = Some(guest_name.clone());
                columns.guest_email = Some(guest_email.clone());
                columns.start_date = Some(start_date.to_string());
                columns.end_date = Some(end_date.to_string());
            }
            RequestPayload::Guest {
                guest_name,
                guest_email,
                visit_date,
                visit_time,
                purpose,
            } => {
                columns.guest_name = Some(guest_name.clone());
                columns.guest_email = Some(guest_email.clone());
                columns.visit_date = Some(visit_date.to_string());
                columns.visit_time = Some(visit_time.clone());
                columns.purpose = Some(purpose.clone());
            }
        }
        columns
    }
}

fn required_column(row: &sqlx::sqlite::SqliteRow, column: &str) -> HubResult<String> {
    row.try_get::<Option<String>, _>(column)
        .map_err(HubError::Database)?
        .ok_or_else(|| HubError::Internal(format!("Request row missing column '{}'", column)))
}

fn parse_date(value: &str) -> HubResult<NaiveDate> {
    value
        .parse()
        .map_err(|e| HubError::Internal(format!("Invalid date: {}", e)))
}

fn parse_timestamp(value: &str) -> HubResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| HubError::Internal(format!("Invalid timestamp: {}", e)))
        .map(|dt| dt.with_timezone(&Utc))
}

/// Parse a database row into a Request
pub(crate) fn parse_request(row: sqlx::sqlite::SqliteRow) -> HubResult<Request> {
    let kind_str: String = row.get("kind");
    let kind = RequestKind::from_str(&kind_str)?;

    let payload = match kind {
        RequestKind::Complaint => RequestPayload::Complaint {
            title: required_column(&row, "title")?,
            description: required_column(&row, "description")?,
        },
        RequestKind::Maintenance => RequestPayload::Maintenance {
            title: required_column(&row, "title")?,
            description: required_column(&row, "description")?,
            priority: Priority::from_str(&required_column(&row, "priority")?)?,
        },
        RequestKind::Sleepover => RequestPayload::Sleepover {
            guest_name: required_column(&row, "guest_name")?,
            guest_email: required_column(&row, "guest_email")?,
            start_date: parse_date(&required_column(&row, "start_date")?)?,
            end_date: parse_date(&required_column(&row, "end_date")?)?,
        },
        RequestKind::Guest => RequestPayload::Guest {
            guest_name: required_column(&row, "guest_name")?,
            guest_email: required_column(&row, "guest_email")?,
            visit_date: parse_date(&required_column(&row, "visit_date")?)?,
            visit_time: required_column(&row, "visit_time")?,
            purpose: required_column(&row, "purpose")?,
        },
    };

    let status_str: String = row.get("status");
    let status = RequestStatus::from_str(&status_str)?;

    let created_at = parse_timestamp(&required_column(&row, "created_at")?)?;
    let updated_at = parse_timestamp(&required_column(&row, "updated_at")?)?;

    Ok(Request {
        id: row.get("id"),
        owner_id: row.get("owner_id"),
        payload,
        status,
        admin_response: row.get("admin_response"),
        created_at,
        updated_at,
    })
}
