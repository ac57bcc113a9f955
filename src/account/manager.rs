/// Account manager implementation using runtime queries
use crate::{
    account::{
        ApplicationDecision, ApplicationProfile, ApplicationStatus, Role, SentBy, ValidatedSession,
    },
    config::ServerConfig,
    db::account::{Account, CommunicationEntry, Session},
    error::{HubError, HubResult},
};
use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use std::sync::Arc;
use uuid::Uuid;

const ACCOUNT_COLUMNS: &str = "id, email, password_hash, display_name, phone, room_number, \
     institution, role, application_status, created_at, updated_at";

/// Account manager service
pub struct AccountManager {
    db: SqlitePool,
    config: Arc<ServerConfig>,
}

impl AccountManager {
    /// Create a new account manager
    pub fn new(db: SqlitePool, config: Arc<ServerConfig>) -> Self {
        Self { db, config }
    }

    /// Submit a residence application. The account starts as an applicant
    /// with a pending application.
    pub async fn submit_application(
        &self,
        email: &str,
        password: &str,
        profile: ApplicationProfile,
    ) -> HubResult<Account> {
        validate_email(email)?;
        validate_password(password)?;
        if profile.display_name.trim().is_empty() {
            return Err(HubError::Validation(
                "Required field 'display_name' is missing".to_string(),
            ));
        }

        if self.email_exists(email).await? {
            return Err(HubError::Conflict("Email already registered".to_string()));
        }

        let password_hash = hash_password(password)?;
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO account
            (id, email, password_hash, display_name, phone, room_number, institution,
             role, application_status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'applicant', 'pending', ?, ?)
            "#,
        )
        .bind(&id)
        .bind(email)
        .bind(&password_hash)
        .bind(&profile.display_name)
        .bind(&profile.phone)
        .bind(&profile.room_number)
        .bind(&profile.institution)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::info!("Application submitted for {}", email);

        Ok(Account {
            id,
            email: email.to_string(),
            password_hash,
            display_name: profile.display_name,
            phone: profile.phone,
            room_number: profile.room_number,
            institution: profile.institution,
            role: Role::Applicant,
            application_status: Some(ApplicationStatus::Pending),
            created_at: now,
            updated_at: now,
        })
    }

    /// Authenticate account and create session
    pub async fn login(&self, email: &str, password: &str) -> HubResult<(Account, Session)> {
        let mut account = self
            .get_account_by_email(email)
            .await?
            .ok_or_else(|| HubError::Authentication("Invalid email or password".to_string()))?;

        if !verify_password(password, &account.password_hash)? {
            return Err(HubError::Authentication(
                "Invalid email or password".to_string(),
            ));
        }

        // Bootstrap configured admins on login; admins carry no application status
        if !account.role.is_admin()
            && self
                .config
                .authentication
                .admin_emails
                .iter()
                .any(|e| e.eq_ignore_ascii_case(email))
        {
            let now = Utc::now();
            sqlx::query(
                "UPDATE account SET role = 'admin', application_status = NULL, updated_at = ? WHERE id = ?",
            )
            .bind(now.to_rfc3339())
            .bind(&account.id)
            .execute(&self.db)
            .await?;

            tracing::info!("Promoted configured admin {}", email);
            account.role = Role::Admin;
            account.application_status = None;
            account.updated_at = now;
        }

        let session = self.create_session(&account).await?;
        Ok((account, session))
    }

    /// Create a session for an account
    pub async fn create_session(&self, account: &Account) -> HubResult<Session> {
        let session_id = Uuid::new_v4().to_string();
        let access_token = self.generate_access_token(&account.id, &session_id, account.role)?;

        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.authentication.session_ttl_hours);

        sqlx::query(
            "INSERT INTO session (id, account_id, access_token, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(&session_id)
        .bind(&account.id)
        .bind(&access_token)
        .bind(now.to_rfc3339())
        .bind(expires_at.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(Session {
            id: session_id,
            account_id: account.id.clone(),
            access_token,
            created_at: now,
            expires_at,
        })
    }

    /// Validate access token and return session info
    pub async fn validate_access_token(&self, token: &str) -> HubResult<ValidatedSession> {
        let row = sqlx::query(
            "SELECT s.id AS session_id, s.account_id, s.expires_at, a.role
             FROM session s JOIN account a ON a.id = s.account_id
             WHERE s.access_token = ?1",
        )
        .bind(token)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| HubError::Authentication("Invalid or expired session".to_string()))?;

        let expires_at_str: String = row.get("expires_at");
        let expires_at = parse_timestamp(&expires_at_str)?;
        if expires_at <= Utc::now() {
            return Err(HubError::Authentication("Session expired".to_string()));
        }

        let role_str: String = row.get("role");

        Ok(ValidatedSession {
            account_id: row.get("account_id"),
            session_id: row.get("session_id"),
            role: Role::from_str(&role_str)?,
        })
    }

    /// Delete a session (logout)
    pub async fn delete_session(&self, session_id: &str) -> HubResult<()> {
        sqlx::query("DELETE FROM session WHERE id = ?1")
            .bind(session_id)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Remove sessions past their expiry
    pub async fn cleanup_expired_sessions(&self) -> HubResult<u64> {
        let result = sqlx::query("DELETE FROM session WHERE expires_at < ?1")
            .bind(Utc::now().to_rfc3339())
            .execute(&self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Get account by ID
    pub async fn get_account(&self, account_id: &str) -> HubResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM account WHERE id = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(account_id)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_account).transpose()
    }

    /// Get account by email
    pub async fn get_account_by_email(&self, email: &str) -> HubResult<Option<Account>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM account WHERE email = ?1",
            ACCOUNT_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await?;

        row.map(parse_account).transpose()
    }

    /// List all accounts, newest first
    pub async fn list_accounts(&self) -> HubResult<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM account ORDER BY created_at DESC, id ASC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_account).collect()
    }

    /// Applications awaiting a decision, oldest first
    pub async fn list_pending_applications(&self) -> HubResult<Vec<Account>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM account WHERE application_status = 'pending' \
             ORDER BY created_at ASC, id ASC",
            ACCOUNT_COLUMNS
        ))
        .fetch_all(&self.db)
        .await?;

        rows.into_iter().map(parse_account).collect()
    }

    /// Decide a pending application. Admin-only. Acceptance promotes the
    /// applicant to student; the message is appended to the account's
    /// communication log.
    pub async fn decide_application(
        &self,
        account_id: &str,
        decision: ApplicationDecision,
        message: &str,
        actor_role: Role,
        admin_id: &str,
    ) -> HubResult<Account> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may decide applications".to_string(),
            ));
        }

        let mut account = self
            .get_account(account_id)
            .await?
            .filter(|a| a.application_status == Some(ApplicationStatus::Pending))
            .ok_or_else(|| {
                HubError::NotFound(format!(
                    "No pending application for account {}",
                    account_id
                ))
            })?;

        let new_role = match decision {
            ApplicationDecision::Accepted => Role::Student,
            ApplicationDecision::Denied => account.role,
        };

        let now = Utc::now();
        sqlx::query(
            "UPDATE account SET application_status = ?1, role = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(decision.status().as_str())
        .bind(new_role.as_str())
        .bind(now.to_rfc3339())
        .bind(account_id)
        .execute(&self.db)
        .await?;

        sqlx::query(
            "INSERT INTO communication_log (account_id, message, sent_by, timestamp)
             VALUES (?1, ?2, 'admin', ?3)",
        )
        .bind(account_id)
        .bind(message)
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::info!(
            "Application for {} {} by {}",
            account_id,
            decision.as_str(),
            admin_id
        );

        account.application_status = Some(decision.status());
        account.role = new_role;
        account.updated_at = now;
        Ok(account)
    }

    /// Append a message to an account's communication log
    pub async fn add_communication(
        &self,
        account_id: &str,
        message: &str,
        sent_by: SentBy,
    ) -> HubResult<CommunicationEntry> {
        if message.trim().is_empty() {
            return Err(HubError::Validation("Message cannot be empty".to_string()));
        }

        if self.get_account(account_id).await?.is_none() {
            return Err(HubError::NotFound(format!(
                "Account {} not found",
                account_id
            )));
        }

        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO communication_log (account_id, message, sent_by, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(account_id)
        .bind(message)
        .bind(sent_by.as_str())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(CommunicationEntry {
            id: result.last_insert_rowid(),
            account_id: account_id.to_string(),
            message: message.to_string(),
            sent_by,
            timestamp: now,
        })
    }

    /// Full communication log for an account, in append order
    pub async fn communication_log(&self, account_id: &str) -> HubResult<Vec<CommunicationEntry>> {
        let rows = sqlx::query(
            "SELECT id, account_id, message, sent_by, timestamp
             FROM communication_log WHERE account_id = ?1
             ORDER BY timestamp ASC, id ASC",
        )
        .bind(account_id)
        .fetch_all(&self.db)
        .await?;

        let mut entries = Vec::new();
        for row in rows {
            let sent_by_str: String = row.get("sent_by");
            let timestamp_str: String = row.get("timestamp");

            entries.push(CommunicationEntry {
                id: row.get("id"),
                account_id: row.get("account_id"),
                message: row.get("message"),
                sent_by: SentBy::from_str(&sent_by_str)?,
                timestamp: parse_timestamp(&timestamp_str)?,
            });
        }

        Ok(entries)
    }

    /// Change an account's role. Admin-only; the admin role carries no
    /// application status.
    pub async fn set_role(
        &self,
        account_id: &str,
        role: Role,
        actor_role: Role,
        admin_id: &str,
    ) -> HubResult<Account> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may change roles".to_string(),
            ));
        }

        let mut account = self
            .get_account(account_id)
            .await?
            .ok_or_else(|| HubError::NotFound(format!("Account {} not found", account_id)))?;

        let application_status = if role.is_admin() {
            None
        } else {
            account.application_status
        };

        let now = Utc::now();
        sqlx::query(
            "UPDATE account SET role = ?1, application_status = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(role.as_str())
        .bind(application_status.map(|s| s.as_str()))
        .bind(now.to_rfc3339())
        .bind(account_id)
        .execute(&self.db)
        .await?;

        tracing::info!(
            "Role of {} set to {} by {}",
            account_id,
            role.as_str(),
            admin_id
        );

        account.role = role;
        account.application_status = application_status;
        account.updated_at = now;
        Ok(account)
    }

    /// Delete an account. Admin-only.
    pub async fn delete_account(
        &self,
        account_id: &str,
        actor_role: Role,
        admin_id: &str,
    ) -> HubResult<()> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may delete accounts".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM account WHERE id = ?1")
            .bind(account_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!(
                "Account {} not found",
                account_id
            )));
        }

        tracing::info!("Account {} deleted by {}", account_id, admin_id);
        Ok(())
    }

    /// Log admin action to audit log
    pub async fn log_action(
        &self,
        admin_id: &str,
        action: &str,
        subject_id: Option<&str>,
        details: Option<&str>,
    ) -> HubResult<()> {
        sqlx::query(
            "INSERT INTO admin_audit_log (admin_id, action, subject_id, details, timestamp)
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(admin_id)
        .bind(action)
        .bind(subject_id)
        .bind(details)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    async fn email_exists(&self, email: &str) -> HubResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM account WHERE email = ?1")
            .bind(email)
            .fetch_one(&self.db)
            .await?;

        Ok(count > 0)
    }

    fn generate_access_token(
        &self,
        account_id: &str,
        session_id: &str,
        role: Role,
    ) -> HubResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        #[derive(Serialize, Deserialize)]
        struct Claims {
            sub: String,
            sid: String,
            role: String,
            iat: i64,
            exp: i64,
        }

        let now = Utc::now();
        let claims = Claims {
            sub: account_id.to_string(),
            sid: session_id.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.config.authentication.session_ttl_hours)).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.authentication.jwt_secret.as_bytes()),
        )
        .map_err(|e| HubError::Internal(format!("Token generation failed: {}", e)))
    }
}

fn validate_email(email: &str) -> HubResult<()> {
    let trimmed = email.trim();
    if trimmed.is_empty() || !trimmed.contains('@') || trimmed.len() > 254 {
        return Err(HubError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

fn validate_password(password: &str) -> HubResult<()> {
    if password.len() < 8 {
        return Err(HubError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }
    Ok(())
}

fn hash_password(password: &str) -> HubResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| HubError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> HubResult<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| HubError::Internal(format!("Invalid password hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(HubError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

fn parse_timestamp(value: &str) -> HubResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| HubError::Internal(format!("Invalid timestamp: {}", e)))
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_account(row: sqlx::sqlite::SqliteRow) -> HubResult<Account> {
    let role_str: String = row.get("role");
    let role = Role::from_str(&role_str)?;

    let application_status = row
        .try_get::<Option<String>, _>("application_status")
        .map_err(HubError::Database)?
        .map(|s| ApplicationStatus::from_str(&s))
        .transpose()?;

    let created_at_str: String = row.get("created_at");
    let updated_at_str: String = row.get("updated_at");

    Ok(Account {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        display_name: row.get("display_name"),
        phone: row.get("phone"),
        room_number: row.get("room_number"),
        institution: row.get("institution"),
        role,
        application_status,
        created_at: parse_timestamp(&created_at_str)?,
        updated_at: parse_timestamp(&updated_at_str)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        AuthConfig, LoggingConfig, NotificationConfig, ServiceConfig, StorageConfig,
    };

    fn test_config() -> Arc<ServerConfig> {
        Arc::new(ServerConfig {
            service: ServiceConfig {
                hostname: "localhost".to_string(),
                port: 4585,
                version: "0.1.0".to_string(),
            },
            storage: StorageConfig {
                data_directory: "./data".into(),
                database: ":memory:".into(),
            },
            authentication: AuthConfig {
                jwt_secret: "0123456789abcdef0123456789abcdef".to_string(),
                session_ttl_hours: 24,
                admin_emails: vec!["warden@example.com".to_string()],
            },
            email: None,
            notifications: NotificationConfig {
                poll_interval_secs: 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        })
    }

    async fn setup_db() -> SqlitePool {
        let db = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE account (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                display_name TEXT NOT NULL,
                phone TEXT,
                room_number TEXT,
                institution TEXT,
                role TEXT NOT NULL,
                application_status TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE session (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                access_token TEXT NOT NULL UNIQUE,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE communication_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id TEXT NOT NULL,
                message TEXT NOT NULL,
                sent_by TEXT NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        sqlx::query(
            r#"
            CREATE TABLE admin_audit_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                admin_id TEXT NOT NULL,
                action TEXT NOT NULL,
                subject_id TEXT,
                details TEXT,
                timestamp TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        db
    }

    fn profile(name: &str) -> ApplicationProfile {
        ApplicationProfile {
            display_name: name.to_string(),
            phone: Some("0123456789".to_string()),
            room_number: Some("B14".to_string()),
            institution: Some("City University".to_string()),
        }
    }

    #[tokio::test]
    async fn test_submit_application() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        assert_eq!(account.role, Role::Applicant);
        assert_eq!(account.application_status, Some(ApplicationStatus::Pending));
        assert_eq!(account.created_at, account.updated_at);

        let stored = manager.get_account(&account.id).await.unwrap().unwrap();
        assert_eq!(stored, account);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let manager = AccountManager::new(setup_db().await, test_config());

        manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        let result = manager
            .submit_application("ada@example.com", "other-password", profile("Ada Again"))
            .await;
        assert!(matches!(result, Err(HubError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_weak_password_rejected() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let result = manager
            .submit_application("ada@example.com", "short", profile("Ada Obi"))
            .await;
        assert!(matches!(result, Err(HubError::Validation(_))));
    }

    #[tokio::test]
    async fn test_login_and_token_validation() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        let (logged_in, session) = manager
            .login("ada@example.com", "sturdy-password")
            .await
            .unwrap();
        assert_eq!(logged_in.id, account.id);

        let validated = manager
            .validate_access_token(&session.access_token)
            .await
            .unwrap();
        assert_eq!(validated.account_id, account.id);
        assert_eq!(validated.role, Role::Applicant);

        let result = manager.login("ada@example.com", "wrong-password").await;
        assert!(matches!(result, Err(HubError::Authentication(_))));
    }

    #[tokio::test]
    async fn test_configured_admin_promoted_on_login() {
        let manager = AccountManager::new(setup_db().await, test_config());

        manager
            .submit_application("warden@example.com", "sturdy-password", profile("Warden"))
            .await
            .unwrap();

        let (account, _) = manager
            .login("warden@example.com", "sturdy-password")
            .await
            .unwrap();
        assert_eq!(account.role, Role::Admin);
        assert!(account.application_status.is_none());
    }

    #[tokio::test]
    async fn test_expired_session_rejected() {
        let db = setup_db().await;
        let manager = AccountManager::new(db.clone(), test_config());

        manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();
        let (_, session) = manager
            .login("ada@example.com", "sturdy-password")
            .await
            .unwrap();

        sqlx::query("UPDATE session SET expires_at = '2020-01-01T00:00:00+00:00' WHERE id = ?")
            .bind(&session.id)
            .execute(&db)
            .await
            .unwrap();

        let result = manager.validate_access_token(&session.access_token).await;
        assert!(matches!(result, Err(HubError::Authentication(_))));

        let removed = manager.cleanup_expired_sessions().await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_decide_application_accepted() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        let decided = manager
            .decide_application(
                &account.id,
                ApplicationDecision::Accepted,
                "Welcome!",
                Role::Admin,
                "admin-1",
            )
            .await
            .unwrap();

        assert_eq!(decided.role, Role::Student);
        assert_eq!(decided.application_status, Some(ApplicationStatus::Accepted));

        let log = manager.communication_log(&account.id).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].message, "Welcome!");
        assert_eq!(log[0].sent_by, SentBy::Admin);
    }

    #[tokio::test]
    async fn test_decide_application_denied_keeps_role() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        let decided = manager
            .decide_application(
                &account.id,
                ApplicationDecision::Denied,
                "No rooms available this term",
                Role::Admin,
                "admin-1",
            )
            .await
            .unwrap();

        assert_eq!(decided.role, Role::Applicant);
        assert_eq!(decided.application_status, Some(ApplicationStatus::Denied));
    }

    #[tokio::test]
    async fn test_decide_application_requires_admin() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        let result = manager
            .decide_application(
                &account.id,
                ApplicationDecision::Accepted,
                "Welcome!",
                Role::Student,
                "student-1",
            )
            .await;
        assert!(matches!(result, Err(HubError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_decide_application_twice_fails() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        manager
            .decide_application(
                &account.id,
                ApplicationDecision::Accepted,
                "Welcome!",
                Role::Admin,
                "admin-1",
            )
            .await
            .unwrap();

        let result = manager
            .decide_application(
                &account.id,
                ApplicationDecision::Denied,
                "Changed our minds",
                Role::Admin,
                "admin-1",
            )
            .await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_list_pending_applications() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let first = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();
        manager
            .submit_application("sam@example.com", "sturdy-password", profile("Sam Okafor"))
            .await
            .unwrap();

        manager
            .decide_application(
                &first.id,
                ApplicationDecision::Accepted,
                "Welcome!",
                Role::Admin,
                "admin-1",
            )
            .await
            .unwrap();

        let pending = manager.list_pending_applications().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].email, "sam@example.com");
    }

    #[tokio::test]
    async fn test_set_role_to_admin_clears_application_status() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        let updated = manager
            .set_role(&account.id, Role::Admin, Role::Admin, "admin-1")
            .await
            .unwrap();
        assert_eq!(updated.role, Role::Admin);
        assert!(updated.application_status.is_none());

        let result = manager
            .set_role(&account.id, Role::Student, Role::Student, "student-1")
            .await;
        assert!(matches!(result, Err(HubError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_account() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        manager
            .delete_account(&account.id, Role::Admin, "admin-1")
            .await
            .unwrap();
        assert!(manager.get_account(&account.id).await.unwrap().is_none());

        let result = manager
            .delete_account(&account.id, Role::Admin, "admin-1")
            .await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_add_communication() {
        let manager = AccountManager::new(setup_db().await, test_config());

        let account = manager
            .submit_application("ada@example.com", "sturdy-password", profile("Ada Obi"))
            .await
            .unwrap();

        manager
            .add_communication(&account.id, "Please collect your key", SentBy::Admin)
            .await
            .unwrap();
        manager
            .add_communication(&account.id, "Collected, thanks", SentBy::Student)
            .await
            .unwrap();

        let log = manager.communication_log(&account.id).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sent_by, SentBy::Admin);
        assert_eq!(log[1].sent_by, SentBy::Student);

        let result = manager
            .add_communication(&account.id, "   ", SentBy::Admin)
            .await;
        assert!(matches!(result, Err(HubError::Validation(_))));

        let result = manager
            .add_communication("missing", "Hello", SentBy::Admin)
            .await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }
}
