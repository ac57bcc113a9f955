/// Announcement management
///
/// Admins post, edit and delete announcements; students read them.
use crate::account::Role;
use crate::error::{HubError, HubResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

/// Announcement record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Announcement manager
#[derive(Clone)]
pub struct AnnouncementManager {
    db: SqlitePool,
}

impl AnnouncementManager {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Post an announcement. Admin-only.
    pub async fn create(
        &self,
        title: &str,
        content: &str,
        actor_role: Role,
        author_id: &str,
    ) -> HubResult<Announcement> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may post announcements".to_string(),
            ));
        }
        validate_fields(title, content)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO announcement (id, title, content, author_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&id)
        .bind(title)
        .bind(content)
        .bind(author_id)
        .bind(now.to_rfc3339())
        .bind(now.to_rfc3339())
        .execute(&self.db)
        .await?;

        tracing::info!("Announcement {} posted by {}", id, author_id);

        Ok(Announcement {
            id,
            title: title.to_string(),
            content: content.to_string(),
            author_id: author_id.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Edit an announcement. Admin-only.
    pub async fn update(
        &self,
        announcement_id: &str,
        title: &str,
        content: &str,
        actor_role: Role,
    ) -> HubResult<()> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may edit announcements".to_string(),
            ));
        }
        validate_fields(title, content)?;

        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE announcement SET title = ?1, content = ?2, updated_at = ?3 WHERE id = ?4",
        )
        .bind(title)
        .bind(content)
        .bind(now.to_rfc3339())
        .bind(announcement_id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!(
                "Announcement {} not found",
                announcement_id
            )));
        }

        Ok(())
    }

    /// Delete an announcement. Admin-only.
    pub async fn delete(&self, announcement_id: &str, actor_role: Role) -> HubResult<()> {
        if !actor_role.is_admin() {
            return Err(HubError::Forbidden(
                "Only admins may delete announcements".to_string(),
            ));
        }

        let result = sqlx::query("DELETE FROM announcement WHERE id = ?1")
            .bind(announcement_id)
            .execute(&self.db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(HubError::NotFound(format!(
                "Announcement {} not found",
                announcement_id
            )));
        }

        Ok(())
    }

    /// All announcements, newest first
    pub async fn list(&self) -> HubResult<Vec<Announcement>> {
        let rows = sqlx::query(
            "SELECT id, title, content, author_id, created_at, updated_at
             FROM announcement ORDER BY created_at DESC, id ASC",
        )
        .fetch_all(&self.db)
        .await?;

        let mut announcements = Vec::new();
        for row in rows {
            let created_at_str: String = row.get("created_at");
            let updated_at_str: String = row.get("updated_at");

            announcements.push(Announcement {
                id: row.get("id"),
                title: row.get("title"),
                content: row.get("content"),
                author_id: row.get("author_id"),
                created_at: parse_timestamp(&created_at_str)?,
                updated_at: parse_timestamp(&updated_at_str)?,
            });
        }

        Ok(announcements)
    }
}

fn validate_fields(title: &str, content: &str) -> HubResult<()> {
    if title.trim().is_empty() {
        return Err(HubError::Validation("Title cannot be empty".to_string()));
    }
    if content.trim().is_empty() {
        return Err(HubError::Validation("Content cannot be empty".to_string()));
    }
    Ok(())
}

fn parse_timestamp(value: &str) -> HubResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map_err(|e| HubError::Internal(format!("Invalid timestamp: {}", e)))
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> SqlitePool {
        let db = SqlitePool::connect(":memory:").await.unwrap();

        sqlx::query(
            r#"
            CREATE TABLE announcement (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                content TEXT NOT NULL,
                author_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&db)
        .await
        .unwrap();

        db
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let manager = AnnouncementManager::new(setup_db().await);

        let posted = manager
            .create(
                "Fire drill",
                "Thursday at 10:00, assemble in the courtyard",
                Role::Admin,
                "admin-1",
            )
            .await
            .unwrap();

        let listed = manager.list().await.unwrap();
        assert_eq!(listed, vec![posted]);
    }

    #[tokio::test]
    async fn test_non_admin_cannot_mutate() {
        let manager = AnnouncementManager::new(setup_db().await);

        let result = manager
            .create("Fire drill", "Thursday", Role::Student, "student-1")
            .await;
        assert!(matches!(result, Err(HubError::Forbidden(_))));

        let result = manager.delete("whatever", Role::Applicant).await;
        assert!(matches!(result, Err(HubError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let manager = AnnouncementManager::new(setup_db().await);

        let posted = manager
            .create("Fire drill", "Thursday", Role::Admin, "admin-1")
            .await
            .unwrap();

        manager
            .update(&posted.id, "Fire drill moved", "Friday", Role::Admin)
            .await
            .unwrap();

        let listed = manager.list().await.unwrap();
        assert_eq!(listed[0].title, "Fire drill moved");

        manager.delete(&posted.id, Role::Admin).await.unwrap();
        assert!(manager.list().await.unwrap().is_empty());

        let result = manager.delete(&posted.id, Role::Admin).await;
        assert!(matches!(result, Err(HubError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let manager = AnnouncementManager::new(setup_db().await);

        let result = manager.create("", "Content", Role::Admin, "admin-1").await;
        assert!(matches!(result, Err(HubError::Validation(_))));

        let result = manager
            .create("Title", "   ", Role::Admin, "admin-1")
            .await;
        assert!(matches!(result, Err(HubError::Validation(_))));
    }
}
