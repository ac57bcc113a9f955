/// Background task implementations
use crate::{context::AppContext, db, error::HubResult};

/// Remove sessions past their expiry
pub async fn cleanup_expired_sessions(ctx: &AppContext) -> HubResult<u64> {
    ctx.account_manager.cleanup_expired_sessions().await
}

/// Verify the database still answers
pub async fn health_check(ctx: &AppContext) -> HubResult<()> {
    db::test_connection(&ctx.db).await
}
