/// API routes and handlers
pub mod admin;
pub mod announcements;
pub mod middleware;
pub mod notifications;
pub mod requests;
pub mod server;

use crate::context::AppContext;
use axum::Router;

/// Build API routes
pub fn routes() -> Router<AppContext> {
    Router::new()
        .merge(server::routes())
        .merge(requests::routes())
        .merge(notifications::routes())
        .merge(announcements::routes())
        .merge(admin::routes())
}
