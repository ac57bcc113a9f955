/// Request lifecycle engine
///
/// Shared state machine and persistence for complaint, maintenance,
/// sleepover and guest requests.
pub mod lifecycle;
pub mod manager;

pub use lifecycle::{Priority, Request, RequestKind, RequestPayload, RequestStatus};
pub use manager::RequestManager;
