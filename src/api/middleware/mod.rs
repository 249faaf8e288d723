// Request layers shared by both API surfaces

pub mod accept;
pub mod audit;
pub mod customer;

pub use accept::require_json_middleware;
pub use audit::{audit_middleware, Actor, AuditConfig};
pub use customer::Customer;
