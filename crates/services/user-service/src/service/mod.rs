//! Service layer for business logic.

mod role_service;
mod user_service;

pub use role_service::{RoleManager, RoleService};
pub use user_service::{UserManager, UserService};
