//! Repository layer for data access.

mod auditor;
pub mod entities;
mod role_repository;
mod user_repository;

pub use auditor::{Auditor, SystemAuditor};
pub use role_repository::{RoleRepository, RoleStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use role_repository::MockRoleRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
