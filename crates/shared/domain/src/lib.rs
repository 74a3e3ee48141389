//! Domain layer - User aggregate and the rows it owns.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Normalization, ownership of child rows and the JSON shape of a user all
//! live here; persistence is the service crate's job.

pub mod audit;
pub mod constants;
pub mod error;
pub mod normalize;
pub mod owner;
pub mod password;
pub mod role;
pub mod user;
pub mod useremail;

pub use audit::Auditable;
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use owner::{OwnedByUser, UserRef};
pub use password::{Password, UserPassword};
pub use role::{Role, UserRoles, UserRolesView};
pub use user::User;
pub use useremail::{Useremail, UseremailView};
