//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Administrator role with elevated privileges
pub const ROLE_ADMIN: &str = "ADMIN";

/// Default role assigned to regular users
pub const ROLE_USER: &str = "USER";

/// Role for accounts that manage data but not users
pub const ROLE_DATA: &str = "DATA";

/// Roles created by the seed routine
pub const SEED_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_USER, ROLE_DATA];

// =============================================================================
// Auditing
// =============================================================================

/// Auditor recorded when no authenticated principal is available
pub const SYSTEM_AUDITOR: &str = "SYSTEM";
