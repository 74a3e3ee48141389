//! SeaORM entity definitions
//!
//! These are database-specific entities separate from domain models.

use domain::Auditable;
use sea_orm::entity::prelude::DateTimeUtc;

pub mod role;
pub mod user;
pub mod useremail;
pub mod userroles;

/// Build audit metadata from the four audit columns every table carries.
pub(crate) fn auditable(
    created_by: Option<String>,
    created_date: Option<DateTimeUtc>,
    last_modified_by: Option<String>,
    last_modified_date: Option<DateTimeUtc>,
) -> Auditable {
    Auditable {
        created_by,
        created_date,
        last_modified_by,
        last_modified_date,
    }
}
