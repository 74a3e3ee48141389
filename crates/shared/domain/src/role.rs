//! Roles and the user/role junction.

use serde::{Deserialize, Serialize};

use crate::audit::Auditable;
use crate::normalize::{deserialize_uppercase, uppercase};
use crate::owner::{OwnedByUser, UserRef};

/// One row of the `roles` table. Names are stored upper case.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    roleid: i64,
    #[serde(default, deserialize_with = "deserialize_uppercase")]
    name: String,
    #[serde(skip)]
    audit: Auditable,
}

impl Role {
    pub fn new(name: &str) -> Self {
        Self {
            name: uppercase(name),
            ..Default::default()
        }
    }

    /// Reference an existing role by id only, as clients usually do.
    pub fn with_id(roleid: i64) -> Self {
        Self {
            roleid,
            ..Default::default()
        }
    }

    pub fn roleid(&self) -> i64 {
        self.roleid
    }

    pub fn set_roleid(&mut self, roleid: i64) {
        self.roleid = roleid;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: &str) {
        self.name = uppercase(name);
    }

    pub fn audit(&self) -> &Auditable {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut Auditable {
        &mut self.audit
    }
}

/// One row of the `userroles` junction table.
///
/// Keyed by (`userid`, `roleid`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoles {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserRef>,
    role: Role,
    #[serde(skip)]
    audit: Auditable,
}

impl UserRoles {
    /// Create a junction not yet attached to a user.
    pub fn new(role: Role) -> Self {
        Self {
            user: None,
            role,
            audit: Auditable::default(),
        }
    }

    /// Create a junction attached to `user`.
    pub fn with_user(user: UserRef, role: Role) -> Self {
        Self {
            user: Some(user),
            ..Self::new(role)
        }
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    /// Composite key, once the owner is known.
    pub fn key(&self) -> Option<(i64, i64)> {
        self.user.map(|user| (user.userid, self.role.roleid))
    }

    pub fn audit(&self) -> &Auditable {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut Auditable {
        &mut self.audit
    }
}

/// `UserRoles` as it appears inside a user document.
#[derive(Debug, Serialize)]
pub struct UserRolesView<'a> {
    pub role: &'a Role,
}

impl OwnedByUser for UserRoles {
    type Detached<'a> = UserRolesView<'a>;

    fn user(&self) -> Option<&UserRef> {
        self.user.as_ref()
    }

    fn set_user(&mut self, user: UserRef) {
        self.user = Some(user);
    }

    fn detached(&self) -> UserRolesView<'_> {
        UserRolesView { role: &self.role }
    }
}
