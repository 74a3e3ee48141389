//! Secondary e-mail addresses owned by a user.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::Auditable;
use crate::normalize::{deserialize_lowercase, lowercase};
use crate::owner::{OwnedByUser, UserRef};

/// One row of the `useremails` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Useremail {
    #[serde(default)]
    useremailid: i64,
    #[serde(deserialize_with = "deserialize_lowercase")]
    #[validate(email(message = "useremail must be a valid email address"))]
    useremail: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    user: Option<UserRef>,
    #[serde(skip)]
    audit: Auditable,
}

impl Useremail {
    /// Create an address not yet attached to a user.
    pub fn new(useremail: &str) -> Self {
        Self {
            useremail: lowercase(useremail),
            ..Default::default()
        }
    }

    /// Create an address attached to `user`.
    pub fn with_user(user: UserRef, useremail: &str) -> Self {
        Self {
            user: Some(user),
            ..Self::new(useremail)
        }
    }

    pub fn useremailid(&self) -> i64 {
        self.useremailid
    }

    pub fn set_useremailid(&mut self, useremailid: i64) {
        self.useremailid = useremailid;
    }

    pub fn useremail(&self) -> &str {
        &self.useremail
    }

    pub fn set_useremail(&mut self, useremail: &str) {
        self.useremail = lowercase(useremail);
    }

    pub fn audit(&self) -> &Auditable {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut Auditable {
        &mut self.audit
    }
}

/// `Useremail` as it appears inside a user document.
#[derive(Debug, Serialize)]
pub struct UseremailView<'a> {
    pub useremailid: i64,
    pub useremail: &'a str,
}

impl OwnedByUser for Useremail {
    type Detached<'a> = UseremailView<'a>;

    fn user(&self) -> Option<&UserRef> {
        self.user.as_ref()
    }

    fn set_user(&mut self, user: UserRef) {
        self.user = Some(user);
    }

    fn detached(&self) -> UseremailView<'_> {
        UseremailView {
            useremailid: self.useremailid,
            useremail: &self.useremail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_address_is_lowercased() {
        let mut email = Useremail::new("Admin@Email.LOCAL");
        assert_eq!(email.useremail(), "admin@email.local");

        email.set_useremail("OTHER@Mail.local");
        assert_eq!(email.useremail(), "other@mail.local");
    }

    #[test]
    fn test_standalone_serialization_keeps_owner_id() {
        let email = Useremail::with_user(UserRef::new(7), "a@b.local");
        let value = serde_json::to_value(&email).unwrap();
        assert_eq!(value["user"], json!({ "userid": 7 }));
    }

    #[test]
    fn test_inbound_owner_accepts_full_user_document() {
        let email: Useremail = serde_json::from_value(json!({
            "useremail": "X@Y.local",
            "user": { "userid": 3, "username": "someone" }
        }))
        .unwrap();

        assert_eq!(email.useremail(), "x@y.local");
        assert_eq!(email.user(), Some(&UserRef::new(3)));
    }

    #[test]
    fn test_invalid_address_fails_validation() {
        assert!(Useremail::new("not-an-email").validate().is_err());
        assert!(Useremail::new("ok@mail.local").validate().is_ok());
    }
}
