//! User aggregate and related types.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::audit::Auditable;
use crate::error::{DomainError, DomainResult};
use crate::normalize::{deserialize_lowercase_opt, lowercase};
use crate::owner::{serialize_detached, OwnedByUser, UserRef};
use crate::password::{Password, UserPassword};
use crate::role::{Role, UserRoles};
use crate::useremail::Useremail;

/// User aggregate, projected onto the `users` table.
///
/// Owns its `useremails` and `roles` by value. Every child's back-reference
/// is kept pointing at this user: the constructor, the collection setters,
/// `set_userid` and deserialization all re-link them.
///
/// `username` and `primaryemail` are always held lower case. They may be
/// unset while a partial update is being assembled, in which case the
/// getters return `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(from = "UserPayload")]
pub struct User {
    userid: i64,
    #[validate(
        required(message = "username is required"),
        length(min = 1, message = "username must not be empty")
    )]
    username: Option<String>,
    #[serde(skip_serializing)]
    password: Option<UserPassword>,
    #[validate(
        required(message = "primaryemail is required"),
        email(message = "primaryemail must be a valid email address")
    )]
    primaryemail: Option<String>,
    #[serde(serialize_with = "serialize_detached")]
    #[validate(nested)]
    useremails: Vec<Useremail>,
    #[serde(serialize_with = "serialize_detached")]
    roles: Vec<UserRoles>,
    #[serde(skip)]
    audit: Auditable,
}

impl User {
    /// Create a new user holding the given role junctions.
    ///
    /// Each junction is pointed at the new user before it is attached.
    pub fn new(username: &str, password: &str, primaryemail: &str, roles: Vec<UserRoles>) -> Self {
        let mut user = Self::default();
        user.set_username(username);
        user.set_password(password);
        user.set_primaryemail(primaryemail);
        user.set_roles(roles);
        user
    }

    pub fn userid(&self) -> i64 {
        self.userid
    }

    /// Assign the primary key and re-point every child at it.
    pub fn set_userid(&mut self, userid: i64) {
        self.userid = userid;
        self.relink();
    }

    /// True until the storage layer has assigned an id.
    pub fn is_new(&self) -> bool {
        self.userid == 0
    }

    pub fn reference(&self) -> UserRef {
        UserRef::new(self.userid)
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn set_username(&mut self, username: &str) {
        self.username = Some(lowercase(username));
    }

    pub fn primaryemail(&self) -> Option<&str> {
        self.primaryemail.as_deref()
    }

    pub fn set_primaryemail(&mut self, primaryemail: &str) {
        self.primaryemail = Some(lowercase(primaryemail));
    }

    pub fn password(&self) -> Option<&UserPassword> {
        self.password.as_ref()
    }

    /// Set a new plain text password. It is hashed before it is stored.
    pub fn set_password(&mut self, password: impl Into<String>) {
        self.password = Some(UserPassword::Plain(password.into()));
    }

    /// Attach a hash read back from storage.
    pub fn set_password_hash(&mut self, password: Password) {
        self.password = Some(UserPassword::Hashed(password));
    }

    /// Move the password out, leaving it unset.
    pub fn take_password(&mut self) -> Option<UserPassword> {
        self.password.take()
    }

    /// Hash a plain password in place and return the value to store.
    pub fn seal_password(&mut self) -> DomainResult<Password> {
        let password = self
            .password
            .clone()
            .ok_or_else(|| DomainError::validation("password is required"))?;

        let sealed = password.seal()?;
        self.password = Some(UserPassword::Hashed(sealed.clone()));
        Ok(sealed)
    }

    pub fn useremails(&self) -> &[Useremail] {
        &self.useremails
    }

    /// Mutable access to the addresses. The collection itself cannot grow
    /// through this, so ownership is preserved.
    pub fn useremails_mut(&mut self) -> &mut [Useremail] {
        &mut self.useremails
    }

    pub fn set_useremails(&mut self, useremails: Vec<Useremail>) {
        self.useremails = useremails;
        self.relink();
    }

    pub fn add_useremail(&mut self, useremail: &str) {
        let owner = self.reference();
        self.useremails.push(Useremail::with_user(owner, useremail));
    }

    pub fn roles(&self) -> &[UserRoles] {
        &self.roles
    }

    pub fn roles_mut(&mut self) -> &mut [UserRoles] {
        &mut self.roles
    }

    pub fn set_roles(&mut self, roles: Vec<UserRoles>) {
        self.roles = roles;
        self.relink();
    }

    pub fn add_role(&mut self, role: Role) {
        let owner = self.reference();
        self.roles.push(UserRoles::with_user(owner, role));
    }

    pub fn audit(&self) -> &Auditable {
        &self.audit
    }

    pub fn audit_mut(&mut self) -> &mut Auditable {
        &mut self.audit
    }

    /// Check that the user can be written: required fields present and
    /// every address syntactically valid.
    pub fn validate_for_persist(&self) -> DomainResult<()> {
        self.validate()?;
        if self.password.is_none() {
            return Err(DomainError::validation("password is required"));
        }
        Ok(())
    }

    fn relink(&mut self) {
        let owner = self.reference();
        for useremail in &mut self.useremails {
            useremail.set_user(owner);
        }
        for role in &mut self.roles {
            role.set_user(owner);
        }
    }
}

/// Inbound shape of a user document.
///
/// Every field is optional so the same shape serves creates and partial
/// updates. `password` is only ever read here.
#[derive(Deserialize)]
struct UserPayload {
    #[serde(default)]
    userid: i64,
    #[serde(default, deserialize_with = "deserialize_lowercase_opt")]
    username: Option<String>,
    #[serde(default)]
    password: Option<UserPassword>,
    #[serde(default, deserialize_with = "deserialize_lowercase_opt")]
    primaryemail: Option<String>,
    #[serde(default)]
    useremails: Vec<Useremail>,
    #[serde(default)]
    roles: Vec<UserRoles>,
}

impl From<UserPayload> for User {
    fn from(payload: UserPayload) -> Self {
        let mut user = User {
            userid: payload.userid,
            username: payload.username,
            password: payload.password,
            primaryemail: payload.primaryemail,
            useremails: payload.useremails,
            roles: payload.roles,
            audit: Auditable::default(),
        };
        user.relink();
        user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn contains_key(value: &Value, key: &str) -> bool {
        match value {
            Value::Object(map) => {
                map.contains_key(key) || map.values().any(|v| contains_key(v, key))
            }
            Value::Array(items) => items.iter().any(|v| contains_key(v, key)),
            _ => false,
        }
    }

    fn persisted_user() -> User {
        let mut admin = Role::new("admin");
        admin.set_roleid(1);

        let mut user = User::new(
            "Admin",
            "password",
            "Admin@LambdaSchool.local",
            vec![UserRoles::new(admin)],
        );
        user.add_useremail("admin@email.local");
        user.set_userid(4);
        user.useremails_mut()[0].set_useremailid(5);
        user
    }

    #[test]
    fn test_username_is_lowercased() {
        for input in ["Cinnamon", "BARNBARN", "puttat", "MissKitty42", "ÄdMiN", "ΣΊΣΥΦΟΣ", ""] {
            let mut user = User::default();
            user.set_username(input);
            assert_eq!(user.username(), Some(input.to_lowercase().as_str()));
        }
    }

    #[test]
    fn test_primaryemail_is_lowercased() {
        for input in ["Cinnamon@Lambdaschool.LOCAL", "a@b.c", "MIXED@case.Org", "ÄdMiN@Straße.DE"] {
            let mut user = User::default();
            user.set_primaryemail(input);
            assert_eq!(user.primaryemail(), Some(input.to_lowercase().as_str()));
        }
    }

    #[test]
    fn test_unset_fields_read_as_none() {
        let user = User::default();
        assert_eq!(user.username(), None);
        assert_eq!(user.primaryemail(), None);
        assert!(user.password().is_none());
        assert!(user.is_new());
    }

    #[test]
    fn test_constructor_links_roles_to_new_user() {
        let roles = vec![
            UserRoles::new(Role::with_id(1)),
            UserRoles::new(Role::with_id(2)),
            UserRoles::with_user(UserRef::new(99), Role::with_id(3)),
        ];

        let user = User::new("Barnbarn", "password", "barnbarn@lambdaschool.local", roles);

        assert_eq!(user.roles().len(), 3);
        for junction in user.roles() {
            assert!(junction.is_owned_by(&user.reference()));
        }
        assert_eq!(user.username(), Some("barnbarn"));
    }

    #[test]
    fn test_set_userid_relinks_children() {
        let mut user = User::new("puttat", "password", "puttat@school.lambda", vec![]);
        user.add_useremail("puttat@email.local");
        user.add_role(Role::with_id(2));

        user.set_userid(42);

        assert_eq!(user.useremails()[0].user(), Some(&UserRef::new(42)));
        assert_eq!(user.roles()[0].key(), Some((42, 2)));
    }

    #[test]
    fn test_serialization_never_contains_password() {
        let user = persisted_user();
        let value = serde_json::to_value(&user).unwrap();

        assert!(!contains_key(&value, "password"));
        assert_eq!(value["username"], "admin");
        assert_eq!(value["primaryemail"], "admin@lambdaschool.local");

        let round_tripped: User = serde_json::from_value(value).unwrap();
        let again = serde_json::to_value(&round_tripped).unwrap();
        assert!(!contains_key(&again, "password"));
    }

    #[test]
    fn test_children_serialize_without_back_reference() {
        let value = serde_json::to_value(persisted_user()).unwrap();

        assert_eq!(
            value,
            json!({
                "userid": 4,
                "username": "admin",
                "primaryemail": "admin@lambdaschool.local",
                "useremails": [
                    { "useremailid": 5, "useremail": "admin@email.local" }
                ],
                "roles": [
                    { "role": { "roleid": 1, "name": "ADMIN" } }
                ]
            })
        );
        assert!(!contains_key(&value["useremails"], "user"));
        assert!(!contains_key(&value["roles"], "user"));
    }

    #[test]
    fn test_deserialize_accepts_password_and_normalizes() {
        let user: User = serde_json::from_value(json!({
            "username": "MissKitty",
            "password": "password",
            "primaryemail": "MissKitty@School.Lambda",
            "useremails": [
                { "useremail": "Kitty@Mail.local", "user": { "userid": 77 } }
            ],
            "roles": [ { "role": { "roleid": 2 } } ]
        }))
        .unwrap();

        assert_eq!(user.username(), Some("misskitty"));
        assert_eq!(user.primaryemail(), Some("misskitty@school.lambda"));
        assert!(user.password().unwrap().matches("password"));
        assert_eq!(user.useremails()[0].useremail(), "kitty@mail.local");

        // back-references always point at the enclosing user
        assert!(user.useremails()[0].is_owned_by(&user.reference()));
        assert!(user.roles()[0].is_owned_by(&user.reference()));
    }

    #[test]
    fn test_partial_payload_leaves_fields_unset() {
        let user: User = serde_json::from_value(json!({ "primaryemail": null })).unwrap();
        assert_eq!(user.username(), None);
        assert_eq!(user.primaryemail(), None);
        assert!(user.password().is_none());
    }

    #[test]
    fn test_validate_for_persist() {
        let user = User::new("cinnamon", "password", "cinnamon@lambdaschool.local", vec![]);
        assert!(user.validate_for_persist().is_ok());

        let bad_email = User::new("cinnamon", "password", "not an email", vec![]);
        assert!(matches!(
            bad_email.validate_for_persist(),
            Err(DomainError::Validation(_))
        ));

        let mut bad_child = user.clone();
        bad_child.add_useremail("broken");
        assert!(bad_child.validate_for_persist().is_err());

        assert!(User::default().validate_for_persist().is_err());

        let mut no_password = User::default();
        no_password.set_username("cinnamon");
        no_password.set_primaryemail("cinnamon@lambdaschool.local");
        assert!(matches!(
            no_password.validate_for_persist(),
            Err(DomainError::Validation(msg)) if msg == "password is required"
        ));

        let short = User::new("shorty", "abc", "shorty@lambdaschool.local", vec![]);
        assert!(short.validate_for_persist().is_ok());
    }

    #[test]
    fn test_seal_password_replaces_plain_text() {
        let mut user = User::new("cinnamon", "password", "cinnamon@lambdaschool.local", vec![]);
        let sealed = user.seal_password().unwrap();

        assert!(sealed.verify("password"));
        assert!(matches!(user.password(), Some(UserPassword::Hashed(_))));

        // sealing twice keeps the same hash
        let again = user.seal_password().unwrap();
        assert_eq!(again, sealed);
    }

    #[test]
    fn test_debug_redacts_password() {
        let user = User::new("cinnamon", "s3cretpass", "cinnamon@lambdaschool.local", vec![]);
        assert!(!format!("{:?}", user).contains("s3cretpass"));
    }
}
