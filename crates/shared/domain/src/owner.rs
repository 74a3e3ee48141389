//! Back-references from child rows to their owning user.
//!
//! A `User` owns its children by value. Children only remember the owner's
//! id, which is what ends up in their foreign key column.

use serde::{Deserialize, Serialize, Serializer};

/// Non-owning reference to a user row.
///
/// Deserializes from any object with a `userid` field, so a client may send a
/// full user document here; everything but the id is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub userid: i64,
}

impl UserRef {
    pub fn new(userid: i64) -> Self {
        Self { userid }
    }
}

/// A child row whose lifecycle is tied to a user.
pub trait OwnedByUser {
    /// Serialized form of the child without its back-reference.
    type Detached<'a>: Serialize
    where
        Self: 'a;

    fn user(&self) -> Option<&UserRef>;

    fn set_user(&mut self, user: UserRef);

    fn detached(&self) -> Self::Detached<'_>;

    /// Whether this child points back at `owner`.
    fn is_owned_by(&self, owner: &UserRef) -> bool {
        self.user() == Some(owner)
    }
}

/// Serialize a child collection as part of its owner, dropping each
/// element's `user` field to keep the document acyclic.
pub(crate) fn serialize_detached<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: OwnedByUser,
{
    serializer.collect_seq(items.iter().map(OwnedByUser::detached))
}
