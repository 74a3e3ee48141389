//! User database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{Password, User};

use super::auditable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub userid: i64,
    #[sea_orm(unique)]
    pub username: String,
    pub password: String,
    #[sea_orm(unique)]
    pub primaryemail: String,
    pub created_by: Option<String>,
    pub created_date: Option<DateTimeUtc>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::useremail::Entity")]
    Useremails,
    #[sea_orm(has_many = "super::userroles::Entity")]
    Userroles,
}

impl Related<super::useremail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Useremails.def()
    }
}

impl Related<super::userroles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Userroles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Convert database row to a user without its child collections
impl From<Model> for User {
    fn from(model: Model) -> Self {
        let mut user = User::default();
        user.set_userid(model.userid);
        user.set_username(&model.username);
        user.set_primaryemail(&model.primaryemail);
        user.set_password_hash(Password::from_hash(model.password));
        *user.audit_mut() = auditable(
            model.created_by,
            model.created_date,
            model.last_modified_by,
            model.last_modified_date,
        );
        user
    }
}
