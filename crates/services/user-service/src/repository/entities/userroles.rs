//! User/role junction entity for SeaORM.
//!
//! Composite primary key (`userid`, `roleid`).

use sea_orm::entity::prelude::*;

use domain::{Role, UserRef, UserRoles};

use super::auditable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "userroles")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub userid: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub roleid: i64,
    pub created_by: Option<String>,
    pub created_date: Option<DateTimeUtc>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::Userid",
        to = "super::user::Column::Userid"
    )]
    User,
    #[sea_orm(
        belongs_to = "super::role::Entity",
        from = "Column::Roleid",
        to = "super::role::Column::Roleid"
    )]
    Role,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::role::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Role.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Rebuild the junction once its role row has been loaded.
    pub fn into_domain(self, role: Role) -> UserRoles {
        let mut junction = UserRoles::with_user(UserRef::new(self.userid), role);
        *junction.audit_mut() = auditable(
            self.created_by,
            self.created_date,
            self.last_modified_by,
            self.last_modified_date,
        );
        junction
    }
}
