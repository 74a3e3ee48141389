//! Role database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::Role;

use super::auditable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "roles")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub roleid: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub created_by: Option<String>,
    pub created_date: Option<DateTimeUtc>,
    pub last_modified_by: Option<String>,
    pub last_modified_date: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::userroles::Entity")]
    Userroles,
}

impl Related<super::userroles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Userroles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Role {
    fn from(model: Model) -> Self {
        let mut role = Role::new(&model.name);
        role.set_roleid(model.roleid);
        *role.audit_mut() = auditable(
            model.created_by,
            model.created_date,
            model.last_modified_by,
            model.last_modified_date,
        );
        role
    }
}
