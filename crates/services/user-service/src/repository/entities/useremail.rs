//! Useremail database entity for SeaORM.

use sea_orm::entity::prelude::*;

use domain::{UserRef, Useremail};

use super::auditable;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "useremails")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub useremailid: i64,
    pub useremail: String,
    pub userid: i64,
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
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Useremail {
    fn from(model: Model) -> Self {
        let mut useremail = Useremail::with_user(UserRef::new(model.userid), &model.useremail);
        useremail.set_useremailid(model.useremailid);
        *useremail.audit_mut() = auditable(
            model.created_by,
            model.created_date,
            model.last_modified_by,
            model.last_modified_date,
        );
        useremail
    }
}
