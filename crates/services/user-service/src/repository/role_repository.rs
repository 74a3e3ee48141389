//! Role repository implementation.

use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, NotSet, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};

use super::auditor::{AuditStamp, Auditor, SystemAuditor};
use super::entities::{role, userroles};
use common::{AppError, AppResult};
use domain::normalize::uppercase;
use domain::Role;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Role repository trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Find role by primary key
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Role>>;

    /// Find role by name (compared upper case)
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// List all roles ordered by id
    async fn list(&self) -> AppResult<Vec<Role>>;

    /// Persist a new role
    async fn insert(&self, role: Role) -> AppResult<Role>;

    /// Delete every role together with the junctions that reference it
    async fn delete_all(&self) -> AppResult<()>;
}

/// Concrete implementation of RoleRepository
pub struct RoleStore {
    db: DatabaseConnection,
    auditor: Arc<dyn Auditor>,
}

impl RoleStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_auditor(db, Arc::new(SystemAuditor::default()))
    }

    pub fn with_auditor(db: DatabaseConnection, auditor: Arc<dyn Auditor>) -> Self {
        Self { db, auditor }
    }
}

#[async_trait]
impl RoleRepository for RoleStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Role>> {
        let model = role::Entity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Role::from))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let model = role::Entity::find()
            .filter(role::Column::Name.eq(uppercase(name)))
            .one(&self.db)
            .await?;

        Ok(model.map(Role::from))
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let models = role::Entity::find()
            .order_by_asc(role::Column::Roleid)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Role::from).collect())
    }

    async fn insert(&self, role: Role) -> AppResult<Role> {
        if role.name().is_empty() {
            return Err(AppError::validation("role name is required"));
        }

        let audit = AuditStamp::now(self.auditor.as_ref()).created();
        let model = role::ActiveModel {
            roleid: NotSet,
            name: Set(role.name().to_string()),
            created_by: Set(audit.created_by),
            created_date: Set(audit.created_date),
            last_modified_by: Set(audit.last_modified_by),
            last_modified_date: Set(audit.last_modified_date),
        }
        .insert(&self.db)
        .await?;

        tracing::info!(roleid = model.roleid, name = %model.name, "Role created");
        Ok(Role::from(model))
    }

    async fn delete_all(&self) -> AppResult<()> {
        let txn = self.db.begin().await?;

        let result = async {
            userroles::Entity::delete_many().exec(&txn).await?;
            role::Entity::delete_many().exec(&txn).await
        }
        .await;

        match result {
            Ok(deleted) => {
                txn.commit().await?;
                tracing::info!(removed = deleted.rows_affected, "All roles deleted");
                Ok(())
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::error!("Transaction rollback failed: {}", rollback_err);
                }
                Err(e.into())
            }
        }
    }
}
