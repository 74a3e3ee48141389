//! Role service - Handles role lookups and creation.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::Role;

use crate::repository::RoleRepository;

#[async_trait]
pub trait RoleService: Send + Sync {
    async fn find_all(&self) -> AppResult<Vec<Role>>;

    async fn find_role_by_id(&self, id: i64) -> AppResult<Role>;

    async fn find_by_name(&self, name: &str) -> AppResult<Role>;

    /// Create a role; names are unique once upper-cased
    async fn save(&self, role: Role) -> AppResult<Role>;

    async fn delete_all(&self) -> AppResult<()>;
}

pub struct RoleManager {
    roles: Arc<dyn RoleRepository>,
}

impl RoleManager {
    pub fn new(roles: Arc<dyn RoleRepository>) -> Self {
        Self { roles }
    }
}

#[async_trait]
impl RoleService for RoleManager {
    async fn find_all(&self) -> AppResult<Vec<Role>> {
        self.roles.list().await
    }

    async fn find_role_by_id(&self, id: i64) -> AppResult<Role> {
        self.roles.find_by_id(id).await?.ok_or_not_found()
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Role> {
        self.roles.find_by_name(name).await?.ok_or_not_found()
    }

    async fn save(&self, role: Role) -> AppResult<Role> {
        if self.roles.find_by_name(role.name()).await?.is_some() {
            return Err(AppError::conflict("Role"));
        }

        self.roles.insert(role).await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.roles.delete_all().await
    }
}
