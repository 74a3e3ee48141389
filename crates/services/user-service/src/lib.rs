//! User Service Library
//!
//! This crate persists users together with their e-mail addresses and role
//! grants. It can be driven from the `user-service` CLI or embedded as a
//! library through the service traits.

pub mod config;
pub mod infra;
pub mod repository;
pub mod seed;
pub mod service;

use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use common::{AppError, AppResult};

use crate::config::UserServiceConfig;
use crate::infra::Database;
use crate::repository::{Auditor, RoleStore, SystemAuditor, UserStore};
use crate::service::{RoleManager, RoleService, UserManager, UserService};

/// Services wired to one database connection.
pub struct Services {
    pub users: Arc<dyn UserService>,
    pub roles: Arc<dyn RoleService>,
}

impl Services {
    /// Build repositories and services over `db`, auditing as `auditor`.
    pub fn new(db: DatabaseConnection, auditor: Arc<dyn Auditor>) -> Self {
        let user_repo = Arc::new(UserStore::with_auditor(db.clone(), auditor.clone()));
        let role_repo = Arc::new(RoleStore::with_auditor(db, auditor));

        Self {
            users: Arc::new(UserManager::new(user_repo, role_repo.clone())),
            roles: Arc::new(RoleManager::new(role_repo)),
        }
    }
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// User query type.
#[derive(Debug, Clone)]
pub enum UsersAction {
    List,
    Show(i64),
    Find(String),
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> AppResult<()> {
    let config = UserServiceConfig::from_env();
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Reset users and roles to the sample data set.
pub async fn run_seed() -> AppResult<()> {
    let services = connect_services(&UserServiceConfig::from_env()).await?;
    let users = seed::seed(services.users.as_ref(), services.roles.as_ref()).await?;

    println!("Seeded {} users", users.len());
    Ok(())
}

/// Print users as JSON.
pub async fn run_users(action: UsersAction) -> AppResult<()> {
    let services = connect_services(&UserServiceConfig::from_env()).await?;

    let json = match action {
        UsersAction::List => serde_json::to_string_pretty(&services.users.find_all().await?),
        UsersAction::Show(id) => {
            serde_json::to_string_pretty(&services.users.find_user_by_id(id).await?)
        }
        UsersAction::Find(fragment) => serde_json::to_string_pretty(
            &services.users.find_by_name_containing(&fragment).await?,
        ),
    }
    .map_err(|e| AppError::internal(format!("JSON encoding failed: {}", e)))?;

    println!("{}", json);
    Ok(())
}

async fn connect_services(config: &UserServiceConfig) -> AppResult<Services> {
    let db = Database::connect(&config.database).await?;
    let auditor: Arc<dyn Auditor> = Arc::new(SystemAuditor::new(config.auditor.clone()));

    info!(service = %config.service.service_name, "Services ready");
    Ok(Services::new(db.get_connection(), auditor))
}
