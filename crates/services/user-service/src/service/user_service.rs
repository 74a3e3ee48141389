//! User service - Handles user-related business logic.
//!
//! SOLID (SRP): Handles user use cases only. Persistence, including the
//! cascade to addresses and role junctions, is the repository's job.

use async_trait::async_trait;
use std::sync::Arc;

use common::{AppError, AppResult, OptionExt};
use domain::{User, UserPassword, UserRoles};

use crate::repository::{RoleRepository, UserRepository};

/// User service trait for dependency injection.
#[async_trait]
pub trait UserService: Send + Sync {
    /// List all users
    async fn find_all(&self) -> AppResult<Vec<User>>;

    /// Get user by ID
    async fn find_user_by_id(&self, id: i64) -> AppResult<User>;

    /// Get user by name
    async fn find_by_name(&self, name: &str) -> AppResult<User>;

    /// Find users whose name contains `fragment`
    async fn find_by_name_containing(&self, fragment: &str) -> AppResult<Vec<User>>;

    /// Create a user (`userid == 0`) or fully replace an existing one
    async fn save(&self, user: User) -> AppResult<User>;

    /// Apply only the fields set on `patch` to user `id`
    async fn update(&self, patch: User, id: i64) -> AppResult<User>;

    /// Delete user with its addresses and role junctions
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Delete every user
    async fn delete_all(&self) -> AppResult<()>;

    /// Detach a role from a user
    async fn remove_role(&self, userid: i64, roleid: i64) -> AppResult<()>;
}

/// Concrete implementation of UserService using repositories.
pub struct UserManager {
    users: Arc<dyn UserRepository>,
    roles: Arc<dyn RoleRepository>,
}

impl UserManager {
    /// Create new user service instance with repositories
    pub fn new(users: Arc<dyn UserRepository>, roles: Arc<dyn RoleRepository>) -> Self {
        Self { users, roles }
    }

    /// Fail with Conflict if `username` belongs to a user other than `owner`.
    async fn ensure_username_free(&self, username: &str, owner: i64) -> AppResult<()> {
        match self.users.find_by_username(username).await? {
            Some(existing) if existing.userid() != owner => Err(AppError::conflict("Username")),
            _ => Ok(()),
        }
    }

    /// Fail with Conflict if `primaryemail` belongs to a user other than `owner`.
    async fn ensure_primaryemail_free(&self, primaryemail: &str, owner: i64) -> AppResult<()> {
        match self.users.find_by_primaryemail(primaryemail).await? {
            Some(existing) if existing.userid() != owner => {
                Err(AppError::conflict("Primaryemail"))
            }
            _ => Ok(()),
        }
    }

    /// Replace each junction's role with the stored one.
    ///
    /// Clients usually send only `roleid`; a junction carrying just a name is
    /// looked up by name instead.
    async fn resolve_roles(&self, junctions: &[UserRoles]) -> AppResult<Vec<UserRoles>> {
        let mut resolved = Vec::with_capacity(junctions.len());

        for junction in junctions {
            let requested = junction.role();
            let role = if requested.roleid() != 0 {
                self.roles.find_by_id(requested.roleid()).await?
            } else if !requested.name().is_empty() {
                self.roles.find_by_name(requested.name()).await?
            } else {
                None
            };

            let role = role.ok_or_else(|| {
                tracing::warn!(
                    roleid = requested.roleid(),
                    name = requested.name(),
                    "Role not found"
                );
                AppError::NotFound
            })?;
            resolved.push(UserRoles::new(role));
        }

        Ok(resolved)
    }
}

#[async_trait]
impl UserService for UserManager {
    async fn find_all(&self) -> AppResult<Vec<User>> {
        self.users.list().await
    }

    async fn find_user_by_id(&self, id: i64) -> AppResult<User> {
        self.users.find_by_id(id).await?.ok_or_not_found()
    }

    async fn find_by_name(&self, name: &str) -> AppResult<User> {
        self.users.find_by_username(name).await?.ok_or_not_found()
    }

    async fn find_by_name_containing(&self, fragment: &str) -> AppResult<Vec<User>> {
        self.users.find_by_username_containing(fragment).await
    }

    async fn save(&self, mut user: User) -> AppResult<User> {
        user.validate_for_persist()?;

        let owner = user.userid();
        if !user.is_new() {
            self.users.find_by_id(owner).await?.ok_or_not_found()?;
        }

        if let Some(username) = user.username() {
            self.ensure_username_free(username, owner).await?;
        }
        if let Some(primaryemail) = user.primaryemail() {
            self.ensure_primaryemail_free(primaryemail, owner).await?;
        }

        let roles = self.resolve_roles(user.roles()).await?;
        user.set_roles(roles);

        if user.is_new() {
            self.users.insert(user).await
        } else {
            self.users.update(user).await
        }
    }

    async fn update(&self, mut patch: User, id: i64) -> AppResult<User> {
        let mut current = self.users.find_by_id(id).await?.ok_or_not_found()?;

        if let Some(username) = patch.username() {
            self.ensure_username_free(username, id).await?;
            current.set_username(username);
        }
        if let Some(primaryemail) = patch.primaryemail() {
            self.ensure_primaryemail_free(primaryemail, id).await?;
            current.set_primaryemail(primaryemail);
        }

        match patch.take_password() {
            Some(UserPassword::Plain(plain)) => current.set_password(plain),
            Some(UserPassword::Hashed(hash)) => current.set_password_hash(hash),
            None => {}
        }

        if !patch.useremails().is_empty() {
            current.set_useremails(patch.useremails().to_vec());
        }
        if !patch.roles().is_empty() {
            let roles = self.resolve_roles(patch.roles()).await?;
            current.set_roles(roles);
        }

        current.validate_for_persist()?;
        self.users.update(current).await
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        self.users.delete(id).await
    }

    async fn delete_all(&self) -> AppResult<()> {
        self.users.delete_all().await
    }

    async fn remove_role(&self, userid: i64, roleid: i64) -> AppResult<()> {
        self.users.find_by_id(userid).await?.ok_or_not_found()?;
        self.users.delete_user_role(userid, roleid).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::{Role, Useremail};
    use mockall::predicate::eq;
    use tokio_test::{assert_err, assert_ok};

    use crate::repository::{MockRoleRepository, MockUserRepository};

    fn stored_role(roleid: i64, name: &str) -> Role {
        let mut role = Role::new(name);
        role.set_roleid(roleid);
        role
    }

    fn stored_user(userid: i64, username: &str) -> User {
        let mut user = User::new(
            username,
            "password",
            &format!("{}@lambdaschool.local", username),
            vec![UserRoles::new(stored_role(2, "user"))],
        );
        user.set_userid(userid);
        user
    }

    fn manager(users: MockUserRepository, roles: MockRoleRepository) -> UserManager {
        UserManager::new(Arc::new(users), Arc::new(roles))
    }

    #[tokio::test]
    async fn test_find_user_by_id_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().with(eq(77)).returning(|_| Ok(None));

        let service = manager(users, MockRoleRepository::new());
        let result = service.find_user_by_id(77).await;

        assert!(matches!(assert_err!(result), AppError::NotFound));
    }

    #[tokio::test]
    async fn test_find_by_name_returns_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .withf(|name| name == "cinnamon")
            .returning(|_| Ok(Some(stored_user(4, "cinnamon"))));

        let service = manager(users, MockRoleRepository::new());
        let user = assert_ok!(service.find_by_name("cinnamon").await);

        assert_eq!(user.userid(), 4);
    }

    #[tokio::test]
    async fn test_save_new_user_resolves_roles_and_inserts() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users.expect_find_by_primaryemail().returning(|_| Ok(None));
        users
            .expect_insert()
            .withf(|user| user.roles().len() == 1 && user.roles()[0].role().name() == "ADMIN")
            .returning(|mut user| {
                user.set_userid(10);
                Ok(user)
            });

        let mut roles = MockRoleRepository::new();
        roles
            .expect_find_by_id()
            .with(eq(1))
            .returning(|id| Ok(Some(stored_role(id, "admin"))));

        let service = manager(users, roles);
        let user = User::new(
            "Tiger",
            "password",
            "tiger@school.lambda",
            vec![UserRoles::new(Role::with_id(1))],
        );
        let saved = assert_ok!(service.save(user).await);

        assert_eq!(saved.userid(), 10);
        assert_eq!(saved.username(), Some("tiger"));
        assert_eq!(saved.roles()[0].key(), Some((10, 1)));
    }

    #[tokio::test]
    async fn test_save_duplicate_username_conflict() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_user(3, "tiger"))));
        users.expect_insert().never();

        let service = manager(users, MockRoleRepository::new());
        let user = User::new("tiger", "password", "tiger@school.lambda", vec![]);
        let result = service.save(user).await;

        assert!(matches!(assert_err!(result), AppError::Conflict(entity) if entity == "Username"));
    }

    #[tokio::test]
    async fn test_save_duplicate_primaryemail_conflict() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users
            .expect_find_by_primaryemail()
            .returning(|_| Ok(Some(stored_user(3, "tiger"))));
        users.expect_insert().never();

        let service = manager(users, MockRoleRepository::new());
        let user = User::new("leopard", "password", "tiger@lambdaschool.local", vec![]);
        let result = service.save(user).await;

        assert!(
            matches!(assert_err!(result), AppError::Conflict(entity) if entity == "Primaryemail")
        );
    }

    #[tokio::test]
    async fn test_save_unknown_role_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_username().returning(|_| Ok(None));
        users.expect_find_by_primaryemail().returning(|_| Ok(None));
        users.expect_insert().never();

        let mut roles = MockRoleRepository::new();
        roles.expect_find_by_id().returning(|_| Ok(None));

        let service = manager(users, roles);
        let user = User::new(
            "tiger",
            "password",
            "tiger@school.lambda",
            vec![UserRoles::new(Role::with_id(99))],
        );
        let result = service.save(user).await;

        assert!(matches!(assert_err!(result), AppError::NotFound));
    }

    #[tokio::test]
    async fn test_save_invalid_email_rejected() {
        let mut users = MockUserRepository::new();
        users.expect_insert().never();

        let service = manager(users, MockRoleRepository::new());
        let user = User::new("tiger", "password", "not-an-address", vec![]);
        let result = service.save(user).await;

        assert!(matches!(assert_err!(result), AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_existing_missing_user_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().with(eq(42)).returning(|_| Ok(None));
        users.expect_update().never();

        let service = manager(users, MockRoleRepository::new());
        let mut user = User::new("tiger", "password", "tiger@school.lambda", vec![]);
        user.set_userid(42);
        let result = service.save(user).await;

        assert!(matches!(assert_err!(result), AppError::NotFound));
    }

    #[tokio::test]
    async fn test_update_applies_only_supplied_fields() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .with(eq(4))
            .returning(|id| Ok(Some(stored_user(id, "cinnamon"))));
        users.expect_find_by_primaryemail().returning(|_| Ok(None));
        users.expect_update().returning(Ok);

        let service = manager(users, MockRoleRepository::new());
        let mut patch = User::default();
        patch.set_primaryemail("CINNAMON@Home.Local");
        patch.set_useremails(vec![Useremail::new("cinnamon@mymail.local")]);

        let updated = assert_ok!(service.update(patch, 4).await);

        assert_eq!(updated.username(), Some("cinnamon"));
        assert_eq!(updated.primaryemail(), Some("cinnamon@home.local"));
        assert_eq!(updated.useremails().len(), 1);
        assert_eq!(updated.roles().len(), 1);
    }

    #[tokio::test]
    async fn test_update_username_taken_by_other_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_user(id, "cinnamon"))));
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_user(9, "barnbarn"))));
        users.expect_update().never();

        let service = manager(users, MockRoleRepository::new());
        let mut patch = User::default();
        patch.set_username("barnbarn");

        let result = service.update(patch, 4).await;

        assert!(matches!(assert_err!(result), AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_keeping_own_username_is_allowed() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored_user(id, "cinnamon"))));
        users
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_user(4, "cinnamon"))));
        users.expect_update().returning(Ok);

        let service = manager(users, MockRoleRepository::new());
        let mut patch = User::default();
        patch.set_username("Cinnamon");

        assert_ok!(service.update(patch, 4).await);
    }

    #[tokio::test]
    async fn test_remove_role_for_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        users.expect_delete_user_role().never();

        let service = manager(users, MockRoleRepository::new());
        let result = service.remove_role(5, 1).await;

        assert!(matches!(assert_err!(result), AppError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_delegates_to_repository() {
        let mut users = MockUserRepository::new();
        users.expect_delete().with(eq(4)).times(1).returning(|_| Ok(()));

        let service = manager(users, MockRoleRepository::new());

        assert_ok!(service.delete(4).await);
    }
}
