//! User repository implementation with cascading writes.
//!
//! A user is written together with the rows it reaches:
//! - `useremails` are fully owned. Inserts, updates and deletes follow the
//!   parent, and an address missing from the collection on update is deleted.
//! - `userroles` junctions follow the parent on insert and update only. A
//!   junction missing from the collection is left in place; use
//!   `delete_user_role` to remove one.
//!
//! Every cascading write runs in a single transaction.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, NotSet, QueryFilter, QueryOrder, Set, TransactionTrait,
};

use super::auditor::{AuditStamp, Auditor, SystemAuditor};
use super::entities::{role, user, useremail, userroles};
use common::{AppError, AppResult};
use domain::normalize::lowercase;
use domain::{Role, User, UserRoles, Useremail};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// User repository trait for dependency injection.
///
/// Lookups return the full aggregate: the user row with its addresses and
/// role junctions.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by primary key
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Find user by name (compared lower case)
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;

    /// Find user by primary e-mail (compared lower case)
    async fn find_by_primaryemail(&self, primaryemail: &str) -> AppResult<Option<User>>;

    /// Find users whose name contains the fragment, ignoring case
    async fn find_by_username_containing(&self, fragment: &str) -> AppResult<Vec<User>>;

    /// List all users ordered by id
    async fn list(&self) -> AppResult<Vec<User>>;

    /// Persist a new user with its addresses and role junctions
    async fn insert(&self, user: User) -> AppResult<User>;

    /// Merge an existing user with its addresses and role junctions
    async fn update(&self, user: User) -> AppResult<User>;

    /// Delete a user with its addresses and role junctions
    async fn delete(&self, id: i64) -> AppResult<()>;

    /// Delete every user with their addresses and role junctions
    async fn delete_all(&self) -> AppResult<()>;

    /// Remove a single user/role junction
    async fn delete_user_role(&self, userid: i64, roleid: i64) -> AppResult<()>;
}

/// Concrete implementation of UserRepository
pub struct UserStore {
    db: DatabaseConnection,
    auditor: Arc<dyn Auditor>,
}

impl UserStore {
    /// Create new repository instance auditing as `SYSTEM`
    pub fn new(db: DatabaseConnection) -> Self {
        Self::with_auditor(db, Arc::new(SystemAuditor::default()))
    }

    /// Create new repository instance with a custom auditor
    pub fn with_auditor(db: DatabaseConnection, auditor: Arc<dyn Auditor>) -> Self {
        Self { db, auditor }
    }

    fn stamp(&self) -> AuditStamp {
        AuditStamp::now(self.auditor.as_ref())
    }
}

#[async_trait]
impl UserRepository for UserStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let model = user::Entity::find_by_id(id).one(&self.db).await?;
        load_optional(&self.db, model).await
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Username.eq(lowercase(username)))
            .one(&self.db)
            .await?;

        load_optional(&self.db, model).await
    }

    async fn find_by_primaryemail(&self, primaryemail: &str) -> AppResult<Option<User>> {
        let model = user::Entity::find()
            .filter(user::Column::Primaryemail.eq(lowercase(primaryemail)))
            .one(&self.db)
            .await?;

        load_optional(&self.db, model).await
    }

    async fn find_by_username_containing(&self, fragment: &str) -> AppResult<Vec<User>> {
        let models = user::Entity::find()
            .filter(user::Column::Username.contains(lowercase(fragment)))
            .order_by_asc(user::Column::Userid)
            .all(&self.db)
            .await?;

        load_all(&self.db, models).await
    }

    async fn list(&self) -> AppResult<Vec<User>> {
        let models = user::Entity::find()
            .order_by_asc(user::Column::Userid)
            .all(&self.db)
            .await?;

        load_all(&self.db, models).await
    }

    async fn insert(&self, user: User) -> AppResult<User> {
        let stamp = self.stamp();
        let txn = self.db.begin().await?;
        let result = insert_aggregate(&txn, user, &stamp).await;
        let saved = finish(txn, result).await?;

        tracing::info!(
            userid = saved.userid(),
            useremails = saved.useremails().len(),
            roles = saved.roles().len(),
            "User created"
        );
        Ok(saved)
    }

    async fn update(&self, user: User) -> AppResult<User> {
        let stamp = self.stamp();
        let txn = self.db.begin().await?;
        let result = update_aggregate(&txn, user, &stamp).await;
        let saved = finish(txn, result).await?;

        tracing::info!(userid = saved.userid(), "User updated");
        Ok(saved)
    }

    async fn delete(&self, id: i64) -> AppResult<()> {
        let txn = self.db.begin().await?;
        let result = delete_aggregate(&txn, id).await;
        finish(txn, result).await?;

        tracing::info!(userid = id, "User deleted");
        Ok(())
    }

    async fn delete_all(&self) -> AppResult<()> {
        let txn = self.db.begin().await?;
        let result = delete_every_aggregate(&txn).await;
        let removed = finish(txn, result).await?;

        tracing::info!(removed, "All users deleted");
        Ok(())
    }

    async fn delete_user_role(&self, userid: i64, roleid: i64) -> AppResult<()> {
        let result = userroles::Entity::delete_by_id((userid, roleid))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        tracing::debug!(userid, roleid, "User role removed");
        Ok(())
    }
}

// =============================================================================
// Transaction handling
// =============================================================================

/// Commit on success, roll back on error.
async fn finish<T>(txn: DatabaseTransaction, result: AppResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            txn.commit().await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Transaction rollback failed: {}", rollback_err);
            }
            Err(e)
        }
    }
}

// =============================================================================
// Loading
// =============================================================================

/// Attach addresses and role junctions to a user row.
async fn load_aggregate<C: ConnectionTrait>(conn: &C, model: user::Model) -> AppResult<User> {
    let userid = model.userid;

    let useremails = useremail::Entity::find()
        .filter(useremail::Column::Userid.eq(userid))
        .order_by_asc(useremail::Column::Useremailid)
        .all(conn)
        .await?;

    let junctions = userroles::Entity::find()
        .filter(userroles::Column::Userid.eq(userid))
        .order_by_asc(userroles::Column::Roleid)
        .find_also_related(role::Entity)
        .all(conn)
        .await?;

    let roles = junctions
        .into_iter()
        .map(|(junction, role)| {
            let role = role.map(Role::from).ok_or_else(|| {
                AppError::internal(format!(
                    "Role {} referenced by user {} is missing",
                    junction.roleid, userid
                ))
            })?;
            Ok(junction.into_domain(role))
        })
        .collect::<AppResult<Vec<UserRoles>>>()?;

    let mut user = User::from(model);
    user.set_useremails(useremails.into_iter().map(Useremail::from).collect());
    user.set_roles(roles);
    Ok(user)
}

async fn load_optional<C: ConnectionTrait>(
    conn: &C,
    model: Option<user::Model>,
) -> AppResult<Option<User>> {
    match model {
        Some(model) => Ok(Some(load_aggregate(conn, model).await?)),
        None => Ok(None),
    }
}

async fn load_all<C: ConnectionTrait>(conn: &C, models: Vec<user::Model>) -> AppResult<Vec<User>> {
    let mut users = Vec::with_capacity(models.len());
    for model in models {
        users.push(load_aggregate(conn, model).await?);
    }
    Ok(users)
}

// =============================================================================
// Cascading writes
// =============================================================================

fn required(value: Option<&str>, field: &str) -> AppResult<String> {
    value
        .map(str::to_string)
        .ok_or_else(|| AppError::validation(format!("{} is required", field)))
}

async fn insert_aggregate<C: ConnectionTrait>(
    conn: &C,
    mut user: User,
    stamp: &AuditStamp,
) -> AppResult<User> {
    let username = required(user.username(), "username")?;
    let primaryemail = required(user.primaryemail(), "primaryemail")?;
    let password = user.seal_password()?;
    let audit = stamp.created();

    let model = user::ActiveModel {
        userid: NotSet,
        username: Set(username),
        password: Set(password.into()),
        primaryemail: Set(primaryemail),
        created_by: Set(audit.created_by),
        created_date: Set(audit.created_date),
        last_modified_by: Set(audit.last_modified_by),
        last_modified_date: Set(audit.last_modified_date),
    }
    .insert(conn)
    .await?;

    // Children take the generated key before they are written
    user.set_userid(model.userid);

    for address in user.useremails() {
        insert_useremail(conn, model.userid, address, stamp).await?;
    }
    upsert_user_roles(conn, model.userid, user.roles(), stamp).await?;

    load_aggregate(conn, model).await
}

async fn update_aggregate<C: ConnectionTrait>(
    conn: &C,
    mut user: User,
    stamp: &AuditStamp,
) -> AppResult<User> {
    let existing = user::Entity::find_by_id(user.userid())
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: user::ActiveModel = existing.into();

    if let Some(username) = user.username() {
        active.username = Set(username.to_string());
    }
    if let Some(primaryemail) = user.primaryemail() {
        active.primaryemail = Set(primaryemail.to_string());
    }
    if user.password().is_some() {
        active.password = Set(user.seal_password()?.into());
    }
    active.last_modified_by = Set(Some(stamp.by.clone()));
    active.last_modified_date = Set(Some(stamp.at));

    let model = active.update(conn).await?;
    user.set_userid(model.userid);

    merge_useremails(conn, model.userid, user.useremails(), stamp).await?;
    upsert_user_roles(conn, model.userid, user.roles(), stamp).await?;

    load_aggregate(conn, model).await
}

async fn delete_aggregate<C: ConnectionTrait>(conn: &C, id: i64) -> AppResult<()> {
    user::Entity::find_by_id(id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;

    useremail::Entity::delete_many()
        .filter(useremail::Column::Userid.eq(id))
        .exec(conn)
        .await?;
    userroles::Entity::delete_many()
        .filter(userroles::Column::Userid.eq(id))
        .exec(conn)
        .await?;
    user::Entity::delete_by_id(id).exec(conn).await?;

    Ok(())
}

async fn delete_every_aggregate<C: ConnectionTrait>(conn: &C) -> AppResult<u64> {
    useremail::Entity::delete_many().exec(conn).await?;
    userroles::Entity::delete_many().exec(conn).await?;
    let result = user::Entity::delete_many().exec(conn).await?;
    Ok(result.rows_affected)
}

async fn insert_useremail<C: ConnectionTrait>(
    conn: &C,
    userid: i64,
    address: &Useremail,
    stamp: &AuditStamp,
) -> AppResult<useremail::Model> {
    let audit = stamp.created();
    let model = useremail::ActiveModel {
        useremailid: NotSet,
        useremail: Set(address.useremail().to_string()),
        userid: Set(userid),
        created_by: Set(audit.created_by),
        created_date: Set(audit.created_date),
        last_modified_by: Set(audit.last_modified_by),
        last_modified_date: Set(audit.last_modified_date),
    }
    .insert(conn)
    .await?;

    Ok(model)
}

/// Bring the user's address rows in line with `addresses`.
///
/// Known ids are updated, unknown ones inserted, and rows no longer listed
/// are deleted.
async fn merge_useremails<C: ConnectionTrait>(
    conn: &C,
    userid: i64,
    addresses: &[Useremail],
    stamp: &AuditStamp,
) -> AppResult<()> {
    let mut existing: HashMap<i64, useremail::Model> = useremail::Entity::find()
        .filter(useremail::Column::Userid.eq(userid))
        .all(conn)
        .await?
        .into_iter()
        .map(|model| (model.useremailid, model))
        .collect();

    let mut kept = HashSet::new();
    for address in addresses {
        match existing.remove(&address.useremailid()) {
            Some(model) => {
                let mut active: useremail::ActiveModel = model.into();
                active.useremail = Set(address.useremail().to_string());
                active.last_modified_by = Set(Some(stamp.by.clone()));
                active.last_modified_date = Set(Some(stamp.at));
                active.update(conn).await?;
                kept.insert(address.useremailid());
            }
            None if kept.contains(&address.useremailid()) => {
                tracing::debug!(
                    useremailid = address.useremailid(),
                    "Duplicate address id in collection, skipped"
                );
            }
            None => {
                insert_useremail(conn, userid, address, stamp).await?;
            }
        }
    }

    let orphans: Vec<i64> = existing.into_keys().collect();
    if !orphans.is_empty() {
        tracing::debug!(userid, count = orphans.len(), "Removing orphaned addresses");
        useremail::Entity::delete_many()
            .filter(useremail::Column::Useremailid.is_in(orphans))
            .exec(conn)
            .await?;
    }

    Ok(())
}

/// Insert missing junctions and touch existing ones. Never deletes.
async fn upsert_user_roles<C: ConnectionTrait>(
    conn: &C,
    userid: i64,
    roles: &[UserRoles],
    stamp: &AuditStamp,
) -> AppResult<()> {
    for junction in roles {
        let roleid = junction.role().roleid();

        match userroles::Entity::find_by_id((userid, roleid)).one(conn).await? {
            Some(model) => {
                let mut active: userroles::ActiveModel = model.into();
                active.last_modified_by = Set(Some(stamp.by.clone()));
                active.last_modified_date = Set(Some(stamp.at));
                active.update(conn).await?;
            }
            None => {
                let audit = stamp.created();
                userroles::ActiveModel {
                    userid: Set(userid),
                    roleid: Set(roleid),
                    created_by: Set(audit.created_by),
                    created_date: Set(audit.created_date),
                    last_modified_by: Set(audit.last_modified_by),
                    last_modified_date: Set(audit.last_modified_date),
                }
                .insert(conn)
                .await?;
            }
        }
    }

    Ok(())
}
