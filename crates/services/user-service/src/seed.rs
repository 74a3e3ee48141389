//! Sample data for development databases.
//!
//! Seeding is a reset: every user and role is removed first, so running it
//! twice leaves the same rows behind.

use common::AppResult;
use domain::{Role, User, UserRoles, ROLE_ADMIN, ROLE_DATA, ROLE_USER, SEED_ROLES};

use crate::service::{RoleService, UserService};

const SEED_PASSWORD: &str = "password";

/// Wipe users and roles, then recreate the sample set.
pub async fn seed(users: &dyn UserService, roles: &dyn RoleService) -> AppResult<Vec<User>> {
    users.delete_all().await?;
    roles.delete_all().await?;

    for name in SEED_ROLES {
        roles.save(Role::new(name)).await?;
    }
    let admin = roles.find_by_name(ROLE_ADMIN).await?;
    let user = roles.find_by_name(ROLE_USER).await?;
    let data = roles.find_by_name(ROLE_DATA).await?;

    let mut seeded = Vec::new();

    let mut u1 = User::new(
        "admin",
        SEED_PASSWORD,
        "admin@lambdaschool.local",
        grants(&[&admin, &user, &data]),
    );
    u1.add_useremail("admin@email.local");
    u1.add_useremail("admin@mymail.local");
    seeded.push(users.save(u1).await?);

    let mut u2 = User::new(
        "cinnamon",
        SEED_PASSWORD,
        "cinnamon@lambdaschool.local",
        grants(&[&user, &data]),
    );
    u2.add_useremail("cinnamon@mymail.local");
    u2.add_useremail("hops@mymail.local");
    u2.add_useremail("bunny@email.local");
    seeded.push(users.save(u2).await?);

    let mut u3 = User::new(
        "barnbarn",
        SEED_PASSWORD,
        "barnbarn@lambdaschool.local",
        grants(&[&user]),
    );
    u3.add_useremail("barnbarn@email.local");
    seeded.push(users.save(u3).await?);

    for name in ["puttat", "misskitty"] {
        let plain = User::new(
            name,
            SEED_PASSWORD,
            &format!("{}@school.lambda", name),
            grants(&[&user]),
        );
        seeded.push(users.save(plain).await?);
    }

    tracing::info!(users = seeded.len(), roles = SEED_ROLES.len(), "Seed data loaded");
    Ok(seeded)
}

fn grants(roles: &[&Role]) -> Vec<UserRoles> {
    roles.iter().map(|role| UserRoles::new((*role).clone())).collect()
}
