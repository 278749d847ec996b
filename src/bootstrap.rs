use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
	authz,
	credential::CredentialHasher,
	error::Result,
	model::{Permission, Role, User},
	store, Database,
};

/// Credentials for an account ensured at startup.
#[derive(Clone)]
pub struct Seed {
	pub username: String,
	pub email: String,
	pub password: String,
}

/// Idempotently creates the built-in permissions and roles, plus up to one
/// administrator and one standard account, all in one transaction.
///
/// Rows that already exist are left untouched, including the grants of an
/// existing role, so re-running at every startup is safe.
pub async fn run(
	db: &Database,
	hasher: &CredentialHasher,
	admin: Option<Seed>,
	user: Option<Seed>,
) -> Result<()> {
	let mut tx = db.begin().await?;

	let mut permissions = Vec::new();

	for name in [
		authz::permission::POST_CREATE,
		authz::permission::POST_READ,
		authz::permission::POST_UPDATE,
		authz::permission::POST_DELETE,
		authz::permission::COMMENT_CREATE,
		authz::permission::COMMENT_DELETE,
	] {
		permissions.push(ensure_permission(&mut tx, name).await?);
	}

	let standard: Vec<Permission> = permissions
		.iter()
		.filter(|permission| {
			matches!(
				permission.name.as_str(),
				authz::permission::POST_CREATE
					| authz::permission::POST_READ
					| authz::permission::COMMENT_CREATE
			)
		})
		.cloned()
		.collect();

	let admin_role = ensure_role(&mut tx, authz::role::ADMIN, &permissions).await?;
	let user_role = ensure_role(&mut tx, authz::role::USER, &standard).await?;

	if let Some(ref seed) = admin {
		if ensure_user(&mut tx, hasher, seed, &admin_role).await? {
			tracing::info!("admin account {} created", seed.username);
		}
	}

	if let Some(ref seed) = user {
		if ensure_user(&mut tx, hasher, seed, &user_role).await? {
			tracing::info!("standard account {} created", seed.username);
		}
	}

	tx.commit().await?;

	Ok(())
}

async fn ensure_permission(conn: &mut SqliteConnection, name: &str) -> Result<Permission> {
	if let Some(permission) = store::permission::find_by_name(&mut *conn, name).await? {
		return Ok(permission);
	}

	let permission = Permission {
		id: Uuid::new_v4(),
		name: name.to_string(),
	};

	store::permission::insert(&mut *conn, &permission).await?;

	Ok(permission)
}

/// An existing role keeps whatever grants it has; only a freshly created
/// one receives `permissions`.
async fn ensure_role(
	conn: &mut SqliteConnection,
	name: &str,
	permissions: &[Permission],
) -> Result<Role> {
	if let Some(role) = store::role::find_by_name(&mut *conn, name).await? {
		return Ok(role);
	}

	let role = Role {
		id: Uuid::new_v4(),
		name: name.to_string(),
	};

	store::role::insert(&mut *conn, &role).await?;

	for permission in permissions {
		store::role::grant_permission(&mut *conn, role.id, permission.id).await?;
	}

	Ok(role)
}

async fn ensure_user(
	conn: &mut SqliteConnection,
	hasher: &CredentialHasher,
	seed: &Seed,
	role: &Role,
) -> Result<bool> {
	if store::user::find_by_username(&mut *conn, &seed.username)
		.await?
		.is_some()
	{
		return Ok(false);
	}

	let id = Uuid::new_v4();
	let password = hasher.hash(&seed.password, &id)?;

	let user = User {
		id,
		username: seed.username.clone(),
		email: seed.email.clone(),
		password: password.to_vec(),
		avatar: None,
		created_at: Utc::now(),
	};

	store::user::insert(&mut *conn, &user).await?;
	store::user::assign_role(&mut *conn, user.id, role.id).await?;

	Ok(true)
}
