use crate::error::{Error, Result};

/// Role names provisioned at bootstrap.
pub mod role {
	pub const ADMIN: &str = "ROLE_ADMIN";
	pub const USER: &str = "ROLE_USER";
}

/// Permission names provisioned at bootstrap.
pub mod permission {
	pub const POST_CREATE: &str = "POST_CREATE";
	pub const POST_READ: &str = "POST_READ";
	pub const POST_UPDATE: &str = "POST_UPDATE";
	pub const POST_DELETE: &str = "POST_DELETE";
	pub const COMMENT_CREATE: &str = "COMMENT_CREATE";
	pub const COMMENT_DELETE: &str = "COMMENT_DELETE";
}

/// Whether any role assigned to `username` carries `permission`.
///
/// A single EXISTS query over the role and permission joins, so the answer
/// cannot depend on the order roles are stored or iterated in. Unknown
/// subjects simply hold nothing.
pub async fn has_permission(
	db: impl sqlx::SqliteExecutor<'_>,
	username: &str,
	permission: &str,
) -> Result<bool> {
	let held = sqlx::query_scalar(
		r#"
			SELECT EXISTS (
				SELECT 1 FROM user_role
				JOIN role_permission ON role_permission.role_id = user_role.role_id
				JOIN permission ON permission.id = role_permission.permission_id
				WHERE user_role.user_id = (SELECT id FROM "user" WHERE username = ?)
					AND permission.name = ?
			)
		"#,
	)
	.bind(username)
	.bind(permission)
	.fetch_one(db)
	.await?;

	Ok(held)
}

/// The coarse, resource-independent permission gate.
///
/// Callers invoke this before a mutating operation, ahead of loading any
/// resource; the per-resource ownership gates live in the operations
/// themselves.
pub async fn require_permission(
	db: impl sqlx::SqliteExecutor<'_>,
	username: &str,
	permission: &'static str,
) -> Result<()> {
	if has_permission(db, username, permission).await? {
		Ok(())
	} else {
		Err(Error::MissingPermission(permission))
	}
}

/// Whether `username` holds the administrator role.
pub async fn is_administrator(db: impl sqlx::SqliteExecutor<'_>, username: &str) -> Result<bool> {
	let held = sqlx::query_scalar(
		r#"
			SELECT EXISTS (
				SELECT 1 FROM user_role
				JOIN role ON role.id = user_role.role_id
				WHERE user_role.user_id = (SELECT id FROM "user" WHERE username = ?)
					AND role.name = ?
			)
		"#,
	)
	.bind(username)
	.bind(role::ADMIN)
	.fetch_one(db)
	.await?;

	Ok(held)
}

/// Whether `subject` is the author a resource names as its owner.
#[must_use]
pub fn is_owner(subject: &str, author: &str) -> bool {
	subject == author
}
