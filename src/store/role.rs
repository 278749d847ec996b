use uuid::Uuid;

use crate::{error::Result, model::Role};

pub async fn find_by_name(db: impl sqlx::SqliteExecutor<'_>, name: &str) -> Result<Option<Role>> {
	let role = sqlx::query_as("SELECT * FROM role WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await?;

	Ok(role)
}

pub async fn insert(db: impl sqlx::SqliteExecutor<'_>, role: &Role) -> Result<()> {
	sqlx::query("INSERT INTO role (id, name) VALUES (?, ?)")
		.bind(role.id)
		.bind(&role.name)
		.execute(db)
		.await?;

	Ok(())
}

pub async fn grant_permission(
	db: impl sqlx::SqliteExecutor<'_>,
	role_id: Uuid,
	permission_id: Uuid,
) -> Result<()> {
	sqlx::query("INSERT INTO role_permission (role_id, permission_id) VALUES (?, ?)")
		.bind(role_id)
		.bind(permission_id)
		.execute(db)
		.await?;

	Ok(())
}
