use crate::{error::Result, model::Permission};

pub async fn find_by_name(
	db: impl sqlx::SqliteExecutor<'_>,
	name: &str,
) -> Result<Option<Permission>> {
	let permission = sqlx::query_as("SELECT * FROM permission WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await?;

	Ok(permission)
}

pub async fn insert(db: impl sqlx::SqliteExecutor<'_>, permission: &Permission) -> Result<()> {
	sqlx::query("INSERT INTO permission (id, name) VALUES (?, ?)")
		.bind(permission.id)
		.bind(&permission.name)
		.execute(db)
		.await?;

	Ok(())
}
