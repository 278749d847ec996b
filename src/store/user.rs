use uuid::Uuid;

use crate::{error::Result, model::User};

pub async fn find_by_username(
	db: impl sqlx::SqliteExecutor<'_>,
	username: &str,
) -> Result<Option<User>> {
	let user = sqlx::query_as(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(username)
		.fetch_optional(db)
		.await?;

	Ok(user)
}

pub async fn find_by_email(
	db: impl sqlx::SqliteExecutor<'_>,
	email: &str,
) -> Result<Option<User>> {
	let user = sqlx::query_as(r#"SELECT * FROM "user" WHERE email = ?"#)
		.bind(email)
		.fetch_optional(db)
		.await?;

	Ok(user)
}

pub async fn insert(db: impl sqlx::SqliteExecutor<'_>, user: &User) -> Result<()> {
	sqlx::query(
		r#"
			INSERT INTO "user" (id, username, email, password, avatar, created_at)
			VALUES (?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(user.id)
	.bind(&user.username)
	.bind(&user.email)
	.bind(&user.password)
	.bind(&user.avatar)
	.bind(user.created_at)
	.execute(db)
	.await?;

	Ok(())
}

pub async fn update_email(db: impl sqlx::SqliteExecutor<'_>, id: Uuid, email: &str) -> Result<()> {
	sqlx::query(r#"UPDATE "user" SET email = ? WHERE id = ?"#)
		.bind(email)
		.bind(id)
		.execute(db)
		.await?;

	Ok(())
}

pub async fn update_avatar(
	db: impl sqlx::SqliteExecutor<'_>,
	id: Uuid,
	avatar: Option<&str>,
) -> Result<()> {
	sqlx::query(r#"UPDATE "user" SET avatar = ? WHERE id = ?"#)
		.bind(avatar)
		.bind(id)
		.execute(db)
		.await?;

	Ok(())
}

pub async fn update_password(
	db: impl sqlx::SqliteExecutor<'_>,
	id: Uuid,
	password: &[u8],
) -> Result<()> {
	sqlx::query(r#"UPDATE "user" SET password = ? WHERE id = ?"#)
		.bind(password)
		.bind(id)
		.execute(db)
		.await?;

	Ok(())
}

pub async fn assign_role(
	db: impl sqlx::SqliteExecutor<'_>,
	user_id: Uuid,
	role_id: Uuid,
) -> Result<()> {
	sqlx::query("INSERT INTO user_role (user_id, role_id) VALUES (?, ?)")
		.bind(user_id)
		.bind(role_id)
		.execute(db)
		.await?;

	Ok(())
}
