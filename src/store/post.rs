use uuid::Uuid;

use crate::{error::Result, post::model::Post};

#[derive(sqlx::FromRow)]
struct PostWithAuthor {
	#[sqlx(flatten)]
	post: Post,
	author: String,
}

pub async fn find_by_id(db: impl sqlx::SqliteExecutor<'_>, id: Uuid) -> Result<Option<Post>> {
	let post = sqlx::query_as("SELECT * FROM post WHERE id = ?")
		.bind(id)
		.fetch_optional(db)
		.await?;

	Ok(post)
}

/// Fetches a post together with its author's username in one query.
pub async fn find_with_author(
	db: impl sqlx::SqliteExecutor<'_>,
	id: Uuid,
) -> Result<Option<(Post, String)>> {
	let row: Option<PostWithAuthor> = sqlx::query_as(
		r#"
			SELECT post.*, "user".username AS author FROM post
			JOIN "user" ON "user".id = post.author_id
			WHERE post.id = ?
		"#,
	)
	.bind(id)
	.fetch_optional(db)
	.await?;

	Ok(row.map(|row| (row.post, row.author)))
}

pub async fn insert(db: impl sqlx::SqliteExecutor<'_>, post: &Post) -> Result<()> {
	sqlx::query(
		r#"
			INSERT INTO post (id, author_id, title, content, status, view_count, created_at, updated_at)
			VALUES (?, ?, ?, ?, ?, ?, ?, ?)
		"#,
	)
	.bind(post.id)
	.bind(post.author_id)
	.bind(&post.title)
	.bind(&post.content)
	.bind(post.status)
	.bind(post.view_count)
	.bind(post.created_at)
	.bind(post.updated_at)
	.execute(db)
	.await?;

	Ok(())
}

/// Writes back the mutable columns of a post. The author never changes.
pub async fn update(db: impl sqlx::SqliteExecutor<'_>, post: &Post) -> Result<()> {
	sqlx::query(
		r#"
			UPDATE post
			SET title = ?, content = ?, status = ?, updated_at = ?
			WHERE id = ?
		"#,
	)
	.bind(&post.title)
	.bind(&post.content)
	.bind(post.status)
	.bind(post.updated_at)
	.bind(post.id)
	.execute(db)
	.await?;

	Ok(())
}

pub async fn delete_by_id(db: impl sqlx::SqliteExecutor<'_>, id: Uuid) -> Result<u64> {
	let result = sqlx::query("DELETE FROM post WHERE id = ?")
		.bind(id)
		.execute(db)
		.await?;

	Ok(result.rows_affected())
}

/// Bumps the view counter in a single UPDATE so concurrent viewers never
/// lose increments to a read-modify-write race. Returns the matched rows.
pub async fn increment_view_count(db: impl sqlx::SqliteExecutor<'_>, id: Uuid) -> Result<u64> {
	let result = sqlx::query("UPDATE post SET view_count = view_count + 1 WHERE id = ?")
		.bind(id)
		.execute(db)
		.await?;

	Ok(result.rows_affected())
}
