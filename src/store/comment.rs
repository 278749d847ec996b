use uuid::Uuid;

use crate::{
	comment::{Comment, CommentDetail},
	error::Result,
};

pub async fn insert(db: impl sqlx::SqliteExecutor<'_>, comment: &Comment) -> Result<()> {
	sqlx::query(
		r#"
			INSERT INTO comment (id, post_id, author_id, content, created_at)
			VALUES (?, ?, ?, ?, ?)
		"#,
	)
	.bind(comment.id)
	.bind(comment.post_id)
	.bind(comment.author_id)
	.bind(&comment.content)
	.bind(comment.created_at)
	.execute(db)
	.await?;

	Ok(())
}

/// Returns a post's comments oldest first, each with its author's username.
pub async fn find_by_post(
	db: impl sqlx::SqliteExecutor<'_>,
	post_id: Uuid,
) -> Result<Vec<CommentDetail>> {
	let comments = sqlx::query_as(
		r#"
			SELECT comment.*, "user".username AS author FROM comment
			JOIN "user" ON "user".id = comment.author_id
			WHERE comment.post_id = ?
			ORDER BY comment.created_at
		"#,
	)
	.bind(post_id)
	.fetch_all(db)
	.await?;

	Ok(comments)
}

/// Removes a post's comments ahead of the post row itself.
pub async fn delete_for_post(db: impl sqlx::SqliteExecutor<'_>, post_id: Uuid) -> Result<()> {
	sqlx::query("DELETE FROM comment WHERE post_id = ?")
		.bind(post_id)
		.execute(db)
		.await?;

	Ok(())
}
