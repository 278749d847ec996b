use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
	error::{Error, Result},
	model::validate_not_blank,
	store, Database,
};

/// A single comment on a post.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Comment {
	pub id: Uuid,
	pub post_id: Uuid,
	pub author_id: Uuid,
	pub content: String,
	pub created_at: DateTime<Utc>,
}

/// A comment together with its author's username.
#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct CommentDetail {
	#[serde(flatten)]
	#[sqlx(flatten)]
	pub comment: Comment,
	/// The username of the comment's author.
	pub author: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddCommentInput {
	#[validate(custom(function = "validate_not_blank"))]
	pub content: String,
}

/// Adds a comment to a post for `author`.
///
/// Checking the author's `COMMENT_CREATE` permission is the caller's job.
pub async fn add(
	db: &Database,
	input: AddCommentInput,
	post_id: Uuid,
	author: &str,
) -> Result<CommentDetail> {
	input.validate()?;

	let mut tx = db.begin().await?;

	let post = store::post::find_by_id(&mut *tx, post_id)
		.await?
		.ok_or(Error::UnknownPost(post_id))?;

	let user = store::user::find_by_username(&mut *tx, author)
		.await?
		.ok_or_else(|| Error::UnknownUser(author.to_string()))?;

	let comment = Comment {
		id: Uuid::new_v4(),
		post_id: post.id,
		author_id: user.id,
		content: input.content,
		created_at: Utc::now(),
	};

	store::comment::insert(&mut *tx, &comment).await?;

	tx.commit().await?;

	Ok(CommentDetail {
		comment,
		author: user.username,
	})
}

/// Returns a post's comments oldest first, each with its author's username.
pub async fn for_post(db: &Database, post_id: Uuid) -> Result<Vec<CommentDetail>> {
	store::comment::find_by_post(db, post_id).await
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_add_and_list_oldest_first(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;
		user(&pool, "bob").await;

		let created = create_post(&pool, "alice", "Discussed", None).await;

		comment::add(
			&pool,
			AddCommentInput {
				content: "First!".to_string(),
			},
			created.post.id,
			"bob",
		)
		.await
		.unwrap();

		comment::add(
			&pool,
			AddCommentInput {
				content: "Thanks for reading.".to_string(),
			},
			created.post.id,
			"alice",
		)
		.await
		.unwrap();

		let comments = comment::for_post(&pool, created.post.id).await.unwrap();

		assert_eq!(comments.len(), 2);
		assert_eq!(comments[0].comment.content, "First!");
		assert_eq!(comments[0].author, "bob");
		assert_eq!(comments[1].author, "alice");
	}

	#[sqlx::test]
	async fn test_add_rejects_unknown_post(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;

		let error = comment::add(
			&pool,
			AddCommentInput {
				content: "Hello?".to_string(),
			},
			uuid::Uuid::new_v4(),
			"alice",
		)
		.await
		.unwrap_err();

		assert!(matches!(error, Error::UnknownPost(..)));
		assert_eq!(error.kind(), Kind::NotFound);
	}

	#[sqlx::test]
	async fn test_add_rejects_unknown_author(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;

		let created = create_post(&pool, "alice", "Discussed", None).await;

		let error = comment::add(
			&pool,
			AddCommentInput {
				content: "Hello?".to_string(),
			},
			created.post.id,
			"ghost",
		)
		.await
		.unwrap_err();

		assert!(matches!(error, Error::UnknownUser(..)));
	}

	#[sqlx::test]
	async fn test_add_rejects_blank_content(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;

		let created = create_post(&pool, "alice", "Discussed", None).await;

		let error = comment::add(
			&pool,
			AddCommentInput {
				content: "   ".to_string(),
			},
			created.post.id,
			"alice",
		)
		.await
		.unwrap_err();

		assert_eq!(error.kind(), Kind::Validation);
	}
}
