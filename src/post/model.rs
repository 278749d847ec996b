use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::validate_not_blank;

/// The publication state of a post.
#[derive(
	Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum PostStatus {
	#[default]
	Draft,
	Published,
	Archived,
}

/// A single post, created by a user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	pub id: Uuid,
	/// The user that created the post. Immutable after creation.
	pub author_id: Uuid,
	/// The title of the post.
	pub title: String,
	/// The content of the post in Markdown format.
	pub content: String,
	/// The publication state of the post.
	pub status: PostStatus,
	/// How many times the post has been viewed.
	pub view_count: i64,
	/// The creation time of the post.
	pub created_at: chrono::DateTime<chrono::Utc>,
	/// The time of the last mutation, equal to `created_at` until one
	/// happens.
	pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// A tag, created lazily the first time a post uses its name and never
/// deleted, even once unreferenced.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Tag {
	pub id: Uuid,
	/// The tag's name, unique and case-sensitive as stored.
	pub name: String,
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A post together with its author's username and resolved tags.
#[derive(Debug, Serialize)]
pub struct PostDetail {
	#[serde(flatten)]
	pub post: Post,
	/// The username of the post's author.
	pub author: String,
	/// The post's tags, name-ordered.
	pub tags: Vec<Tag>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostInput {
	#[validate(length(max = 100), custom(function = "validate_not_blank"))]
	pub title: String,
	/// The content of the post in Markdown format.
	#[validate(custom(function = "validate_not_blank"))]
	pub content: String,
	/// The publication state, defaulting to draft when absent.
	#[serde(default)]
	pub status: Option<PostStatus>,
	/// Comma-separated tag names.
	#[serde(default)]
	pub tags: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePostInput {
	#[validate(length(max = 100), custom(function = "validate_not_blank"))]
	pub title: String,
	/// The content of the post in Markdown format.
	#[validate(custom(function = "validate_not_blank"))]
	pub content: String,
	/// The new publication state, keeping the stored one when absent.
	#[serde(default)]
	pub status: Option<PostStatus>,
	/// Comma-separated tag names, replacing the current set wholesale.
	#[serde(default)]
	pub tags: Option<String>,
}

/// Filters for a post search.
///
/// Every field is optional and blank or whitespace-only values count as
/// absent; with no fields present a search is the plain post listing.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchCriteria {
	/// Case-insensitive substring match against title or content.
	pub query: Option<String>,
	/// Exact tag name.
	pub tag: Option<String>,
	/// Exact author username.
	pub author: Option<String>,
}
