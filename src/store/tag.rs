use sqlx::QueryBuilder;
use uuid::Uuid;

use crate::{error::Result, post::model::Tag};

#[derive(sqlx::FromRow)]
struct PostTagRow {
	post_id: Uuid,
	#[sqlx(flatten)]
	tag: Tag,
}

pub async fn find_by_name(db: impl sqlx::SqliteExecutor<'_>, name: &str) -> Result<Option<Tag>> {
	let tag = sqlx::query_as("SELECT * FROM tag WHERE name = ?")
		.bind(name)
		.fetch_optional(db)
		.await?;

	Ok(tag)
}

/// Fetches every tag whose name is in `names` in a single query.
pub async fn find_by_names(
	db: impl sqlx::SqliteExecutor<'_>,
	names: &[String],
) -> Result<Vec<Tag>> {
	if names.is_empty() {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::new("SELECT * FROM tag WHERE name IN (");

	let mut separated = builder.separated(", ");
	for name in names {
		separated.push_bind(name);
	}
	separated.push_unseparated(")");

	let tags = builder.build_query_as().fetch_all(db).await?;

	Ok(tags)
}

/// Returns a post's tags, name-ordered.
pub async fn find_for_post(db: impl sqlx::SqliteExecutor<'_>, post_id: Uuid) -> Result<Vec<Tag>> {
	let tags = sqlx::query_as(
		r#"
			SELECT tag.* FROM tag
			JOIN post_tag ON post_tag.tag_id = tag.id
			WHERE post_tag.post_id = ?
			ORDER BY tag.name
		"#,
	)
	.bind(post_id)
	.fetch_all(db)
	.await?;

	Ok(tags)
}

/// Returns the tags of every post in `post_ids` in one query, as
/// `(post_id, tag)` pairs for the caller to group.
pub async fn find_for_posts(
	db: impl sqlx::SqliteExecutor<'_>,
	post_ids: &[Uuid],
) -> Result<Vec<(Uuid, Tag)>> {
	if post_ids.is_empty() {
		return Ok(Vec::new());
	}

	let mut builder = QueryBuilder::new(
		r"
			SELECT post_tag.post_id, tag.* FROM tag
			JOIN post_tag ON post_tag.tag_id = tag.id
			WHERE post_tag.post_id IN (
		",
	);

	let mut separated = builder.separated(", ");
	for post_id in post_ids {
		separated.push_bind(post_id);
	}
	separated.push_unseparated(") ORDER BY tag.name");

	let rows: Vec<PostTagRow> = builder.build_query_as().fetch_all(db).await?;

	Ok(rows.into_iter().map(|row| (row.post_id, row.tag)).collect())
}

pub async fn insert(db: impl sqlx::SqliteExecutor<'_>, tag: &Tag) -> Result<()> {
	sqlx::query("INSERT INTO tag (id, name, created_at) VALUES (?, ?, ?)")
		.bind(tag.id)
		.bind(&tag.name)
		.bind(tag.created_at)
		.execute(db)
		.await?;

	Ok(())
}

/// Inserts `tags` in a single multi-row statement. If any name collides
/// with an existing row the whole statement fails without inserting.
pub async fn insert_many(db: impl sqlx::SqliteExecutor<'_>, tags: &[Tag]) -> Result<()> {
	if tags.is_empty() {
		return Ok(());
	}

	let mut builder = QueryBuilder::new("INSERT INTO tag (id, name, created_at) ");

	builder.push_values(tags, |mut row, tag| {
		row.push_bind(tag.id)
			.push_bind(&tag.name)
			.push_bind(tag.created_at);
	});

	builder.build().execute(db).await?;

	Ok(())
}

/// Links every tag in `tags` to `post_id` in a single multi-row insert.
pub async fn attach_many(
	db: impl sqlx::SqliteExecutor<'_>,
	post_id: Uuid,
	tags: &[Tag],
) -> Result<()> {
	if tags.is_empty() {
		return Ok(());
	}

	let mut builder = QueryBuilder::new("INSERT INTO post_tag (post_id, tag_id) ");

	builder.push_values(tags, |mut row, tag| {
		row.push_bind(post_id).push_bind(tag.id);
	});

	builder.build().execute(db).await?;

	Ok(())
}

pub async fn clear_for_post(db: impl sqlx::SqliteExecutor<'_>, post_id: Uuid) -> Result<()> {
	sqlx::query("DELETE FROM post_tag WHERE post_id = ?")
		.bind(post_id)
		.execute(db)
		.await?;

	Ok(())
}
