use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;
use validator::Validate;

use crate::{
	error::Result,
	model::{Page, Paginate},
	store, Database,
};

use super::model::{Post, PostDetail, SearchCriteria};

#[derive(sqlx::FromRow)]
struct PostRow {
	#[sqlx(flatten)]
	post: Post,
	author: String,
}

/// Returns the requested page of posts matching `criteria`, newest first,
/// with each post's author and tags filled in.
///
/// The count query and the page query are composed from the same filter
/// set, so the page totals always agree with the items.
pub(crate) async fn page(
	db: &Database,
	criteria: &SearchCriteria,
	paginate: Paginate,
) -> Result<Page<PostDetail>> {
	paginate.validate()?;

	let mut count = QueryBuilder::new("SELECT COUNT(*) ");

	push_from(&mut count, criteria);

	let total_items: i64 = count.build_query_scalar().fetch_one(db).await?;

	let mut query = QueryBuilder::new(r#"SELECT post.*, "user".username AS author "#);

	push_from(&mut query, criteria);

	query.push(" ORDER BY post.created_at DESC LIMIT ");
	query.push_bind(paginate.limit());
	query.push(" OFFSET ");
	query.push_bind(paginate.offset());

	let rows: Vec<PostRow> = query.build_query_as().fetch_all(db).await?;

	let mut posts: Vec<PostDetail> = rows
		.into_iter()
		.map(|row| PostDetail {
			post: row.post,
			author: row.author,
			tags: Vec::new(),
		})
		.collect();

	let post_ids: Vec<Uuid> = posts.iter().map(|detail| detail.post.id).collect();

	for (post_id, tag) in store::tag::find_for_posts(db, &post_ids).await? {
		if let Some(detail) = posts.iter_mut().find(|detail| detail.post.id == post_id) {
			detail.tags.push(tag);
		}
	}

	Ok(Page::new(posts, paginate, total_items))
}

/// Pushes the `FROM`/`WHERE` clauses shared by the count and page queries.
///
/// The tag filter joins through `post_tag`; tag names are unique, so the
/// join cannot duplicate posts.
fn push_from<'a>(builder: &mut QueryBuilder<'a, Sqlite>, criteria: &'a SearchCriteria) {
	builder.push(r#"FROM post JOIN "user" ON "user".id = post.author_id"#);

	if let Some(tag) = has_text(criteria.tag.as_deref()) {
		builder.push(
			r"
			JOIN post_tag ON post_tag.post_id = post.id
			JOIN tag ON tag.id = post_tag.tag_id AND tag.name = ",
		);
		builder.push_bind(tag);
	}

	builder.push(" WHERE 1 = 1");

	if let Some(query) = has_text(criteria.query.as_deref()) {
		let needle = format!("%{}%", query.to_lowercase());

		builder.push(" AND (LOWER(post.title) LIKE ");
		builder.push_bind(needle.clone());
		builder.push(" OR LOWER(post.content) LIKE ");
		builder.push_bind(needle);
		builder.push(")");
	}

	if let Some(author) = has_text(criteria.author.as_deref()) {
		builder.push(r#" AND "user".username = "#);
		builder.push_bind(author);
	}
}

/// Blank or whitespace-only criteria count as absent.
fn has_text(value: Option<&str>) -> Option<&str> {
	value.map(str::trim).filter(|value| !value.is_empty())
}
