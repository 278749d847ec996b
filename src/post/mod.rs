use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
	authz,
	error::{Error, Result},
	model::{Page, Paginate},
	store, Database,
};

pub mod model;

mod search;
mod tags;

/// Creates a post for `author`, resolving its comma-separated tag list into
/// persisted tags, and returns it with author and tags filled in.
///
/// The status defaults to draft when the input carries none. Checking the
/// author's `POST_CREATE` permission is the caller's job.
pub async fn create(
	db: &Database,
	input: model::CreatePostInput,
	author: &str,
) -> Result<model::PostDetail> {
	input.validate()?;

	let mut tx = db.begin().await?;

	let user = store::user::find_by_username(&mut *tx, author)
		.await?
		.ok_or_else(|| Error::UnknownUser(author.to_string()))?;

	let now = Utc::now();
	let post = model::Post {
		id: Uuid::new_v4(),
		author_id: user.id,
		title: input.title,
		content: input.content,
		status: input.status.unwrap_or_default(),
		view_count: 0,
		created_at: now,
		updated_at: now,
	};

	store::post::insert(&mut *tx, &post).await?;

	let tags = tags::reconcile(&mut tx, post.id, input.tags.as_deref()).await?;

	tx.commit().await?;

	tracing::info!("user {} created post {}", user.username, post.id);

	Ok(model::PostDetail {
		post,
		author: user.username,
		tags,
	})
}

/// Updates a post's title, content, status, and tag set.
///
/// Only the post's author may update it; administrators get no override
/// here. The stored status is kept when the input carries none, and the tag
/// list replaces the old set wholesale, so a blank list leaves the post
/// tagless.
pub async fn update(
	db: &Database,
	id: Uuid,
	input: model::UpdatePostInput,
	subject: &str,
) -> Result<model::PostDetail> {
	input.validate()?;

	let mut tx = db.begin().await?;

	let (mut post, author) = store::post::find_with_author(&mut *tx, id)
		.await?
		.ok_or(Error::UnknownPost(id))?;

	if !authz::is_owner(subject, &author) {
		return Err(Error::NotPostOwner(id));
	}

	post.title = input.title;
	post.content = input.content;

	if let Some(status) = input.status {
		post.status = status;
	}

	post.updated_at = Utc::now();

	store::post::update(&mut *tx, &post).await?;

	store::tag::clear_for_post(&mut *tx, id).await?;
	let tags = tags::reconcile(&mut tx, id, input.tags.as_deref()).await?;

	tx.commit().await?;

	Ok(model::PostDetail { post, author, tags })
}

/// Deletes a post along with its comments and tag links.
///
/// The post's author may delete it, and so may an administrator. The tag
/// rows themselves are left in place for other posts to reuse.
pub async fn delete(db: &Database, id: Uuid, subject: &str) -> Result<()> {
	let mut tx = db.begin().await?;

	let (_, author) = store::post::find_with_author(&mut *tx, id)
		.await?
		.ok_or(Error::UnknownPost(id))?;

	if !authz::is_owner(subject, &author) && !authz::is_administrator(&mut *tx, subject).await? {
		return Err(Error::NotPostOwner(id));
	}

	store::comment::delete_for_post(&mut *tx, id).await?;
	store::tag::clear_for_post(&mut *tx, id).await?;
	store::post::delete_by_id(&mut *tx, id).await?;

	tx.commit().await?;

	tracing::info!("user {} deleted post {}", subject, id);

	Ok(())
}

/// Counts one view of a post with a single atomic update, so concurrent
/// views are never lost to a read-modify-write race.
pub async fn increment_view_count(db: &Database, id: Uuid) -> Result<()> {
	let affected = store::post::increment_view_count(db, id).await?;

	if affected == 0 {
		return Err(Error::UnknownPost(id));
	}

	Ok(())
}

/// Returns a single post by its unique id, with its author and tags.
pub async fn get(db: &Database, id: Uuid) -> Result<model::PostDetail> {
	let (post, author) = store::post::find_with_author(db, id)
		.await?
		.ok_or(Error::UnknownPost(id))?;

	let tags = store::tag::find_for_post(db, id).await?;

	Ok(model::PostDetail { post, author, tags })
}

/// Returns a page of all posts, newest first.
pub async fn page(db: &Database, paginate: Paginate) -> Result<Page<model::PostDetail>> {
	search::page(db, &model::SearchCriteria::default(), paginate).await
}

/// Returns a page of the posts matching `criteria`, newest first.
pub async fn search(
	db: &Database,
	criteria: &model::SearchCriteria,
	paginate: Paginate,
) -> Result<Page<model::PostDetail>> {
	search::page(db, criteria, paginate).await
}
