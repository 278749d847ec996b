use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
	error::{self, Error, Result},
	store,
};

use super::model::Tag;

/// Resolves a raw comma-separated tag list into persisted tags and attaches
/// them to `post_id`, inside the caller's transaction.
///
/// Existing names are fetched in one batch and reused; missing names are
/// created in one batch insert. A `None` or blank list attaches nothing, so
/// an update that cleared the old set first ends up tagless. Returns the
/// attached tags, name-ordered.
pub(crate) async fn reconcile(
	conn: &mut SqliteConnection,
	post_id: Uuid,
	raw: Option<&str>,
) -> Result<Vec<Tag>> {
	let Some(raw) = raw else {
		return Ok(Vec::new());
	};

	let names = parse(raw);

	if names.is_empty() {
		return Ok(Vec::new());
	}

	let mut tags = store::tag::find_by_names(&mut *conn, &names).await?;

	let new_names: Vec<&String> = names
		.iter()
		.filter(|name| !tags.iter().any(|tag| tag.name == **name))
		.collect();

	if !new_names.is_empty() {
		let new_tags: Vec<Tag> = new_names
			.iter()
			.map(|name| Tag {
				id: Uuid::new_v4(),
				name: (*name).clone(),
				created_at: Utc::now(),
			})
			.collect();

		match store::tag::insert_many(&mut *conn, &new_tags).await {
			Ok(()) => tags.extend(new_tags),
			// A concurrent request created one of these names after our
			// batch fetch. The failed statement inserted nothing, so retry
			// name by name, absorbing whichever rows now exist.
			Err(Error::Database(ref error)) if error::is_unique_violation(error) => {
				tags.extend(insert_each_or_refetch(&mut *conn, &new_names).await?);
			}
			Err(error) => return Err(error),
		}
	}

	tags.sort_by(|a, b| a.name.cmp(&b.name));

	store::tag::attach_many(&mut *conn, post_id, &tags).await?;

	Ok(tags)
}

/// Fallback for a lost batch insert: retries the names one at a time,
/// reusing whichever rows a concurrent request created in the meantime.
async fn insert_each_or_refetch(
	conn: &mut SqliteConnection,
	names: &[&String],
) -> Result<Vec<Tag>> {
	let mut tags = Vec::with_capacity(names.len());

	for name in names {
		tags.push(insert_or_refetch(&mut *conn, name).await?);
	}

	Ok(tags)
}

/// Inserts a tag named `name`, converting a lost race against a concurrent
/// identical insert into a fetch of the winning row.
async fn insert_or_refetch(conn: &mut SqliteConnection, name: &str) -> Result<Tag> {
	let tag = Tag {
		id: Uuid::new_v4(),
		name: name.to_string(),
		created_at: Utc::now(),
	};

	match store::tag::insert(&mut *conn, &tag).await {
		Ok(()) => Ok(tag),
		Err(Error::Database(ref error)) if error::is_unique_violation(error) => {
			store::tag::find_by_name(&mut *conn, name)
				.await?
				.ok_or(Error::Database(sqlx::Error::RowNotFound))
		}
		Err(error) => Err(error),
	}
}

/// Splits a raw tag list on commas into its distinct trimmed names,
/// dropping empty entries. Names are compared exactly, so names differing
/// only in case stay distinct.
fn parse(raw: &str) -> Vec<String> {
	let mut seen = HashSet::new();

	raw.split(',')
		.map(str::trim)
		.filter(|name| !name.is_empty() && seen.insert(*name))
		.map(str::to_string)
		.collect()
}
