use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// A model representing a single user.
///
/// Use this when fetching from the database and returning to the client.
/// The `email` and `password` fields are not serialized to the client.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
	/// The unique identifier of the user.
	pub id: Uuid,
	/// The username that is displayed to the public. Immutable after
	/// registration.
	pub username: String,
	/// The user's primary email address, used for logging in.
	#[serde(skip_serializing)]
	pub email: String,
	/// The hashed password, salted with `id`.
	#[serde(skip_serializing)]
	pub password: Vec<u8>,
	/// An opaque reference to the user's avatar in the external file store.
	pub avatar: Option<String>,
	/// The creation time of the user.
	pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A named bundle of permissions, granted to users as a whole.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Role {
	pub id: Uuid,
	pub name: String,
}

/// An atomic capability, granted to roles at bootstrap and immutable after.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Permission {
	pub id: Uuid,
	pub name: String,
}

/// These can be removed when [`serde`] supports
/// literal defaults: <https://github.com/serde-rs/serde/issues/368>
#[inline]
fn zero() -> i64 {
	0
}

#[inline]
fn five() -> i64 {
	5
}

#[derive(Debug, Clone, Copy, Deserialize, Validate)]
pub struct Paginate {
	/// The page number to return (0-indexed).
	#[validate(range(min = 0))]
	#[serde(default = "zero")]
	pub page: i64,
	/// The number of items to return per page.
	#[validate(range(min = 1, max = 100))]
	#[serde(default = "five")]
	pub size: i64,
}

impl Default for Paginate {
	fn default() -> Self {
		Self { page: 0, size: 5 }
	}
}

impl Paginate {
	#[must_use]
	pub fn offset(&self) -> i64 {
		self.page * self.size
	}

	#[must_use]
	pub fn limit(&self) -> i64 {
		self.size
	}
}

/// One page of results, along with the totals callers need to render
/// pagination controls without a second query.
#[derive(Debug, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	/// The page number (0-indexed).
	pub page: i64,
	pub size: i64,
	/// The number of items across all pages.
	pub total_items: i64,
	pub total_pages: i64,
}

impl<T> Page<T> {
	#[must_use]
	pub fn new(items: Vec<T>, paginate: Paginate, total_items: i64) -> Self {
		Self {
			items,
			page: paginate.page,
			size: paginate.size,
			total_items,
			total_pages: if total_items == 0 {
				0
			} else {
				(total_items + paginate.size - 1) / paginate.size
			},
		}
	}
}

/// Rejects values that are empty or whitespace-only.
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
	if value.trim().is_empty() {
		return Err(ValidationError::new("must not be blank"));
	}

	Ok(())
}

#[cfg(test)]
mod test {
	use super::{Page, Paginate};

	#[test]
	fn test_paginate_offset() {
		let mut paginate = Paginate { page: 0, size: 10 };

		assert_eq!(paginate.offset(), 0);

		paginate.page = 1;

		assert_eq!(paginate.offset(), 10);

		paginate.size = 5;

		assert_eq!(paginate.offset(), 5);

		paginate.page = 2;

		assert_eq!(paginate.offset(), 10);
	}

	#[test]
	fn test_paginate_limit() {
		let paginate = Paginate { page: 0, size: 10 };

		assert_eq!(paginate.limit(), 10);
	}

	#[test]
	fn test_page_totals() {
		let paginate = Paginate { page: 0, size: 3 };

		let page = Page::new(vec![1, 2, 3], paginate, 7);

		assert_eq!(page.total_items, 7);
		assert_eq!(page.total_pages, 3);

		let page = Page::<i32>::new(Vec::new(), paginate, 0);

		assert_eq!(page.total_pages, 0);
	}

	#[test]
	fn test_validate_not_blank() {
		assert!(super::validate_not_blank("tea").is_ok());
		assert!(super::validate_not_blank("").is_err());
		assert!(super::validate_not_blank("  \t").is_err());
	}
}
