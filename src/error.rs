use std::borrow::Cow;

use serde::Serialize;
use uuid::Uuid;

/// Extra structured detail attached to an error [`Message`].
pub type Map = serde_json::Map<String, serde_json::Value>;

/// Error type for the crate.
///
/// Every condition a caller is expected to branch on is its own variant;
/// [`Error::kind`] gives the coarse classification so a boundary layer can
/// pick a response without matching variants one by one. The `Display`
/// output of the store and hashing variants can contain sensitive detail
/// and must not be shown to clients; [`Error::messages`] already redacts
/// them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("unknown post {0}")]
	UnknownPost(Uuid),
	#[error("unknown role {0}")]
	UnknownRole(String),
	#[error("invalid username or password")]
	InvalidUsernameOrPassword,
	#[error("missing permission {0}")]
	MissingPermission(&'static str),
	#[error("not the author of post {0}")]
	NotPostOwner(Uuid),
	#[error("username already taken")]
	UsernameTaken,
	#[error("email already taken")]
	EmailTaken,
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("password hashing error")]
	Argon(#[from] argon2::Error),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("migration error: {0}")]
	Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Coarse error classification.
///
/// Mirrors the response classes a boundary layer would map to: `NotFound`
/// (404), `Unauthenticated` (401), `Unauthorized` (403), `Duplicate` (409),
/// `Validation` (400) and `Internal` (500).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
	NotFound,
	Unauthenticated,
	Unauthorized,
	Duplicate,
	Validation,
	Internal,
}

impl Error {
	#[must_use]
	pub fn kind(&self) -> Kind {
		match self {
			Self::UnknownUser(..) | Self::UnknownPost(..) | Self::UnknownRole(..) => Kind::NotFound,
			Self::InvalidUsernameOrPassword => Kind::Unauthenticated,
			Self::MissingPermission(..) | Self::NotPostOwner(..) => Kind::Unauthorized,
			Self::UsernameTaken | Self::EmailTaken => Kind::Duplicate,
			Self::Validation(..) => Kind::Validation,
			Self::Argon(..) | Self::Database(..) | Self::Migrate(..) => Kind::Internal,
		}
	}

	/// Messages that are safe to present to a client.
	///
	/// Internal errors produce an empty list so that store and hashing
	/// diagnostics never leak past the boundary.
	#[must_use]
	pub fn messages(&self) -> Vec<Message<'_>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors
						.iter()
						.map(move |error| Message::new(error.to_string()).field(field))
				})
				.collect(),
			Self::UnknownUser(username) => Message::new(self.to_string())
				.detail("username", username.as_str())
				.into_vec(),
			Self::UnknownPost(post) => Message::new(self.to_string())
				.detail("post", post.to_string())
				.into_vec(),
			Self::UnknownRole(role) => Message::new(self.to_string())
				.detail("role", role.as_str())
				.into_vec(),
			Self::MissingPermission(permission) => Message::new(self.to_string())
				.detail("permission", *permission)
				.into_vec(),
			Self::UsernameTaken => Message::new(self.to_string()).field("username").into_vec(),
			Self::EmailTaken => Message::new(self.to_string()).field("email").into_vec(),
			Self::InvalidUsernameOrPassword | Self::NotPostOwner(..) => {
				Message::new(self.to_string()).into_vec()
			}
			Self::Argon(..) | Self::Database(..) | Self::Migrate(..) => Vec::new(),
		}
	}
}

/// A single client-facing error message.
#[derive(Debug, Serialize)]
pub struct Message<'e> {
	pub content: Cow<'e, str>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'e, str>>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Map>,
}

impl<'e> Message<'e> {
	pub fn new(content: impl Into<Cow<'e, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'e, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(Map::new)
			.insert(key.into(), value.into());
		self
	}

	#[must_use]
	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// Whether `error` is a unique-constraint violation reported by the store.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
	matches!(
		error,
		sqlx::Error::Database(e) if e.kind() == sqlx::error::ErrorKind::UniqueViolation
	)
}

#[cfg(test)]
mod test {
	use super::{Error, Kind};

	use uuid::Uuid;

	#[test]
	fn test_kind_classification() {
		assert_eq!(Error::UnknownUser("ghost".into()).kind(), Kind::NotFound);
		assert_eq!(Error::UnknownPost(Uuid::nil()).kind(), Kind::NotFound);
		assert_eq!(
			Error::InvalidUsernameOrPassword.kind(),
			Kind::Unauthenticated
		);
		assert_eq!(
			Error::MissingPermission("POST_CREATE").kind(),
			Kind::Unauthorized
		);
		assert_eq!(Error::NotPostOwner(Uuid::nil()).kind(), Kind::Unauthorized);
		assert_eq!(Error::UsernameTaken.kind(), Kind::Duplicate);
		assert_eq!(Error::EmailTaken.kind(), Kind::Duplicate);
		assert_eq!(
			Error::Database(sqlx::Error::RowNotFound).kind(),
			Kind::Internal
		);
	}

	#[test]
	fn test_duplicate_messages_name_the_field() {
		let messages = Error::EmailTaken.messages();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].field.as_deref(), Some("email"));
	}

	#[test]
	fn test_internal_messages_are_redacted() {
		assert!(Error::Database(sqlx::Error::RowNotFound).messages().is_empty());
	}
}
