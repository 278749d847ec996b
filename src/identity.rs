use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
	authz,
	credential::CredentialHasher,
	error::{Error, Result},
	model::User,
	store, Database,
};

fn validate_username(username: &str) -> Result<(), ValidationError> {
	if username.chars().any(|c| !c.is_alphanumeric()) {
		return Err(ValidationError::new("username must be alphanumeric"));
	}

	Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
	/// The username that is displayed to the public.
	#[validate(length(min = 3, max = 16), custom(function = "validate_username"))]
	pub username: String,
	#[validate(email)]
	pub email: String,
	#[validate(length(min = 8, max = 128))]
	pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileInput {
	/// A new primary email address. Left unchanged when absent.
	#[validate(email)]
	#[serde(default)]
	pub email: Option<String>,
	/// A new avatar reference in the file store. An empty string clears the
	/// stored one; an absent field leaves it untouched.
	#[serde(default)]
	pub avatar: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordInput {
	#[validate(length(min = 8, max = 128))]
	pub new_password: String,
	#[validate(must_match(other = "new_password"))]
	pub confirm_password: String,
}

/// Registers a new account and grants it the default `ROLE_USER` role.
///
/// The username and email are checked for duplicates up front, username
/// first, so the caller always learns which one is taken.
pub async fn register(
	db: &Database,
	hasher: &CredentialHasher,
	input: RegisterInput,
) -> Result<User> {
	input.validate()?;

	let mut tx = db.begin().await?;

	if store::user::find_by_username(&mut *tx, &input.username)
		.await?
		.is_some()
	{
		return Err(Error::UsernameTaken);
	}

	if store::user::find_by_email(&mut *tx, &input.email)
		.await?
		.is_some()
	{
		return Err(Error::EmailTaken);
	}

	let id = Uuid::new_v4();
	let password = hasher.hash(&input.password, &id)?;

	let user = User {
		id,
		username: input.username,
		email: input.email,
		password: password.to_vec(),
		avatar: None,
		created_at: Utc::now(),
	};

	store::user::insert(&mut *tx, &user)
		.await
		.map_err(map_duplicate)?;

	let role = store::role::find_by_name(&mut *tx, authz::role::USER)
		.await?
		.ok_or_else(|| Error::UnknownRole(authz::role::USER.to_string()))?;

	store::user::assign_role(&mut *tx, user.id, role.id).await?;

	tx.commit().await?;

	tracing::info!("registered user {}", user.username);

	Ok(user)
}

/// Checks a username and password pair, returning the user on success.
///
/// An unknown username and a wrong password yield the same error, so the
/// caller cannot probe which usernames exist.
pub async fn authenticate(
	db: &Database,
	hasher: &CredentialHasher,
	username: &str,
	password: &str,
) -> Result<User> {
	let user = store::user::find_by_username(db, username).await?;

	let Some(user) = user else {
		return Err(Error::InvalidUsernameOrPassword);
	};

	if !hasher.verify(password, &user.id, &user.password)? {
		return Err(Error::InvalidUsernameOrPassword);
	}

	Ok(user)
}

/// Updates a user's email and avatar reference.
///
/// The email is only checked for duplicates when it actually changes.
/// Removing a replaced avatar from the file store is the caller's job.
pub async fn update_profile(
	db: &Database,
	username: &str,
	input: UpdateProfileInput,
) -> Result<User> {
	input.validate()?;

	let mut tx = db.begin().await?;

	let mut user = store::user::find_by_username(&mut *tx, username)
		.await?
		.ok_or_else(|| Error::UnknownUser(username.to_string()))?;

	if let Some(email) = input.email {
		if email != user.email {
			if store::user::find_by_email(&mut *tx, &email).await?.is_some() {
				return Err(Error::EmailTaken);
			}

			store::user::update_email(&mut *tx, user.id, &email).await?;
			user.email = email;
		}
	}

	if let Some(avatar) = input.avatar {
		let avatar = Some(avatar).filter(|avatar| !avatar.is_empty());

		store::user::update_avatar(&mut *tx, user.id, avatar.as_deref()).await?;
		user.avatar = avatar;
	}

	tx.commit().await?;

	Ok(user)
}

/// Replaces a user's password with a freshly hashed one.
pub async fn change_password(
	db: &Database,
	hasher: &CredentialHasher,
	username: &str,
	input: ChangePasswordInput,
) -> Result<()> {
	input.validate()?;

	let user = store::user::find_by_username(db, username)
		.await?
		.ok_or_else(|| Error::UnknownUser(username.to_string()))?;

	let password = hasher.hash(&input.new_password, &user.id)?;

	store::user::update_password(db, user.id, &password).await?;

	Ok(())
}

/// Returns a user by their unique username.
pub async fn find_by_username(db: &Database, username: &str) -> Result<User> {
	store::user::find_by_username(db, username)
		.await?
		.ok_or_else(|| Error::UnknownUser(username.to_string()))
}

/// Maps a unique-constraint violation on the `user` table to the same
/// duplicate errors the pre-checks produce, for inserts that lose a race
/// against a concurrent registration.
fn map_duplicate(error: Error) -> Error {
	let Error::Database(sqlx::Error::Database(ref database)) = error else {
		return error;
	};

	if database.kind() == sqlx::error::ErrorKind::UniqueViolation {
		if database.message().contains("user.username") {
			return Error::UsernameTaken;
		}

		if database.message().contains("user.email") {
			return Error::EmailTaken;
		}
	}

	error
}

#[cfg(test)]
mod test {
	use crate::test::*;

	fn input(username: &str, email: &str) -> RegisterInput {
		RegisterInput {
			username: username.to_string(),
			email: email.to_string(),
			password: "hunter2hunter".to_string(),
		}
	}

	#[sqlx::test]
	async fn test_register_grants_default_role(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();
		let user = identity::register(&pool, &hasher, input("alice", "alice@example.com"))
			.await
			.unwrap();

		assert_eq!(user.username, "alice");
		assert!(user.avatar.is_none());

		assert!(
			authz::has_permission(&pool, "alice", authz::permission::POST_CREATE)
				.await
				.unwrap()
		);
		assert!(
			!authz::has_permission(&pool, "alice", authz::permission::POST_DELETE)
				.await
				.unwrap()
		);
		assert!(!authz::is_administrator(&pool, "alice").await.unwrap());
	}

	#[sqlx::test]
	async fn test_register_rejects_duplicate_username(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();

		identity::register(&pool, &hasher, input("alice", "alice@example.com"))
			.await
			.unwrap();

		let error = identity::register(&pool, &hasher, input("alice", "other@example.com"))
			.await
			.unwrap_err();

		assert!(matches!(error, Error::UsernameTaken));
		assert_eq!(error.kind(), Kind::Duplicate);
	}

	#[sqlx::test]
	async fn test_register_rejects_duplicate_email(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();

		identity::register(&pool, &hasher, input("alice", "alice@example.com"))
			.await
			.unwrap();

		let error = identity::register(&pool, &hasher, input("bob", "alice@example.com"))
			.await
			.unwrap_err();

		assert!(matches!(error, Error::EmailTaken));
		assert_eq!(error.messages()[0].field.as_deref(), Some("email"));
	}

	#[sqlx::test]
	async fn test_register_validates_input(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();

		for bad in [
			input("a!", "alice@example.com"),
			input("ab", "alice@example.com"),
			input("alice", "not-an-email"),
			RegisterInput {
				username: "alice".to_string(),
				email: "alice@example.com".to_string(),
				password: "short".to_string(),
			},
		] {
			let error = identity::register(&pool, &hasher, bad).await.unwrap_err();

			assert_eq!(error.kind(), Kind::Validation);
		}
	}

	#[sqlx::test]
	async fn test_authenticate_round_trip(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();

		identity::register(&pool, &hasher, input("alice", "alice@example.com"))
			.await
			.unwrap();

		let user = identity::authenticate(&pool, &hasher, "alice", "hunter2hunter")
			.await
			.unwrap();

		assert_eq!(user.username, "alice");

		let wrong = identity::authenticate(&pool, &hasher, "alice", "wrong password")
			.await
			.unwrap_err();

		assert!(matches!(wrong, Error::InvalidUsernameOrPassword));
		assert_eq!(wrong.kind(), Kind::Unauthenticated);

		// Unknown usernames fail the same way as wrong passwords.
		let unknown = identity::authenticate(&pool, &hasher, "ghost", "hunter2hunter")
			.await
			.unwrap_err();

		assert!(matches!(unknown, Error::InvalidUsernameOrPassword));
	}

	#[sqlx::test]
	async fn test_change_password(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();

		identity::register(&pool, &hasher, input("alice", "alice@example.com"))
			.await
			.unwrap();

		identity::change_password(
			&pool,
			&hasher,
			"alice",
			ChangePasswordInput {
				new_password: "correct horse battery".to_string(),
				confirm_password: "correct horse battery".to_string(),
			},
		)
		.await
		.unwrap();

		identity::authenticate(&pool, &hasher, "alice", "correct horse battery")
			.await
			.unwrap();

		let stale = identity::authenticate(&pool, &hasher, "alice", "hunter2hunter")
			.await
			.unwrap_err();

		assert!(matches!(stale, Error::InvalidUsernameOrPassword));
	}

	#[sqlx::test]
	async fn test_change_password_requires_matching_confirmation(pool: Database) {
		seed(&pool).await;

		let hasher = CredentialHasher::new();

		identity::register(&pool, &hasher, input("alice", "alice@example.com"))
			.await
			.unwrap();

		let error = identity::change_password(
			&pool,
			&hasher,
			"alice",
			ChangePasswordInput {
				new_password: "correct horse battery".to_string(),
				confirm_password: "correct horse battety".to_string(),
			},
		)
		.await
		.unwrap_err();

		assert_eq!(error.kind(), Kind::Validation);
	}

	#[sqlx::test]
	async fn test_update_profile(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;
		user(&pool, "bob").await;

		let updated = identity::update_profile(
			&pool,
			"alice",
			UpdateProfileInput {
				email: Some("new@example.com".to_string()),
				avatar: Some("avatars/alice.png".to_string()),
			},
		)
		.await
		.unwrap();

		assert_eq!(updated.email, "new@example.com");
		assert_eq!(updated.avatar.as_deref(), Some("avatars/alice.png"));

		let reloaded = identity::find_by_username(&pool, "alice").await.unwrap();

		assert_eq!(reloaded.email, "new@example.com");
		assert_eq!(reloaded.avatar.as_deref(), Some("avatars/alice.png"));

		// Someone else's email is off limits.
		let error = identity::update_profile(
			&pool,
			"alice",
			UpdateProfileInput {
				email: Some("bob@example.com".to_string()),
				avatar: None,
			},
		)
		.await
		.unwrap_err();

		assert!(matches!(error, Error::EmailTaken));

		// An empty avatar reference clears the stored one.
		let cleared = identity::update_profile(
			&pool,
			"alice",
			UpdateProfileInput {
				email: None,
				avatar: Some(String::new()),
			},
		)
		.await
		.unwrap();

		assert!(cleared.avatar.is_none());
	}

	#[sqlx::test]
	async fn test_resubmitting_own_email_is_not_a_duplicate(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;

		let updated = identity::update_profile(
			&pool,
			"alice",
			UpdateProfileInput {
				email: Some("alice@example.com".to_string()),
				avatar: None,
			},
		)
		.await
		.unwrap();

		assert_eq!(updated.email, "alice@example.com");
	}

	#[sqlx::test]
	async fn test_lost_insert_race_maps_to_duplicate(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;

		let clone = User {
			id: uuid::Uuid::new_v4(),
			username: "alice".to_string(),
			email: "other@example.com".to_string(),
			password: Vec::new(),
			avatar: None,
			created_at: chrono::Utc::now(),
		};

		let error = store::user::insert(&pool, &clone).await.unwrap_err();

		assert!(matches!(super::map_duplicate(error), Error::UsernameTaken));

		let clone = User {
			id: uuid::Uuid::new_v4(),
			username: "carol".to_string(),
			email: "alice@example.com".to_string(),
			password: Vec::new(),
			avatar: None,
			created_at: chrono::Utc::now(),
		};

		let error = store::user::insert(&pool, &clone).await.unwrap_err();

		assert!(matches!(super::map_duplicate(error), Error::EmailTaken));
	}

	#[sqlx::test]
	async fn test_find_by_username(pool: Database) {
		seed(&pool).await;
		user(&pool, "alice").await;

		let found = identity::find_by_username(&pool, "alice").await.unwrap();

		assert_eq!(found.username, "alice");

		let error = identity::find_by_username(&pool, "ghost").await.unwrap_err();

		assert!(matches!(error, Error::UnknownUser(..)));
		assert_eq!(error.kind(), Kind::NotFound);
	}
}
