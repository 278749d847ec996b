use argon2::Argon2;
use uuid::Uuid;

use crate::error::Result;

pub const KEY_LENGTH: usize = 32;

/// Hashes and verifies user credentials.
///
/// Passwords are hashed with Argon2, using the owning user's id as the salt.
/// Plaintext never leaves this type, so callers can only store or compare
/// digests.
#[derive(Clone, Default)]
pub struct CredentialHasher {
	hasher: Argon2<'static>,
}

impl CredentialHasher {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Hashes `password` with the user's `id` as a salt.
	pub fn hash(&self, password: &str, id: &Uuid) -> Result<[u8; KEY_LENGTH]> {
		let mut hash = [0; KEY_LENGTH];

		self.hasher
			.hash_password_into(password.as_bytes(), id.as_bytes(), &mut hash)?;

		Ok(hash)
	}

	/// Whether `password` hashes to the stored digest for the user `id`.
	pub fn verify(&self, password: &str, id: &Uuid, digest: &[u8]) -> Result<bool> {
		Ok(digest == self.hash(password, id)?)
	}
}

#[cfg(test)]
mod test {
	use super::CredentialHasher;

	use uuid::Uuid;

	#[test]
	fn test_hash_is_salted_by_id() {
		let hasher = CredentialHasher::new();

		let a = hasher.hash("hunter2hunter", &Uuid::new_v4()).unwrap();
		let b = hasher.hash("hunter2hunter", &Uuid::new_v4()).unwrap();

		assert_ne!(a, b);
	}

	#[test]
	fn test_verify_round_trip() {
		let hasher = CredentialHasher::new();
		let id = Uuid::new_v4();

		let digest = hasher.hash("hunter2hunter", &id).unwrap();

		assert!(hasher.verify("hunter2hunter", &id, &digest).unwrap());
		assert!(!hasher.verify("wrong password", &id, &digest).unwrap());
	}
}
