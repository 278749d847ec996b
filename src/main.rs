#![warn(clippy::pedantic)]

use quill::{bootstrap, CredentialHasher};

/// Reads one account seed from `<PREFIX>_USERNAME`, `<PREFIX>_EMAIL` and
/// `<PREFIX>_PASSWORD`, returning `None` unless all three are set.
fn seed_from_env(prefix: &str) -> Option<bootstrap::Seed> {
	let username = std::env::var(format!("{prefix}_USERNAME")).ok()?;
	let email = std::env::var(format!("{prefix}_EMAIL")).ok()?;
	let password = std::env::var(format!("{prefix}_PASSWORD")).ok()?;

	Some(bootstrap::Seed {
		username,
		email,
		password,
	})
}

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt::init();
	dotenvy::dotenv().ok();

	let database =
		quill::connect(&std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"))
			.await
			.expect("failed to connect to database");

	bootstrap::run(
		&database,
		&CredentialHasher::new(),
		seed_from_env("ADMIN"),
		seed_from_env("USER"),
	)
	.await
	.expect("failed to seed database");

	tracing::info!("database ready");
}
