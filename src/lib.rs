#![warn(clippy::pedantic)]

pub mod authz;
pub mod bootstrap;
pub mod comment;
pub mod credential;
pub mod error;
pub mod identity;
pub mod model;
pub mod post;
pub mod store;


use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

pub use credential::CredentialHasher;
pub use error::{Error, Result};

pub type Database = sqlx::Pool<sqlx::Sqlite>;

/// Opens the SQLite database at `url`, creating the file when missing, and
/// applies any pending migrations.
pub async fn connect(url: &str) -> Result<Database> {
	let options = SqliteConnectOptions::from_str(url)?
		.create_if_missing(true)
		.journal_mode(SqliteJournalMode::Wal)
		.synchronous(SqliteSynchronous::Normal)
		.foreign_keys(true)
		.busy_timeout(Duration::from_secs(5));

	// SQLite allows one writer at a time; a single connection keeps
	// concurrent transactions from tripping over the write lock.
	let pool = SqlitePoolOptions::new()
		.max_connections(1)
		.connect_with(options)
		.await?;

	sqlx::migrate!().run(&pool).await?;

	Ok(pool)
}
