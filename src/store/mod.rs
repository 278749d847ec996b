//! Row-level access to the relational store, one submodule per entity.
//!
//! Every function takes any [`sqlx::SqliteExecutor`] so the same query runs
//! against the pool or inside a caller's transaction. "Found or not" is an
//! [`Option`], never an error; relationships live in join tables resolved
//! by explicit queries rather than live object references.

pub mod comment;
pub mod permission;
pub mod post;
pub mod role;
pub mod tag;
pub mod user;
