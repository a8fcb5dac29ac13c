//! Database module: models and schema for persistent storage.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows plus the public API shapes
//! - `patch.rs`: wire-deserializable input shapes for mutations
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `actor.rs`: the store actor owning the connection pool

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

pub use models::{Mood, Post, Thought, excerpt_of};
pub use patch::{PostUpsert, ThoughtSave};
pub use schema::SQLITE_INIT;

pub use actor::{DbActorHandle, spawn};
