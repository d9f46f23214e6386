//! Domain model for persisted player records.
//!
//! # Responsibility
//! - Define the record shape stored in the player collection.
//! - Keep the serialized field names stable across releases.
//!
//! # Invariants
//! - Every stored player is identified by an id assigned at creation.

pub mod player;
