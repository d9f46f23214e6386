//! Record persistence over the key-value medium.
//!
//! # Responsibility
//! - Own the serialized player collection stored under one key.
//! - Return semantic errors (`NotFound`) alongside transport errors.
//!
//! # Invariants
//! - Every mutation reads, rewrites and persists the whole collection.

pub mod player_store;
