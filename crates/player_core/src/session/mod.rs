//! Create/edit/delete form sessions.
//!
//! # Responsibility
//! - Model one form session as an explicit state machine (`machine`).
//! - Drive the machine against a `PlayerStore`, one storage call at a time
//!   (`controller`).
//!
//! # Invariants
//! - A session never starts a storage call while another is in flight.
//! - Completions arriving after the session is disposed are dropped.

pub mod controller;
pub mod machine;

use crate::model::player::PlayerId;
use crate::repo::player_store::StoreError;
use std::fmt::{Display, Formatter};

/// Failure outcome surfaced to the form layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionFailure {
    /// The record targeted by a replace or delete no longer exists.
    NotFound(PlayerId),
    /// Medium, serialization or persisted-data failure. Not retried.
    Storage(String),
}

impl Display for SessionFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "player not found: {id}"),
            Self::Storage(message) => write!(f, "storage failure: {message}"),
        }
    }
}

impl From<StoreError> for SessionFailure {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::NotFound(id) => Self::NotFound(id),
            other => Self::Storage(other.to_string()),
        }
    }
}
