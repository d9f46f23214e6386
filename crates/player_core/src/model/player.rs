//! Player record model.
//!
//! # Responsibility
//! - Define the persisted `Player` record and its id-less `PlayerInput`.
//! - Generate fresh ids for newly created players.
//!
//! # Invariants
//! - `id` is assigned once and never changes for the life of the record.
//! - Records are written with camelCase keys (`confirmPassword`).
//! - Records written by the first app release (`nome`, `senha`,
//!   `confirmaSenha`) still decode; they are rewritten in the current
//!   key set on the next mutation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque player identifier.
///
/// Generated ids are UUID v4 strings, but ids read back from storage are not
/// required to parse as UUIDs.
pub type PlayerId = String;

/// Form values submitted for a player, without identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    #[serde(alias = "nome")]
    pub name: String,
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
    #[serde(alias = "confirmaSenha")]
    pub confirm_password: String,
}

impl PlayerInput {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
        confirm_password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            password: password.into(),
            confirm_password: confirm_password.into(),
        }
    }
}

/// One persisted player record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    #[serde(alias = "nome")]
    pub name: String,
    pub email: String,
    #[serde(alias = "senha")]
    pub password: String,
    /// Stored alongside `password`; only meaningful as an equality check at
    /// validation time.
    #[serde(alias = "confirmaSenha")]
    pub confirm_password: String,
}

impl Player {
    /// Creates a player from form input with a freshly generated id.
    ///
    /// Uniqueness is probabilistic (128-bit random id) and is not checked
    /// against the existing collection.
    pub fn new(input: PlayerInput) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), input)
    }

    /// Creates a player keeping a caller-provided id.
    ///
    /// Used by the edit flow, where the record identity already exists.
    pub fn with_id(id: impl Into<PlayerId>, input: PlayerInput) -> Self {
        Self {
            id: id.into(),
            name: input.name,
            email: input.email,
            password: input.password,
            confirm_password: input.confirm_password,
        }
    }

    /// Returns the form values of this record, dropping the id.
    pub fn to_input(&self) -> PlayerInput {
        PlayerInput {
            name: self.name.clone(),
            email: self.email.clone(),
            password: self.password.clone(),
            confirm_password: self.confirm_password.clone(),
        }
    }
}
