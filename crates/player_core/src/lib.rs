//! Core record logic for the player registration app.
//! Validation, persistence and form-session lifecycle live here; the mobile
//! UI only calls in.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod session;
pub mod storage;
pub mod validation;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::player::{Player, PlayerId, PlayerInput};
pub use repo::player_store::{PlayerStore, StoreError, StoreResult, DEFAULT_PLAYERS_KEY};
pub use session::controller::{FormSession, SessionError, SessionHandle, SessionResult};
pub use session::machine::{
    transition, Effect, FormDraft, FormEvent, FormMode, FormState, SessionOutcome, Transition,
    TransitionError,
};
pub use session::SessionFailure;
pub use storage::{
    KeyValueStore, MemoryKeyValueStore, SqliteKeyValueStore, StorageError, StorageResult,
};
pub use validation::{validate_player_input, FieldErrors, PlayerField};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
