//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list/get/submit/delete player use-cases to Dart via FRB.
//! - Translate session outcomes into flat response envelopes the UI maps
//!   to inline field errors, toasts and dialogs.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Every submit/delete runs through one `FormSession`, so validation and
//!   delete confirmation are never bypassed.

use player_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    FieldErrors, FormSession, FormState, Player, PlayerInput, PlayerStore, SessionFailure,
    SessionOutcome, SqliteKeyValueStore,
};
use std::future::Future;
use std::path::PathBuf;
use std::sync::OnceLock;
use tokio::runtime::Runtime;

const PLAYER_DB_FILE_NAME: &str = "player_form.sqlite3";
static PLAYER_DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static RUNTIME: OnceLock<Result<Runtime, String>> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory for rolling logs.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Player row for list and detail screens. Passwords are not exposed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerItem {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<Player> for PlayerItem {
    fn from(value: Player) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerListResponse {
    pub ok: bool,
    /// Players in storage order.
    pub items: Vec<PlayerItem>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerGetResponse {
    pub ok: bool,
    pub item: Option<PlayerItem>,
    pub message: String,
}

/// One inline validation message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldErrorItem {
    /// `name|email|password|confirmPassword`.
    pub field: String,
    pub message: String,
}

/// Result envelope for submit and delete flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerActionResponse {
    pub ok: bool,
    pub player_id: Option<String>,
    /// Non-empty only when validation rejected the submission.
    pub field_errors: Vec<FieldErrorItem>,
    pub message: String,
}

impl PlayerActionResponse {
    fn success(message: impl Into<String>, player_id: String) -> Self {
        Self {
            ok: true,
            player_id: Some(player_id),
            field_errors: Vec::new(),
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            player_id: None,
            field_errors: Vec::new(),
            message: message.into(),
        }
    }

    fn invalid(errors: &FieldErrors) -> Self {
        Self {
            field_errors: errors
                .iter()
                .map(|(field, message)| FieldErrorItem {
                    field: field.as_str().to_string(),
                    message: message.to_string(),
                })
                .collect(),
            ..Self::failure("Please fix the highlighted fields.")
        }
    }
}

/// Lists all stored players.
///
/// # FFI contract
/// - Async on the bridge worker pool; DB-backed.
/// - Never panics.
pub fn players_list() -> PlayerListResponse {
    let result = run(|store| async move { store.list().await.map_err(|err| err.to_string()) });
    match result {
        Ok(players) => {
            let items = players.into_iter().map(PlayerItem::from).collect::<Vec<_>>();
            let message = if items.is_empty() {
                "No players yet.".to_string()
            } else {
                format!("Found {} player(s).", items.len())
            };
            PlayerListResponse {
                ok: true,
                items,
                message,
            }
        }
        Err(err) => PlayerListResponse {
            ok: false,
            items: Vec::new(),
            message: format!("players_list failed: {err}"),
        },
    }
}

/// Gets one player by id. Surrounding whitespace in `id` is ignored.
pub fn player_get(id: String) -> PlayerGetResponse {
    let id = normalize_id(&id);
    let result = run(|store| async move {
        store
            .find_by_id(&id)
            .await
            .map_err(|err| err.to_string())
    });
    match result {
        Ok(Some(player)) => PlayerGetResponse {
            ok: true,
            item: Some(player.into()),
            message: "Player found.".to_string(),
        },
        Ok(None) => PlayerGetResponse {
            ok: true,
            item: None,
            message: "Player not found.".to_string(),
        },
        Err(err) => PlayerGetResponse {
            ok: false,
            item: None,
            message: format!("player_get failed: {err}"),
        },
    }
}

/// Creates a player, or updates one when `target_id` names a stored player.
///
/// # FFI contract
/// - Async on the bridge worker pool; DB-backed.
/// - `target_id` is trimmed; a blank or no longer stored target creates a
///   new player.
/// - Validation failures return `ok=false` with `field_errors` populated.
pub fn player_submit(
    target_id: Option<String>,
    name: String,
    email: String,
    password: String,
    confirm_password: String,
) -> PlayerActionResponse {
    let target_id = target_id.as_deref().map(normalize_id);
    let input = PlayerInput::new(name, email, password, confirm_password);
    let result = run(|store| async move {
        let session = FormSession::new(store);
        session
            .start(target_id)
            .await
            .map_err(|err| err.to_string())?;
        session.submit(input).await.map_err(|err| err.to_string())
    });

    match result {
        Ok(FormState::Success(SessionOutcome::Created(player))) => {
            PlayerActionResponse::success("Player registered.", player.id)
        }
        Ok(FormState::Success(SessionOutcome::Updated(player))) => {
            PlayerActionResponse::success("Player updated.", player.id)
        }
        Ok(FormState::Ready(draft)) => PlayerActionResponse::invalid(&draft.field_errors),
        Ok(FormState::Failed(failure)) => failure_response("player_submit", &failure),
        Ok(other) => PlayerActionResponse::failure(format!(
            "player_submit failed: unexpected session state `{}`",
            other.name()
        )),
        Err(err) => PlayerActionResponse::failure(format!("player_submit failed: {err}")),
    }
}

/// Deletes a stored player.
///
/// The UI asks the user before calling this; the call performs both the
/// request and confirm phases of the session's delete.
pub fn player_delete(id: String) -> PlayerActionResponse {
    let id = normalize_id(&id);
    let result = run(|store| async move {
        let session = FormSession::new(store);
        let loaded = session
            .start(Some(id.clone()))
            .await
            .map_err(|err| err.to_string())?;
        if loaded
            .draft()
            .and_then(|draft| draft.editing_id())
            .is_none()
        {
            return Ok(match loaded {
                FormState::Failed(failure) => FormState::Failed(failure),
                _ => FormState::Failed(SessionFailure::NotFound(id)),
            });
        }
        session
            .request_delete()
            .await
            .map_err(|err| err.to_string())?;
        session.confirm_delete().await.map_err(|err| err.to_string())
    });

    match result {
        Ok(FormState::Success(SessionOutcome::Deleted(player_id))) => {
            PlayerActionResponse::success("Player deleted.", player_id)
        }
        Ok(FormState::Ready(draft)) => match draft.last_failure {
            Some(failure) => failure_response("player_delete", &failure),
            None => PlayerActionResponse::failure("player_delete failed: delete not performed"),
        },
        Ok(FormState::Failed(failure)) => failure_response("player_delete", &failure),
        Ok(other) => PlayerActionResponse::failure(format!(
            "player_delete failed: unexpected session state `{}`",
            other.name()
        )),
        Err(err) => PlayerActionResponse::failure(format!("player_delete failed: {err}")),
    }
}

// Ids arrive from text fields and route params; surrounding whitespace is noise.
fn normalize_id(id: &str) -> String {
    id.trim().to_string()
}

fn failure_response(op: &str, failure: &SessionFailure) -> PlayerActionResponse {
    match failure {
        SessionFailure::NotFound(_) => PlayerActionResponse::failure("Player not found."),
        SessionFailure::Storage(message) => {
            PlayerActionResponse::failure(format!("{op} failed: {message}"))
        }
    }
}

fn run<T, F, Fut>(f: F) -> Result<T, String>
where
    F: FnOnce(PlayerStore<SqliteKeyValueStore>) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let runtime = RUNTIME
        .get_or_init(|| {
            tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| format!("runtime init failed: {err}"))
        })
        .as_ref()
        .map_err(Clone::clone)?;

    let medium = SqliteKeyValueStore::open(resolve_player_db_path())
        .map_err(|err| format!("player DB open failed: {err}"))?;
    runtime.block_on(f(PlayerStore::new(medium)))
}

fn resolve_player_db_path() -> PathBuf {
    PLAYER_DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var("PLAYER_DB_PATH") {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(PLAYER_DB_FILE_NAME)
        })
        .clone()
}
