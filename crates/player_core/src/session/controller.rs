//! Async driver for form sessions.
//!
//! # Responsibility
//! - Feed user actions into `machine::transition`.
//! - Run the requested storage effect and feed its completion back.
//!
//! # Invariants
//! - Storage effects and their completion run on a spawned task, so the
//!   session reaches its next state even if the caller stops awaiting.
//! - After `dispose`, completions are logged and dropped; the session state
//!   is never mutated again.
//! - The state lock is never held across an `.await`.

use super::machine::{transition, Effect, FormEvent, FormState, TransitionError};
use super::SessionFailure;
use crate::model::player::{PlayerId, PlayerInput};
use crate::repo::player_store::PlayerStore;
use crate::storage::KeyValueStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Transition(TransitionError),
    /// The session was torn down; the action or completion was ignored.
    Disposed,
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transition(err) => write!(f, "{err}"),
            Self::Disposed => write!(f, "form session was disposed"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transition(err) => Some(err),
            Self::Disposed => None,
        }
    }
}

impl From<TransitionError> for SessionError {
    fn from(value: TransitionError) -> Self {
        Self::Transition(value)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
struct Shared {
    state: FormState,
    disposed: bool,
}

/// Owner-independent handle used to tear a session down.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    shared: Arc<Mutex<Shared>>,
}

impl SessionHandle {
    /// Marks the session disposed. In-flight storage calls still finish.
    pub fn dispose(&self) {
        let mut shared = lock(&self.shared);
        if !shared.disposed {
            shared.disposed = true;
            info!(
                "event=session_dispose module=session status=ok state={}",
                shared.state.name()
            );
        }
    }

    pub fn is_disposed(&self) -> bool {
        lock(&self.shared).disposed
    }
}

/// One create/edit/delete flow over a player store.
pub struct FormSession<S: KeyValueStore + 'static> {
    store: PlayerStore<S>,
    shared: Arc<Mutex<Shared>>,
}

impl<S: KeyValueStore + 'static> FormSession<S> {
    pub fn new(store: PlayerStore<S>) -> Self {
        Self {
            store,
            shared: Arc::new(Mutex::new(Shared {
                state: FormState::Idle,
                disposed: false,
            })),
        }
    }

    pub fn handle(&self) -> SessionHandle {
        SessionHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> FormState {
        lock(&self.shared).state.clone()
    }

    /// Starts the session; loads the target player when `target_id` is set.
    pub async fn start(&self, target_id: Option<PlayerId>) -> SessionResult<FormState> {
        self.dispatch(FormEvent::Start { target_id }).await
    }

    /// Validates and saves the form. Field errors leave the session in `Ready`.
    pub async fn submit(&self, input: PlayerInput) -> SessionResult<FormState> {
        self.dispatch(FormEvent::Submit(input)).await
    }

    /// First phase of delete; only valid while editing a stored player.
    pub async fn request_delete(&self) -> SessionResult<FormState> {
        self.dispatch(FormEvent::RequestDelete).await
    }

    pub async fn cancel_delete(&self) -> SessionResult<FormState> {
        self.dispatch(FormEvent::CancelDelete).await
    }

    /// Second phase of delete; removes the player from storage.
    pub async fn confirm_delete(&self) -> SessionResult<FormState> {
        self.dispatch(FormEvent::ConfirmDelete).await
    }

    pub fn dispose(&self) {
        self.handle().dispose();
    }

    async fn dispatch(&self, event: FormEvent) -> SessionResult<FormState> {
        let effect = self.apply(event)?;
        let Some(kind) = CompletionKind::of(&effect) else {
            return Ok(self.state());
        };

        let store = self.store.clone();
        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let completion = run_effect(store, effect).await;
            complete(&shared, completion)
        });

        match task.await {
            Ok(result) => result,
            Err(err) => complete(&self.shared, kind.failed(err.to_string())),
        }
    }

    fn apply(&self, event: FormEvent) -> SessionResult<Effect> {
        let mut shared = lock(&self.shared);
        if shared.disposed {
            return Err(SessionError::Disposed);
        }

        let event_name = event.name();
        let next = transition(&shared.state, event).map_err(|err| {
            warn!(
                "event=session_transition module=session status=rejected state={} input_event={event_name} error={err}",
                shared.state.name()
            );
            err
        })?;
        shared.state = next.state;
        Ok(next.effect)
    }
}

/// Completion event family expected for an effect.
#[derive(Debug, Clone, Copy)]
enum CompletionKind {
    Loaded,
    Saved,
    Removed,
}

impl CompletionKind {
    fn of(effect: &Effect) -> Option<Self> {
        match effect {
            Effect::None => None,
            Effect::Load(_) => Some(Self::Loaded),
            Effect::Insert(_) | Effect::Replace { .. } => Some(Self::Saved),
            Effect::Remove(_) => Some(Self::Removed),
        }
    }

    fn failed(self, message: String) -> FormEvent {
        let failure = SessionFailure::Storage(message);
        match self {
            Self::Loaded => FormEvent::Loaded(Err(failure)),
            Self::Saved => FormEvent::Saved(Err(failure)),
            Self::Removed => FormEvent::Removed(Err(failure)),
        }
    }
}

async fn run_effect<S: KeyValueStore>(store: PlayerStore<S>, effect: Effect) -> FormEvent {
    match effect {
        Effect::Load(player_id) => {
            let loaded = store.find_by_id(&player_id).await;
            if let Ok(None) = &loaded {
                warn!(
                    "event=session_load module=session status=not_found player_id={player_id} fallback=new"
                );
            }
            FormEvent::Loaded(loaded.map_err(SessionFailure::from))
        }
        Effect::Insert(input) => {
            FormEvent::Saved(store.insert(input).await.map_err(SessionFailure::from))
        }
        Effect::Replace { player_id, player } => FormEvent::Saved(
            store
                .replace(&player_id, player)
                .await
                .map_err(SessionFailure::from),
        ),
        Effect::Remove(player_id) => {
            FormEvent::Removed(store.remove(&player_id).await.map_err(SessionFailure::from))
        }
        Effect::None => CompletionKind::Saved.failed("no storage call requested".to_string()),
    }
}

// Runs on the effect task, so the session settles even when nobody awaits it.
fn complete(shared: &Mutex<Shared>, completion: FormEvent) -> SessionResult<FormState> {
    let mut shared = lock(shared);
    if shared.disposed {
        info!(
            "event=session_late_completion module=session status=ignored completion={}",
            completion.name()
        );
        return Err(SessionError::Disposed);
    }

    let next = transition(&shared.state, completion)?;
    shared.state = next.state;
    info!(
        "event=session_transition module=session status=ok state={}",
        shared.state.name()
    );
    Ok(shared.state.clone())
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}
