//! Pure form-session state machine.
//!
//! `transition` maps `(state, event)` to the next state plus the storage
//! effect the driver must run. It performs no I/O.
//!
//! ```text
//! Idle -> Loading -> Ready(new | editing) -> Submitting -> Success | Failed
//!                    Ready(editing) -> [request, confirm] -> Deleting
//!                                       -> Success | Ready(editing)
//! ```

use super::SessionFailure;
use crate::model::player::{Player, PlayerId, PlayerInput};
use crate::validation::{validate_player_input, FieldErrors};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Whether the form creates a new player or edits a stored one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    New,
    Editing { player_id: PlayerId },
}

/// Editable form contents while the session is interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDraft {
    pub mode: FormMode,
    pub input: PlayerInput,
    pub field_errors: FieldErrors,
    /// Set after a delete request, cleared by cancel or any other action.
    pub delete_requested: bool,
    /// Last recoverable failure (a failed delete keeps the session open).
    pub last_failure: Option<SessionFailure>,
}

impl FormDraft {
    fn new_record() -> Self {
        Self::with_mode(FormMode::New, PlayerInput::default())
    }

    fn editing(player: Player) -> Self {
        let input = player.to_input();
        Self::with_mode(
            FormMode::Editing {
                player_id: player.id,
            },
            input,
        )
    }

    fn with_mode(mode: FormMode, input: PlayerInput) -> Self {
        Self {
            mode,
            input,
            field_errors: FieldErrors::default(),
            delete_requested: false,
            last_failure: None,
        }
    }

    pub fn editing_id(&self) -> Option<&str> {
        match &self.mode {
            FormMode::Editing { player_id } => Some(player_id),
            FormMode::New => None,
        }
    }
}

/// Terminal success of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Created(Player),
    Updated(Player),
    Deleted(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Loading { player_id: PlayerId },
    Ready(FormDraft),
    Submitting(FormDraft),
    Deleting(FormDraft),
    Success(SessionOutcome),
    Failed(SessionFailure),
}

impl FormState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading { .. } => "loading",
            Self::Ready(_) => "ready",
            Self::Submitting(_) => "submitting",
            Self::Deleting(_) => "deleting",
            Self::Success(_) => "success",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether a storage call is outstanding.
    pub fn is_in_flight(&self) -> bool {
        matches!(
            self,
            Self::Loading { .. } | Self::Submitting(_) | Self::Deleting(_)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success(_) | Self::Failed(_))
    }

    pub fn draft(&self) -> Option<&FormDraft> {
        match self {
            Self::Ready(draft) | Self::Submitting(draft) | Self::Deleting(draft) => Some(draft),
            _ => None,
        }
    }
}

/// User actions and storage completions fed into the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Start { target_id: Option<PlayerId> },
    Loaded(Result<Option<Player>, SessionFailure>),
    Submit(PlayerInput),
    Saved(Result<Player, SessionFailure>),
    RequestDelete,
    CancelDelete,
    ConfirmDelete,
    Removed(Result<(), SessionFailure>),
}

impl FormEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Start { .. } => "start",
            Self::Loaded(_) => "loaded",
            Self::Submit(_) => "submit",
            Self::Saved(_) => "saved",
            Self::RequestDelete => "request_delete",
            Self::CancelDelete => "cancel_delete",
            Self::ConfirmDelete => "confirm_delete",
            Self::Removed(_) => "removed",
        }
    }

    fn is_completion(&self) -> bool {
        matches!(self, Self::Loaded(_) | Self::Saved(_) | Self::Removed(_))
    }
}

/// Storage call requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    Load(PlayerId),
    Insert(PlayerInput),
    Replace { player_id: PlayerId, player: Player },
    Remove(PlayerId),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: FormState,
    pub effect: Effect,
}

impl Transition {
    fn to(state: FormState) -> Self {
        Self {
            state,
            effect: Effect::None,
        }
    }

    fn with_effect(state: FormState, effect: Effect) -> Self {
        Self { state, effect }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// A user action arrived while a storage call is outstanding.
    Busy { state: &'static str },
    /// `ConfirmDelete` without a preceding `RequestDelete`.
    DeleteNotRequested,
    NotAllowed {
        state: &'static str,
        event: &'static str,
    },
}

impl Display for TransitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy { state } => write!(f, "session is busy ({state})"),
            Self::DeleteNotRequested => write!(f, "delete must be requested before confirming"),
            Self::NotAllowed { state, event } => {
                write!(f, "event `{event}` is not allowed in state `{state}`")
            }
        }
    }
}

impl Error for TransitionError {}

/// Computes the next state and effect for `event` applied to `state`.
pub fn transition(state: &FormState, event: FormEvent) -> Result<Transition, TransitionError> {
    if state.is_in_flight() && !event.is_completion() {
        return Err(TransitionError::Busy { state: state.name() });
    }

    match (state, event) {
        (FormState::Idle, FormEvent::Start { target_id }) => {
            match target_id.filter(|id| !id.trim().is_empty()) {
                Some(player_id) => Ok(Transition::with_effect(
                    FormState::Loading {
                        player_id: player_id.clone(),
                    },
                    Effect::Load(player_id),
                )),
                None => Ok(Transition::to(FormState::Ready(FormDraft::new_record()))),
            }
        }

        (FormState::Loading { .. }, FormEvent::Loaded(result)) => Ok(Transition::to(match result {
            Ok(Some(player)) => FormState::Ready(FormDraft::editing(player)),
            // Missing target falls back to a fresh record.
            Ok(None) => FormState::Ready(FormDraft::new_record()),
            Err(failure) => FormState::Failed(failure),
        })),

        (FormState::Ready(draft), FormEvent::Submit(input)) => {
            let mut next = draft.clone();
            next.delete_requested = false;
            next.last_failure = None;

            if let Err(errors) = validate_player_input(&input) {
                next.input = input;
                next.field_errors = errors;
                return Ok(Transition::to(FormState::Ready(next)));
            }

            next.field_errors = FieldErrors::default();
            next.input = input.clone();
            let effect = match &next.mode {
                FormMode::New => Effect::Insert(input),
                FormMode::Editing { player_id } => Effect::Replace {
                    player_id: player_id.clone(),
                    player: Player::with_id(player_id.clone(), input),
                },
            };
            Ok(Transition::with_effect(FormState::Submitting(next), effect))
        }

        (FormState::Submitting(draft), FormEvent::Saved(result)) => {
            Ok(Transition::to(match (result, &draft.mode) {
                (Ok(player), FormMode::New) => FormState::Success(SessionOutcome::Created(player)),
                (Ok(player), FormMode::Editing { .. }) => {
                    FormState::Success(SessionOutcome::Updated(player))
                }
                (Err(failure), _) => FormState::Failed(failure),
            }))
        }

        (FormState::Ready(draft), FormEvent::RequestDelete) if draft.editing_id().is_some() => {
            let mut next = draft.clone();
            next.delete_requested = true;
            next.last_failure = None;
            Ok(Transition::to(FormState::Ready(next)))
        }

        (FormState::Ready(draft), FormEvent::CancelDelete) if draft.delete_requested => {
            let mut next = draft.clone();
            next.delete_requested = false;
            Ok(Transition::to(FormState::Ready(next)))
        }

        (FormState::Ready(draft), FormEvent::ConfirmDelete) => {
            let Some(player_id) = draft.editing_id() else {
                return Err(TransitionError::NotAllowed {
                    state: state.name(),
                    event: "confirm_delete",
                });
            };
            if !draft.delete_requested {
                return Err(TransitionError::DeleteNotRequested);
            }
            let effect = Effect::Remove(player_id.to_string());
            let mut next = draft.clone();
            next.delete_requested = false;
            Ok(Transition::with_effect(FormState::Deleting(next), effect))
        }

        (FormState::Deleting(draft), FormEvent::Removed(result)) => match result {
            Ok(()) => {
                let player_id = draft.editing_id().unwrap_or_default().to_string();
                Ok(Transition::to(FormState::Success(SessionOutcome::Deleted(
                    player_id,
                ))))
            }
            Err(failure) => {
                let mut next = draft.clone();
                next.last_failure = Some(failure);
                Ok(Transition::to(FormState::Ready(next)))
            }
        },

        (state, event) => Err(TransitionError::NotAllowed {
            state: state.name(),
            event: event.name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        transition, Effect, FormDraft, FormEvent, FormMode, FormState, SessionOutcome,
        TransitionError,
    };
    use crate::model::player::{Player, PlayerInput};
    use crate::session::SessionFailure;
    use crate::validation::PlayerField;

    fn valid_input() -> PlayerInput {
        PlayerInput::new("Ana", "ana@x.com", "abcdef", "abcdef")
    }

    fn stored() -> Player {
        Player::with_id("p-1", valid_input())
    }

    fn editing_ready() -> FormState {
        FormState::Ready(FormDraft::editing(stored()))
    }

    #[test]
    fn start_without_target_is_ready_new_with_no_effect() {
        let next = transition(&FormState::Idle, FormEvent::Start { target_id: None }).unwrap();
        assert_eq!(next.effect, Effect::None);
        let draft = next.state.draft().expect("ready draft");
        assert_eq!(draft.mode, FormMode::New);
        assert_eq!(draft.input, PlayerInput::default());
    }

    #[test]
    fn blank_target_id_is_treated_as_new() {
        let next = transition(
            &FormState::Idle,
            FormEvent::Start {
                target_id: Some("  ".to_string()),
            },
        )
        .unwrap();
        assert_eq!(next.state.draft().map(|d| &d.mode), Some(&FormMode::New));
    }

    #[test]
    fn start_with_target_loads_then_prefills() {
        let loading = transition(
            &FormState::Idle,
            FormEvent::Start {
                target_id: Some("p-1".to_string()),
            },
        )
        .unwrap();
        assert_eq!(loading.effect, Effect::Load("p-1".to_string()));

        let ready = transition(&loading.state, FormEvent::Loaded(Ok(Some(stored())))).unwrap();
        let draft = ready.state.draft().expect("ready draft");
        assert_eq!(draft.editing_id(), Some("p-1"));
        assert_eq!(draft.input, valid_input());
    }

    #[test]
    fn missing_target_falls_back_to_new_record() {
        let loading = FormState::Loading {
            player_id: "gone".to_string(),
        };
        let ready = transition(&loading, FormEvent::Loaded(Ok(None))).unwrap();
        let draft = ready.state.draft().expect("ready draft");
        assert_eq!(draft.mode, FormMode::New);
        assert_eq!(draft.input, PlayerInput::default());
    }

    #[test]
    fn load_failure_is_terminal() {
        let loading = FormState::Loading {
            player_id: "p-1".to_string(),
        };
        let failure = SessionFailure::Storage("disk".to_string());
        let next = transition(&loading, FormEvent::Loaded(Err(failure.clone()))).unwrap();
        assert_eq!(next.state, FormState::Failed(failure));
    }

    #[test]
    fn invalid_submit_stays_ready_with_errors_and_no_effect() {
        let ready = FormState::Ready(FormDraft::new_record());
        let input = PlayerInput {
            confirm_password: "zzzzzz".to_string(),
            ..valid_input()
        };
        let next = transition(&ready, FormEvent::Submit(input.clone())).unwrap();
        assert_eq!(next.effect, Effect::None);
        let draft = next.state.draft().expect("ready draft");
        assert!(matches!(next.state, FormState::Ready(_)));
        assert_eq!(draft.input, input);
        assert!(draft.field_errors.contains(PlayerField::ConfirmPassword));
    }

    #[test]
    fn valid_submit_in_new_mode_requests_insert() {
        let ready = FormState::Ready(FormDraft::new_record());
        let next = transition(&ready, FormEvent::Submit(valid_input())).unwrap();
        assert!(matches!(next.state, FormState::Submitting(_)));
        assert_eq!(next.effect, Effect::Insert(valid_input()));

        let created = Player::new(valid_input());
        let done = transition(&next.state, FormEvent::Saved(Ok(created.clone()))).unwrap();
        assert_eq!(done.state, FormState::Success(SessionOutcome::Created(created)));
    }

    #[test]
    fn valid_submit_in_edit_mode_requests_replace_keeping_id() {
        let input = PlayerInput {
            name: "Ana Maria".to_string(),
            ..valid_input()
        };
        let next = transition(&editing_ready(), FormEvent::Submit(input.clone())).unwrap();
        assert_eq!(
            next.effect,
            Effect::Replace {
                player_id: "p-1".to_string(),
                player: Player::with_id("p-1", input),
            }
        );
    }

    #[test]
    fn replace_not_found_fails_the_session() {
        let submitting = FormState::Submitting(FormDraft::editing(stored()));
        let failure = SessionFailure::NotFound("p-1".to_string());
        let next = transition(&submitting, FormEvent::Saved(Err(failure.clone()))).unwrap();
        assert_eq!(next.state, FormState::Failed(failure));
    }

    #[test]
    fn user_events_are_rejected_while_in_flight() {
        let submitting = FormState::Submitting(FormDraft::new_record());
        let err = transition(&submitting, FormEvent::Submit(valid_input())).unwrap_err();
        assert_eq!(err, TransitionError::Busy { state: "submitting" });
    }

    #[test]
    fn delete_requires_request_before_confirm() {
        let err = transition(&editing_ready(), FormEvent::ConfirmDelete).unwrap_err();
        assert_eq!(err, TransitionError::DeleteNotRequested);

        let requested = transition(&editing_ready(), FormEvent::RequestDelete).unwrap();
        let deleting = transition(&requested.state, FormEvent::ConfirmDelete).unwrap();
        assert!(matches!(deleting.state, FormState::Deleting(_)));
        assert_eq!(deleting.effect, Effect::Remove("p-1".to_string()));

        let done = transition(&deleting.state, FormEvent::Removed(Ok(()))).unwrap();
        assert_eq!(
            done.state,
            FormState::Success(SessionOutcome::Deleted("p-1".to_string()))
        );
    }

    #[test]
    fn cancel_clears_pending_delete() {
        let requested = transition(&editing_ready(), FormEvent::RequestDelete).unwrap();
        let cancelled = transition(&requested.state, FormEvent::CancelDelete).unwrap();
        assert!(!cancelled.state.draft().expect("draft").delete_requested);
        assert!(transition(&cancelled.state, FormEvent::ConfirmDelete).is_err());
    }

    #[test]
    fn delete_is_not_available_for_new_records() {
        let ready = FormState::Ready(FormDraft::new_record());
        let err = transition(&ready, FormEvent::RequestDelete).unwrap_err();
        assert!(matches!(err, TransitionError::NotAllowed { .. }));
    }

    #[test]
    fn failed_delete_returns_to_editing_with_failure() {
        let deleting = FormState::Deleting(FormDraft::editing(stored()));
        let failure = SessionFailure::NotFound("p-1".to_string());
        let next = transition(&deleting, FormEvent::Removed(Err(failure.clone()))).unwrap();
        let draft = next.state.draft().expect("draft");
        assert!(matches!(next.state, FormState::Ready(_)));
        assert_eq!(draft.editing_id(), Some("p-1"));
        assert_eq!(draft.last_failure, Some(failure));
    }

    #[test]
    fn terminal_states_accept_no_events() {
        let done = FormState::Failed(SessionFailure::Storage("x".to_string()));
        assert!(transition(&done, FormEvent::Submit(valid_input())).is_err());
        assert!(transition(&done, FormEvent::Start { target_id: None }).is_err());
    }
}
