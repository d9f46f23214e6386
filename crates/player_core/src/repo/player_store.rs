//! Player collection store.
//!
//! # Responsibility
//! - Serialize the player collection as one JSON array under one storage key.
//! - Provide list/find/insert/replace/remove over that collection.
//!
//! # Invariants
//! - Ids are unique within a persisted collection; reads reject blobs that
//!   break this instead of masking it.
//! - An absent key reads as an empty collection.
//! - Mutations are read-modify-write of the full blob with no locking. Two
//!   independent writers racing on the same key lose the earlier write.
//! - `replace` removes the old entry and appends the new one, so an edited
//!   record moves to the end of the collection.

use crate::model::player::{Player, PlayerId, PlayerInput};
use crate::storage::{KeyValueStore, StorageError};
use log::{info, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Storage key the mobile app has always written players under.
pub const DEFAULT_PLAYERS_KEY: &str = "@hookForm:cadastro";

pub type StoreResult<T> = Result<T, StoreError>;

/// Error for player collection reads and mutations.
#[derive(Debug)]
pub enum StoreError {
    Storage(StorageError),
    Serialization(serde_json::Error),
    InvalidData(String),
    NotFound(PlayerId),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "player collection serialization failed: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted player data: {message}"),
            Self::NotFound(id) => write!(f, "player not found: {id}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::InvalidData(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Store for the player collection; clones share the same medium.
pub struct PlayerStore<S: KeyValueStore> {
    medium: Arc<S>,
    key: Arc<str>,
}

impl<S: KeyValueStore> Clone for PlayerStore<S> {
    fn clone(&self) -> Self {
        Self {
            medium: Arc::clone(&self.medium),
            key: Arc::clone(&self.key),
        }
    }
}

impl<S: KeyValueStore> PlayerStore<S> {
    /// Creates a store persisting under `DEFAULT_PLAYERS_KEY`.
    pub fn new(medium: S) -> Self {
        Self::with_key(medium, DEFAULT_PLAYERS_KEY)
    }

    /// Creates a store persisting under a custom key.
    pub fn with_key(medium: S, key: impl Into<String>) -> Self {
        Self::from_shared(Arc::new(medium), key)
    }

    /// Creates a store over a medium shared with other owners.
    pub fn from_shared(medium: Arc<S>, key: impl Into<String>) -> Self {
        let key: String = key.into();
        Self {
            medium,
            key: Arc::from(key),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Reads the full collection in storage order.
    ///
    /// The returned vector is an owned copy; changing it does not touch
    /// storage until passed back through a mutation.
    pub async fn list(&self) -> StoreResult<Vec<Player>> {
        let Some(raw) = self.medium.get(&self.key).await? else {
            return Ok(Vec::new());
        };

        let players: Vec<Player> = serde_json::from_str(&raw)?;
        ensure_unique_ids(&players)?;
        Ok(players)
    }

    /// Returns the number of stored players.
    pub async fn len(&self) -> StoreResult<usize> {
        Ok(self.list().await?.len())
    }

    /// Finds a player by id with a linear scan.
    pub async fn find_by_id(&self, id: &str) -> StoreResult<Option<Player>> {
        Ok(self.list().await?.into_iter().find(|player| player.id == id))
    }

    /// Appends a new player with a freshly generated id and persists.
    pub async fn insert(&self, input: PlayerInput) -> StoreResult<Player> {
        let mut players = self.list().await?;
        let player = Player::new(input);
        players.push(player.clone());
        self.persist(&players).await?;

        info!(
            "event=player_insert module=store status=ok player_id={} player_count={}",
            player.id,
            players.len()
        );
        Ok(player)
    }

    /// Removes the entry with `id` and appends `player` as given.
    ///
    /// `player.id` is kept verbatim; callers that want stable identity pass
    /// the same id.
    pub async fn replace(&self, id: &str, player: Player) -> StoreResult<Player> {
        let mut players = self.list().await?;
        let Some(index) = position_of(&players, id) else {
            warn!("event=player_replace module=store status=not_found player_id={id}");
            return Err(StoreError::NotFound(id.to_string()));
        };

        players.remove(index);
        if player.id != id && position_of(&players, &player.id).is_some() {
            return Err(StoreError::InvalidData(format!(
                "replacement id `{}` already belongs to another player",
                player.id
            )));
        }
        players.push(player.clone());
        self.persist(&players).await?;

        info!(
            "event=player_replace module=store status=ok player_id={id} new_player_id={} player_count={}",
            player.id,
            players.len()
        );
        Ok(player)
    }

    /// Removes the entry with `id` and persists the remainder.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        let mut players = self.list().await?;
        let Some(index) = position_of(&players, id) else {
            warn!("event=player_remove module=store status=not_found player_id={id}");
            return Err(StoreError::NotFound(id.to_string()));
        };

        players.remove(index);
        self.persist(&players).await?;

        info!(
            "event=player_remove module=store status=ok player_id={id} player_count={}",
            players.len()
        );
        Ok(())
    }

    async fn persist(&self, players: &[Player]) -> StoreResult<()> {
        let raw = serde_json::to_string(players)?;
        self.medium.set(&self.key, raw).await?;
        Ok(())
    }
}

fn position_of(players: &[Player], id: &str) -> Option<usize> {
    players.iter().position(|player| player.id == id)
}

fn ensure_unique_ids(players: &[Player]) -> StoreResult<()> {
    let mut seen = HashSet::with_capacity(players.len());
    for player in players {
        if !seen.insert(player.id.as_str()) {
            return Err(StoreError::InvalidData(format!(
                "duplicate player id `{}` in collection",
                player.id
            )));
        }
    }
    Ok(())
}
