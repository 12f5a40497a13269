use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::engine::scoring::MAX_STARS;
use crate::engine::unlock;
use crate::store::schema::{
    ActiveSession, DEFAULT_FIRST_MAP, LevelKey, LevelProgress, MapState,
};

/// Where the store writes its document after each change.
pub trait Persistence {
    fn persist(&mut self, state: &MapState) -> Result<()>;
}

/// Keeps state in memory only.
#[derive(Clone, Copy, Debug, Default)]
pub struct Ephemeral;

impl Persistence for Ephemeral {
    fn persist(&mut self, _state: &MapState) -> Result<()> {
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreEvent {
    LevelCompleted { key: LevelKey, best_stars: u8 },
    MapUnlocked(String),
    SessionSaved(LevelKey),
    SessionCleared(LevelKey),
    CurrentMapChanged(String),
    ProgressReset,
}

/// Sole owner of the progress document. Every mutation is persisted and
/// announced to subscribers before the call returns.
pub struct ProgressStore {
    state: MapState,
    map_order: Vec<String>,
    levels_per_map: u32,
    persistence: Box<dyn Persistence>,
    subscribers: Vec<Sender<StoreEvent>>,
}

impl ProgressStore {
    pub fn new(
        state: MapState,
        map_order: Vec<String>,
        levels_per_map: u32,
        persistence: Box<dyn Persistence>,
    ) -> Self {
        Self {
            state,
            map_order,
            levels_per_map,
            persistence,
            subscribers: Vec::new(),
        }
    }

    /// In-memory store starting from the default document.
    pub fn ephemeral(map_order: Vec<String>, levels_per_map: u32) -> Self {
        let state = MapState::new(map_order.first().map_or(DEFAULT_FIRST_MAP, String::as_str));
        Self::new(state, map_order, levels_per_map, Box::new(Ephemeral))
    }

    pub fn state(&self) -> &MapState {
        &self.state
    }

    pub fn map_order(&self) -> &[String] {
        &self.map_order
    }

    pub fn levels_per_map(&self) -> u32 {
        self.levels_per_map
    }

    pub fn first_map(&self) -> &str {
        self.map_order
            .first()
            .map_or(DEFAULT_FIRST_MAP, String::as_str)
    }

    pub fn session(&self, key: &LevelKey) -> Option<&ActiveSession> {
        self.state.session(key)
    }

    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    /// Record a solve. Stored stars only ever go up. Afterwards, if the
    /// *current* map has every level at full stars, the map after it is
    /// unlocked; its id is returned when that unlock is new.
    ///
    /// The mastery check looks at the current map, not necessarily the map
    /// that owns `key`.
    pub fn complete_level(&mut self, key: &LevelKey, stars: u8) -> Option<String> {
        let stars = stars.min(MAX_STARS);
        let entry = self.state.levels.entry(key.clone()).or_default();
        let best_stars = entry.best_stars.max(stars);
        *entry = LevelProgress {
            best_stars,
            completed: true,
        };
        info!(level = %key, stars, best_stars, "level completed");
        let mut events = vec![StoreEvent::LevelCompleted {
            key: key.clone(),
            best_stars,
        }];

        let current = self.state.current_map_id.clone();
        let mut unlocked = None;
        if unlock::is_map_mastered(&self.state, &current, self.levels_per_map)
            && let Some(next) = unlock::next_map(&self.map_order, &current).map(str::to_string)
            && self.insert_unlocked(&next)
        {
            info!(map = %current, unlocked = %next, "map mastered");
            events.push(StoreEvent::MapUnlocked(next.clone()));
            unlocked = Some(next);
        }

        self.commit(events);
        unlocked
    }

    pub fn save_session(&mut self, key: &LevelKey, session: ActiveSession) {
        debug!(level = %key, attempts = session.attempts, "session checkpoint");
        self.state.active_sessions.insert(key.clone(), session);
        self.commit(vec![StoreEvent::SessionSaved(key.clone())]);
    }

    pub fn clear_session(&mut self, key: &LevelKey) {
        if self.state.active_sessions.remove(key).is_some() {
            debug!(level = %key, "session cleared");
            self.commit(vec![StoreEvent::SessionCleared(key.clone())]);
        }
    }

    /// Returns `true` if the map was not unlocked before.
    pub fn unlock_map(&mut self, map_id: &str) -> bool {
        let added = self.insert_unlocked(map_id);
        if added {
            self.commit(vec![StoreEvent::MapUnlocked(map_id.to_string())]);
        }
        added
    }

    pub fn set_current_map(&mut self, map_id: &str) {
        if self.state.current_map_id == map_id {
            return;
        }
        self.state.current_map_id = map_id.to_string();
        self.commit(vec![StoreEvent::CurrentMapChanged(map_id.to_string())]);
    }

    pub fn reset_progress(&mut self) {
        info!("progress reset");
        self.state = MapState::new(self.first_map());
        self.commit(vec![StoreEvent::ProgressReset]);
    }

    /// Swap in a whole document, e.g. after an import.
    pub fn replace_state(&mut self, state: MapState) {
        self.state = state;
        self.commit(vec![StoreEvent::ProgressReset]);
    }

    fn insert_unlocked(&mut self, map_id: &str) -> bool {
        if self.state.is_map_unlocked(map_id) {
            return false;
        }
        self.state.unlocked_maps.push(map_id.to_string());
        true
    }

    fn commit(&mut self, events: Vec<StoreEvent>) {
        if let Err(e) = self.persistence.persist(&self.state) {
            warn!("failed to save progress: {e:#}");
        }
        self.subscribers
            .retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }
}
