use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::engine::scoring::MAX_STARS;
use crate::error::GameError;
use crate::generator::GeneratedProblem;

pub const SCHEMA_VERSION: u32 = 1;
pub const DEFAULT_FIRST_MAP: &str = "map1";

const LEVEL_SEPARATOR: &str = "_level";

/// Identifies one level of one map. Stored as `"{map_id}_level{n}"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct LevelKey {
    pub map_id: String,
    pub level: u32,
}

impl LevelKey {
    pub fn new(map_id: impl Into<String>, level: u32) -> Self {
        Self {
            map_id: map_id.into(),
            level,
        }
    }
}

impl fmt::Display for LevelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{LEVEL_SEPARATOR}{}", self.map_id, self.level)
    }
}

impl FromStr for LevelKey {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GameError::MalformedLevelKey(s.to_string());
        let (map_id, level) = s.rsplit_once(LEVEL_SEPARATOR).ok_or_else(malformed)?;
        if map_id.is_empty() {
            return Err(malformed());
        }
        let level = level.parse().map_err(|_| malformed())?;
        Ok(Self::new(map_id, level))
    }
}

impl From<LevelKey> for String {
    fn from(key: LevelKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for LevelKey {
    type Error = GameError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    #[serde(rename = "stars")]
    pub best_stars: u8,
    pub completed: bool,
}

/// Checkpoint of a level that was entered but not yet solved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveSession {
    pub problem: GeneratedProblem,
    pub attempts: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
}

impl ActiveSession {
    pub fn new(problem: GeneratedProblem) -> Self {
        Self {
            problem,
            attempts: 0,
            started_at: Some(Utc::now()),
        }
    }
}

/// The persisted progress document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapState {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub current_map_id: String,
    pub unlocked_maps: Vec<String>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub levels: BTreeMap<LevelKey, LevelProgress>,
    #[serde(default, deserialize_with = "lenient_entries")]
    pub active_sessions: BTreeMap<LevelKey, ActiveSession>,
}

/// Per-level map that keeps every entry that parses. A bad key or value is
/// dropped with a warning instead of failing the whole document.
fn lenient_entries<'de, D, V>(deserializer: D) -> Result<BTreeMap<LevelKey, V>, D::Error>
where
    D: Deserializer<'de>,
    V: DeserializeOwned,
{
    let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
    let mut entries = BTreeMap::new();
    for (key, value) in raw {
        let parsed = key.parse::<LevelKey>().map_err(|e| e.to_string()).and_then(|level_key| {
            serde_json::from_value::<V>(value)
                .map(|entry| (level_key, entry))
                .map_err(|e| e.to_string())
        });
        match parsed {
            Ok((level_key, entry)) => {
                entries.insert(level_key, entry);
            }
            Err(e) => warn!(entry = %key, "dropping unreadable progress entry: {e}"),
        }
    }
    Ok(entries)
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

impl Default for MapState {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_MAP)
    }
}

impl MapState {
    /// Fresh progress: only `first_map` unlocked and selected.
    pub fn new(first_map: &str) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            current_map_id: first_map.to_string(),
            unlocked_maps: vec![first_map.to_string()],
            levels: BTreeMap::new(),
            active_sessions: BTreeMap::new(),
        }
    }

    /// Documents written by a newer release are not understood.
    pub fn needs_reset(&self) -> bool {
        self.schema_version > SCHEMA_VERSION
    }

    pub fn level(&self, key: &LevelKey) -> Option<&LevelProgress> {
        self.levels.get(key)
    }

    /// Missing progress counts as zero stars.
    pub fn best_stars(&self, key: &LevelKey) -> u8 {
        self.levels
            .get(key)
            .map(|p| p.best_stars.min(MAX_STARS))
            .unwrap_or(0)
    }

    pub fn is_completed(&self, key: &LevelKey) -> bool {
        self.levels.get(key).is_some_and(|p| p.completed)
    }

    pub fn is_map_unlocked(&self, map_id: &str) -> bool {
        self.unlocked_maps.iter().any(|m| m == map_id)
    }

    pub fn session(&self, key: &LevelKey) -> Option<&ActiveSession> {
        self.active_sessions.get(key)
    }
}

pub const EXPORT_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportData {
    pub mathmaps_export_version: u32,
    pub exported_at: DateTime<Utc>,
    pub state: MapState,
}

/// What may be found on disk: a bare document, or one inside a versioned
/// envelope (`{"state": ..., "version": n}`).
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum StoredDocument {
    Wrapped {
        state: MapState,
        #[allow(dead_code)]
        version: u32,
    },
    Bare(MapState),
}

impl StoredDocument {
    pub(crate) fn into_state(self) -> MapState {
        match self {
            StoredDocument::Wrapped { state, .. } | StoredDocument::Bare(state) => state,
        }
    }
}
