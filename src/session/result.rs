use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a solved level, handed back to the front end.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelResult {
    pub map_id: String,
    pub level: u32,
    pub stars: u8,
    /// Best stars ever recorded for the level, including this solve.
    pub best_stars: u8,
    pub failed_attempts: u32,
    /// Map unlocked by this solve, if it completed a mastery.
    pub unlocked_map: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl LevelResult {
    pub fn is_perfect(&self) -> bool {
        self.failed_attempts == 0
    }
}
