use thiserror::Error;

/// Failures a caller of the game core can act on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("unknown map: {0}")]
    UnknownMap(String),
    #[error("map {0} is locked")]
    MapLocked(String),
    #[error("level {level} is out of range for {map_id} (1..={max})")]
    LevelOutOfRange { map_id: String, level: u32, max: u32 },
    #[error("level {level} of {map_id} is locked")]
    LevelLocked { map_id: String, level: u32 },
    #[error("invalid problem config: {0}")]
    InvalidConfig(String),
    #[error("cannot read answer {0:?}")]
    InvalidAnswer(String),
    #[error("level is already solved")]
    AlreadySolved,
    #[error("malformed level key: {0:?}")]
    MalformedLevelKey(String),
    #[error("malformed stored problem: {0}")]
    MalformedProblem(String),
}
