//! Game core for an arithmetic map game: problem generation scaled by
//! level, hint escalation with star scoring, and persisted progress with
//! map unlocking on mastery.

pub mod catalog;
pub mod config;
pub mod engine;
pub mod error;
pub mod generator;
pub mod session;
pub mod store;

pub use error::GameError;
