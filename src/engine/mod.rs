pub mod hint;
pub mod scoring;
pub mod unlock;

pub use hint::{HintEngine, HintLevel, HintThresholds};
