pub mod input;
pub mod level;
pub mod result;

pub use input::{AnswerInput, parse_answer};
pub use level::{LevelSession, SubmitOutcome};
pub use result::LevelResult;
