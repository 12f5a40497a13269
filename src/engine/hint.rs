use serde::{Deserialize, Serialize};

use crate::engine::scoring::stars_for_attempts;

/// How much scaffolding to show. Ordered: a higher tier shows more.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HintLevel {
    None = 0,
    ShowParts = 1,
    ShowResult = 2,
    ShowAnswer = 3,
}

impl HintLevel {
    pub fn tier(self) -> u8 {
        self as u8
    }
}

/// Failed-attempt counts at which each hint tier is reached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HintThresholds {
    pub show_parts: u32,
    pub show_result: u32,
    pub show_answer: u32,
}

impl Default for HintThresholds {
    fn default() -> Self {
        Self {
            show_parts: 1,
            show_result: 2,
            show_answer: 3,
        }
    }
}

/// Attempt tracker for one problem. Active until a correct answer arrives,
/// after which it is solved for good.
#[derive(Clone, Debug)]
pub struct HintEngine {
    thresholds: HintThresholds,
    attempts: u32,
    solved: bool,
}

impl HintEngine {
    pub fn new(thresholds: HintThresholds) -> Self {
        Self::resume(thresholds, 0)
    }

    /// Continue a checkpointed session that already had `attempts` misses.
    pub fn resume(thresholds: HintThresholds, attempts: u32) -> Self {
        Self {
            thresholds,
            attempts,
            solved: false,
        }
    }

    /// Returns whether the problem is now solved. Once solved, further
    /// calls change nothing and keep returning `true`.
    pub fn register_attempt(&mut self, correct: bool) -> bool {
        if self.solved {
            return true;
        }
        if correct {
            self.solved = true;
        } else {
            self.attempts = self.attempts.saturating_add(1);
        }
        self.solved
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
        self.solved = false;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn is_solved(&self) -> bool {
        self.solved
    }

    pub fn hint_level(&self) -> HintLevel {
        let t = &self.thresholds;
        if self.attempts >= t.show_answer {
            HintLevel::ShowAnswer
        } else if self.attempts >= t.show_result {
            HintLevel::ShowResult
        } else if self.attempts >= t.show_parts {
            HintLevel::ShowParts
        } else {
            HintLevel::None
        }
    }

    /// Rating for the solve: 3 minus misses, at least 1.
    pub fn stars(&self) -> u8 {
        stars_for_attempts(self.attempts)
    }
}

impl Default for HintEngine {
    fn default() -> Self {
        Self::new(HintThresholds::default())
    }
}
