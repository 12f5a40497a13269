use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Counting,
    Addition,
    Subtraction,
    Comparison,
}

impl Category {
    pub fn to_key(self) -> &'static str {
        match self {
            Category::Counting => "counting",
            Category::Addition => "addition",
            Category::Subtraction => "subtraction",
            Category::Comparison => "comparison",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "counting" => Some(Category::Counting),
            "addition" => Some(Category::Addition),
            "subtraction" => Some(Category::Subtraction),
            "comparison" => Some(Category::Comparison),
            _ => None,
        }
    }

    pub fn all() -> &'static [Category] {
        &[
            Category::Counting,
            Category::Addition,
            Category::Subtraction,
            Category::Comparison,
        ]
    }

    /// Smallest limit for which every random range of this category is non-empty.
    pub fn min_limit(self) -> u32 {
        match self {
            Category::Counting | Category::Comparison => 1,
            Category::Addition | Category::Subtraction => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemConfig {
    pub category: Category,
    pub limit: u32,
    #[serde(default)]
    pub advanced: bool,
}

impl ProblemConfig {
    pub fn new(category: Category, limit: u32, advanced: bool) -> Result<Self, GameError> {
        let config = Self {
            category,
            limit,
            advanced,
        };
        config.validate()?;
        Ok(config)
    }

    /// Largest answer a problem from this config can have. Comparisons are
    /// answered with a single symbol and count as 0.
    pub fn largest_answer(&self) -> u32 {
        match self.category {
            Category::Counting | Category::Addition => self.limit,
            Category::Subtraction => self.limit.saturating_sub(1),
            Category::Comparison => 0,
        }
    }

    /// Keypad characters needed for the largest answer.
    pub fn answer_digits(&self) -> usize {
        self.largest_answer()
            .checked_ilog10()
            .map_or(1, |log| log as usize + 1)
    }

    pub fn validate(&self) -> Result<(), GameError> {
        let min = self.category.min_limit();
        if self.limit < min {
            return Err(GameError::InvalidConfig(format!(
                "{} needs a limit of at least {min}, got {}",
                self.category.to_key(),
                self.limit
            )));
        }
        Ok(())
    }
}

/// Outcome code of a comparison problem. Stored as 1/2/3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum ComparisonResult {
    Greater,
    Less,
    Equal,
}

impl ComparisonResult {
    pub fn of(a: u32, b: u32) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Greater => ComparisonResult::Greater,
            std::cmp::Ordering::Less => ComparisonResult::Less,
            std::cmp::Ordering::Equal => ComparisonResult::Equal,
        }
    }

    pub fn code(self) -> u32 {
        match self {
            ComparisonResult::Greater => 1,
            ComparisonResult::Less => 2,
            ComparisonResult::Equal => 3,
        }
    }

    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(ComparisonResult::Greater),
            2 => Some(ComparisonResult::Less),
            3 => Some(ComparisonResult::Equal),
            _ => None,
        }
    }

    pub fn symbol(self) -> char {
        match self {
            ComparisonResult::Greater => '>',
            ComparisonResult::Less => '<',
            ComparisonResult::Equal => '=',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '>' => Some(ComparisonResult::Greater),
            '<' => Some(ComparisonResult::Less),
            '=' => Some(ComparisonResult::Equal),
            _ => None,
        }
    }
}

impl From<ComparisonResult> for u32 {
    fn from(result: ComparisonResult) -> Self {
        result.code()
    }
}

impl TryFrom<u32> for ComparisonResult {
    type Error = GameError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        ComparisonResult::from_code(code)
            .ok_or_else(|| GameError::MalformedProblem(format!("comparison code {code}")))
    }
}

/// What the player may submit for a problem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Answer {
    Number(u32),
    Compare(ComparisonResult),
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Answer::Number(n) => write!(f, "{n}"),
            Answer::Compare(c) => write!(f, "{}", c.symbol()),
        }
    }
}

/// A concrete problem. Each variant carries only the operands it needs;
/// the correct result is derived, never stored separately in memory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "ProblemRecord", try_from = "ProblemRecord")]
pub enum GeneratedProblem {
    Counting { count: u32 },
    Addition { a: u32, b: u32 },
    /// Invariant: `a >= b`.
    Subtraction { a: u32, b: u32 },
    Comparison { a: u32, b: u32 },
}

impl GeneratedProblem {
    /// Problem handed out when a category cannot be resolved.
    pub fn fallback() -> Self {
        GeneratedProblem::Counting { count: 1 }
    }

    pub fn category(&self) -> Category {
        match self {
            GeneratedProblem::Counting { .. } => Category::Counting,
            GeneratedProblem::Addition { .. } => Category::Addition,
            GeneratedProblem::Subtraction { .. } => Category::Subtraction,
            GeneratedProblem::Comparison { .. } => Category::Comparison,
        }
    }

    pub fn operand_a(&self) -> u32 {
        match *self {
            GeneratedProblem::Counting { count } => count,
            GeneratedProblem::Addition { a, .. }
            | GeneratedProblem::Subtraction { a, .. }
            | GeneratedProblem::Comparison { a, .. } => a,
        }
    }

    pub fn operand_b(&self) -> Option<u32> {
        match *self {
            GeneratedProblem::Counting { .. } => None,
            GeneratedProblem::Addition { b, .. }
            | GeneratedProblem::Subtraction { b, .. }
            | GeneratedProblem::Comparison { b, .. } => Some(b),
        }
    }

    /// Numeric result; for comparisons this is the 1/2/3 outcome code.
    pub fn correct_result(&self) -> u32 {
        match self.expected_answer() {
            Answer::Number(n) => n,
            Answer::Compare(c) => c.code(),
        }
    }

    pub fn expected_answer(&self) -> Answer {
        match *self {
            GeneratedProblem::Counting { count } => Answer::Number(count),
            GeneratedProblem::Addition { a, b } => Answer::Number(a.saturating_add(b)),
            GeneratedProblem::Subtraction { a, b } => Answer::Number(a.saturating_sub(b)),
            GeneratedProblem::Comparison { a, b } => Answer::Compare(ComparisonResult::of(a, b)),
        }
    }

    /// `None` when the answer is of the wrong kind for this problem.
    pub fn check(&self, answer: Answer) -> Option<bool> {
        match (self.expected_answer(), answer) {
            (Answer::Number(expected), Answer::Number(given)) => Some(expected == given),
            (Answer::Compare(expected), Answer::Compare(given)) => Some(expected == given),
            _ => None,
        }
    }
}

impl fmt::Display for GeneratedProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            GeneratedProblem::Counting { .. } => write!(f, "How many?"),
            GeneratedProblem::Addition { a, b } => write!(f, "{a} + {b} = ?"),
            GeneratedProblem::Subtraction { a, b } => write!(f, "{a} - {b} = ?"),
            GeneratedProblem::Comparison { a, b } => write!(f, "{a} ? {b}"),
        }
    }
}

/// Stored shape of a problem: `{"type", "valA", "valB"?, "result"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    #[serde(rename = "type")]
    pub category: Category,
    #[serde(rename = "valA")]
    pub val_a: u32,
    #[serde(rename = "valB", default, skip_serializing_if = "Option::is_none")]
    pub val_b: Option<u32>,
    pub result: u32,
}

impl From<GeneratedProblem> for ProblemRecord {
    fn from(problem: GeneratedProblem) -> Self {
        Self {
            category: problem.category(),
            val_a: problem.operand_a(),
            val_b: problem.operand_b(),
            result: problem.correct_result(),
        }
    }
}

impl TryFrom<ProblemRecord> for GeneratedProblem {
    type Error = GameError;

    fn try_from(record: ProblemRecord) -> Result<Self, Self::Error> {
        let a = record.val_a;
        let problem = match (record.category, record.val_b) {
            (Category::Counting, _) => GeneratedProblem::Counting { count: a },
            (Category::Addition, Some(b)) => GeneratedProblem::Addition { a, b },
            (Category::Subtraction, Some(b)) if b <= a => GeneratedProblem::Subtraction { a, b },
            (Category::Subtraction, Some(b)) => {
                return Err(GameError::MalformedProblem(format!(
                    "subtraction {a} - {b} would go negative"
                )));
            }
            (Category::Comparison, Some(b)) => GeneratedProblem::Comparison { a, b },
            (category, None) => {
                return Err(GameError::MalformedProblem(format!(
                    "{} problem without valB",
                    category.to_key()
                )));
            }
        };
        if problem.correct_result() != record.result {
            return Err(GameError::MalformedProblem(format!(
                "stored result {} does not match {problem}",
                record.result
            )));
        }
        Ok(problem)
    }
}
