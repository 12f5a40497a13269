use crate::error::GameError;
use crate::generator::{Answer, Category, ComparisonResult};

/// Keypad buffer for one problem.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AnswerInput {
    buffer: String,
    max_digits: usize,
}

impl AnswerInput {
    pub fn new(max_digits: usize) -> Self {
        Self {
            buffer: String::new(),
            max_digits,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append a digit. A lone `0` is replaced rather than extended; input
    /// beyond the digit cap is ignored.
    pub fn push_digit(&mut self, digit: u8) {
        if digit > 9 {
            return;
        }
        let ch = char::from(b'0' + digit);
        if self.buffer == "0" || self.is_symbol() {
            self.buffer.clear();
        }
        if self.buffer.len() < self.max_digits {
            self.buffer.push(ch);
        }
    }

    /// Comparison keypad: one symbol replaces whatever was typed.
    pub fn choose(&mut self, result: ComparisonResult) {
        self.buffer.clear();
        self.buffer.push(result.symbol());
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Read the buffer as an answer for a problem of `category`.
    pub fn answer(&self, category: Category) -> Result<Answer, GameError> {
        parse_answer(&self.buffer, category)
    }

    fn is_symbol(&self) -> bool {
        self.buffer
            .chars()
            .next()
            .is_some_and(|c| ComparisonResult::from_symbol(c).is_some())
    }
}

/// Parse free text (`"7"`, `">"`) as an answer for `category`.
pub fn parse_answer(text: &str, category: Category) -> Result<Answer, GameError> {
    let text = text.trim();
    let invalid = || GameError::InvalidAnswer(text.to_string());
    match category {
        Category::Comparison => {
            let mut chars = text.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => ComparisonResult::from_symbol(c)
                    .map(Answer::Compare)
                    .ok_or_else(invalid),
                _ => Err(invalid()),
            }
        }
        Category::Counting | Category::Addition | Category::Subtraction => {
            if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid());
            }
            text.parse().map(Answer::Number).map_err(|_| invalid())
        }
    }
}
