pub mod arithmetic;
pub mod difficulty;
pub mod problem;

pub use arithmetic::{RandomGenerator, generate_problem};
pub use problem::{Answer, Category, ComparisonResult, GeneratedProblem, ProblemConfig};

pub trait ProblemGenerator {
    fn generate(&mut self, config: &ProblemConfig, level: u32) -> GeneratedProblem;
}
