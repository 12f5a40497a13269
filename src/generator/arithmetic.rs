use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::trace;

use crate::generator::ProblemGenerator;
use crate::generator::difficulty::effective_limit;
use crate::generator::problem::{Category, GeneratedProblem, ProblemConfig};

/// Comparisons past this level may be pulled toward close calls.
const CLOSE_CALL_MIN_LEVEL: u32 = 5;
const CLOSE_CALL_PROBABILITY: f64 = 0.6;

/// Generate one problem for `level` (1-based) of a map using `config`.
pub fn generate_problem<R: Rng>(
    config: &ProblemConfig,
    level: u32,
    rng: &mut R,
) -> GeneratedProblem {
    // Degenerate limits (tiny advanced maps) would leave an empty range.
    let limit = effective_limit(config, level).max(config.category.min_limit());

    let problem = match config.category {
        Category::Counting => GeneratedProblem::Counting {
            count: rng.gen_range(1..=limit),
        },
        Category::Addition => {
            let a = rng.gen_range(1..=limit - 1);
            let b = rng.gen_range(1..=limit - a);
            GeneratedProblem::Addition { a, b }
        }
        Category::Subtraction => {
            let a = rng.gen_range(2..=limit);
            let b = rng.gen_range(1..=a);
            GeneratedProblem::Subtraction { a, b }
        }
        Category::Comparison => {
            let a = rng.gen_range(1..=limit);
            let mut b = rng.gen_range(1..=limit);
            if level >= CLOSE_CALL_MIN_LEVEL && rng.gen_bool(CLOSE_CALL_PROBABILITY) {
                b = match rng.gen_range(0..3) {
                    0 => a.saturating_sub(1).max(1),
                    1 => a,
                    _ => a.saturating_add(1),
                };
            }
            GeneratedProblem::Comparison { a, b }
        }
    };

    trace!(
        category = config.category.to_key(),
        level,
        limit,
        %problem,
        "generated problem"
    );
    problem
}

/// Default generator backed by a small, fast RNG.
pub struct RandomGenerator {
    rng: SmallRng,
}

impl RandomGenerator {
    pub fn new() -> Self {
        Self {
            rng: SmallRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ProblemGenerator for RandomGenerator {
    fn generate(&mut self, config: &ProblemConfig, level: u32) -> GeneratedProblem {
        generate_problem(config, level, &mut self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(category: Category, limit: u32, advanced: bool) -> ProblemConfig {
        ProblemConfig {
            category,
            limit,
            advanced,
        }
    }

    #[test]
    fn test_counting_within_limit() {
        let mut rng = SmallRng::seed_from_u64(42);
        let c = config(Category::Counting, 10, false);
        for _ in 0..200 {
            match generate_problem(&c, 2, &mut rng) {
                GeneratedProblem::Counting { count } => assert!((1..=5).contains(&count)),
                other => panic!("expected counting, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_first_addition_level_stays_under_five() {
        let mut rng = SmallRng::seed_from_u64(7);
        let c = config(Category::Addition, 10, false);
        for _ in 0..500 {
            let problem = generate_problem(&c, 1, &mut rng);
            let GeneratedProblem::Addition { a, b } = problem else {
                panic!("expected addition, got {problem:?}");
            };
            assert!((1..=4).contains(&a), "a = {a}");
            assert!(b >= 1 && b <= 5 - a, "b = {b} with a = {a}");
            assert!(problem.correct_result() <= 5);
        }
    }

    #[test]
    fn test_subtraction_never_negative() {
        let mut rng = SmallRng::seed_from_u64(3);
        let c = config(Category::Subtraction, 20, true);
        let mut saw_zero = false;
        for level in 1..=12 {
            for _ in 0..100 {
                let problem = generate_problem(&c, level, &mut rng);
                let GeneratedProblem::Subtraction { a, b } = problem else {
                    panic!("expected subtraction, got {problem:?}");
                };
                assert!(a >= 2 && b >= 1 && b <= a);
                saw_zero |= problem.correct_result() == 0;
            }
        }
        assert!(saw_zero, "b may equal a, so a zero result should appear");
    }

    #[test]
    fn test_late_comparisons_lean_close() {
        let mut rng = SmallRng::seed_from_u64(11);
        let c = config(Category::Comparison, 20, true);
        let close = (0..1000)
            .filter(|_| {
                let GeneratedProblem::Comparison { a, b } = generate_problem(&c, 9, &mut rng)
                else {
                    return false;
                };
                a.abs_diff(b) <= 1
            })
            .count();
        // Roughly 60% nudged plus the ~15% that land close by chance.
        assert!(close > 550, "only {close} close calls out of 1000");
    }

    #[test]
    fn test_early_comparisons_not_nudged() {
        let mut rng = SmallRng::seed_from_u64(11);
        let c = config(Category::Comparison, 20, true);
        let close = (0..1000)
            .filter(|_| {
                let problem = generate_problem(&c, 4, &mut rng);
                problem.operand_a().abs_diff(problem.operand_b().unwrap_or(0)) <= 1
            })
            .count();
        assert!(close < 400, "{close} close calls out of 1000 at level 4");
    }

    #[test]
    fn test_tiny_advanced_limit_still_generates() {
        let mut rng = SmallRng::seed_from_u64(1);
        let c = config(Category::Addition, 2, true);
        let problem = generate_problem(&c, 1, &mut rng);
        assert_eq!(problem, GeneratedProblem::Addition { a: 1, b: 1 });
    }

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let c = config(Category::Addition, 20, true);
        let mut first = RandomGenerator::seeded(99);
        let mut second = RandomGenerator::seeded(99);
        for level in 1..=10 {
            assert_eq!(first.generate(&c, level), second.generate(&c, level));
        }
    }

    #[test]
    fn test_close_calls_stay_positive_at_the_top_of_the_range() {
        let mut rng = SmallRng::seed_from_u64(11);
        let c = config(Category::Comparison, u32::MAX, true);
        for _ in 0..500 {
            let problem = generate_problem(&c, 9, &mut rng);
            let GeneratedProblem::Comparison { a, b } = problem else {
                panic!("expected comparison, got {problem:?}");
            };
            assert!(a >= 1 && b >= 1, "{a} ? {b}");
        }
    }

    #[test]
    fn test_close_call_near_one_never_reaches_zero() {
        let mut rng = SmallRng::seed_from_u64(5);
        let c = config(Category::Comparison, 1, false);
        for level in 5..12 {
            for _ in 0..100 {
                let problem = generate_problem(&c, level, &mut rng);
                let GeneratedProblem::Comparison { a, b } = problem else {
                    panic!("expected comparison, got {problem:?}");
                };
                assert_eq!(a, 1);
                assert!((1..=2).contains(&b), "b = {b}");
            }
        }
    }
}
