use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use mathmaps::engine::HintEngine;
use mathmaps::engine::scoring::stars_for_attempts;
use mathmaps::generator::difficulty::effective_limit;
use mathmaps::generator::{
    Category, ComparisonResult, GeneratedProblem, ProblemConfig, generate_problem,
};

fn config(category: Category, limit: u32, advanced: bool) -> ProblemConfig {
    ProblemConfig {
        category,
        limit,
        advanced,
    }
}

// =============================================================================
// Difficulty envelope
// =============================================================================

proptest! {
    /// Early standard levels: max(5, floor(L/2)) clamped to L.
    #[test]
    fn prop_early_standard_limit(limit in 2u32..500, level in 1u32..=3) {
        let c = config(Category::Addition, limit, false);
        prop_assert_eq!(effective_limit(&c, level), (limit / 2).max(5).min(limit));
    }

    /// The envelope never exceeds the configured limit.
    #[test]
    fn prop_effective_limit_bounded(limit in 1u32..10_000, level in 1u32..30, advanced: bool) {
        let c = config(Category::Counting, limit, advanced);
        prop_assert!(effective_limit(&c, level) <= limit);
    }

    /// From level 8 on the full limit applies.
    #[test]
    fn prop_late_levels_use_full_limit(limit in 1u32..10_000, level in 8u32..100, advanced: bool) {
        let c = config(Category::Comparison, limit, advanced);
        prop_assert_eq!(effective_limit(&c, level), limit);
    }
}

// =============================================================================
// Generated problems
// =============================================================================

proptest! {
    #[test]
    fn prop_addition_within_envelope(
        seed: u64,
        limit in 2u32..200,
        level in 1u32..15,
        advanced: bool
    ) {
        let c = config(Category::Addition, limit, advanced);
        let mut rng = SmallRng::seed_from_u64(seed);
        let envelope = effective_limit(&c, level).max(2);
        let GeneratedProblem::Addition { a, b } = generate_problem(&c, level, &mut rng) else {
            return Err(TestCaseError::fail("expected an addition problem"));
        };
        prop_assert!(a >= 1 && b >= 1);
        prop_assert!(a + b <= envelope, "{} + {} > {}", a, b, envelope);
    }

    #[test]
    fn prop_subtraction_never_negative(
        seed: u64,
        limit in 2u32..200,
        level in 1u32..15,
        advanced: bool
    ) {
        let c = config(Category::Subtraction, limit, advanced);
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = generate_problem(&c, level, &mut rng);
        let GeneratedProblem::Subtraction { a, b } = problem else {
            return Err(TestCaseError::fail("expected a subtraction problem"));
        };
        prop_assert!(a >= 2);
        prop_assert!(b >= 1 && b <= a);
        prop_assert_eq!(problem.correct_result(), a - b);
    }

    #[test]
    fn prop_counting_result_is_count(seed: u64, limit in 1u32..200, level in 1u32..15) {
        let c = config(Category::Counting, limit, false);
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = generate_problem(&c, level, &mut rng);
        prop_assert!(problem.operand_b().is_none());
        prop_assert!(problem.operand_a() >= 1);
        prop_assert!(problem.operand_a() <= effective_limit(&c, level).max(1));
        prop_assert_eq!(problem.correct_result(), problem.operand_a());
    }

    #[test]
    fn prop_comparison_operands_positive(seed: u64, limit in 1u32..200, level in 1u32..15) {
        let c = config(Category::Comparison, limit, true);
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = generate_problem(&c, level, &mut rng);
        prop_assert!(problem.operand_a() >= 1);
        prop_assert!(problem.operand_b().is_some_and(|b| b >= 1));
    }

    /// Exactly one outcome holds for any pair.
    #[test]
    fn prop_comparison_outcome_exclusive(a: u32, b: u32) {
        let result = ComparisonResult::of(a, b);
        prop_assert_eq!(result == ComparisonResult::Greater, a > b);
        prop_assert_eq!(result == ComparisonResult::Less, a < b);
        prop_assert_eq!(result == ComparisonResult::Equal, a == b);
    }

    /// Level 1 of the standard addition map: a in [1,4], sum at most 5.
    #[test]
    fn prop_first_addition_level(seed: u64) {
        let c = config(Category::Addition, 10, false);
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = generate_problem(&c, 1, &mut rng);
        let GeneratedProblem::Addition { a, b } = problem else {
            return Err(TestCaseError::fail("expected an addition problem"));
        };
        prop_assert!((1..=4).contains(&a));
        prop_assert!(b >= 1 && b <= 5 - a);
        prop_assert!(problem.correct_result() <= 5);
    }
}

// =============================================================================
// Star scoring
// =============================================================================

proptest! {
    /// n misses then a hit gives max(1, 3 - n) stars.
    #[test]
    fn prop_stars_after_misses(misses in 0u32..20) {
        let mut engine = HintEngine::default();
        for _ in 0..misses {
            prop_assert!(!engine.register_attempt(false));
        }
        prop_assert!(engine.register_attempt(true));
        let expected = 3u32.saturating_sub(misses).max(1) as u8;
        prop_assert_eq!(engine.stars(), expected);
        prop_assert_eq!(stars_for_attempts(misses), expected);
    }

    /// Hint tier never goes down while misses accumulate.
    #[test]
    fn prop_hint_level_monotonic(misses in 1u32..20) {
        let mut engine = HintEngine::default();
        let mut previous = engine.hint_level();
        for _ in 0..misses {
            engine.register_attempt(false);
            let current = engine.hint_level();
            prop_assert!(current >= previous);
            previous = current;
        }
    }
}
