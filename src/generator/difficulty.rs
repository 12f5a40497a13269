use crate::generator::problem::ProblemConfig;

/// Levels up to this index use the easiest band.
pub const EARLY_LEVEL_MAX: u32 = 3;
/// Levels up to this index use the middle band; later levels get the full limit.
pub const MIDDLE_LEVEL_MAX: u32 = 7;

const EARLY_FLOOR: u32 = 5;
const MIDDLE_FLOOR: u32 = 8;

/// Operand ceiling for `level` of a map, never above `config.limit`.
///
/// Early levels use half the limit (60% for advanced maps), middle levels
/// 80%. Non-advanced maps keep a floor of 5 and 8 respectively so small
/// limits still produce varied problems.
pub fn effective_limit(config: &ProblemConfig, level: u32) -> u32 {
    let limit = config.limit;
    let scaled = if level <= EARLY_LEVEL_MAX {
        if config.advanced {
            tenths(limit, 6)
        } else {
            tenths(limit, 5).max(EARLY_FLOOR)
        }
    } else if level <= MIDDLE_LEVEL_MAX {
        if config.advanced {
            tenths(limit, 8)
        } else {
            tenths(limit, 8).max(MIDDLE_FLOOR)
        }
    } else {
        limit
    };
    scaled.min(limit)
}

/// floor(limit * n / 10) without float rounding surprises.
fn tenths(limit: u32, n: u64) -> u32 {
    (u64::from(limit) * n / 10) as u32
}
