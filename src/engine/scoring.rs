/// Stars for a flawless solve; also the per-level share of a map's mastery target.
pub const MAX_STARS: u8 = 3;
/// A solved level is always worth at least this much.
pub const MIN_SOLVED_STARS: u8 = 1;

/// Stars earned by solving after `failed_attempts` wrong answers.
pub fn stars_for_attempts(failed_attempts: u32) -> u8 {
    let remaining = u32::from(MAX_STARS).saturating_sub(failed_attempts);
    remaining.clamp(u32::from(MIN_SOLVED_STARS), u32::from(MAX_STARS)) as u8
}

/// Stars needed for every level of a map to be at the maximum.
pub fn mastery_target(levels_per_map: u32) -> u32 {
    u32::from(MAX_STARS) * levels_per_map
}
