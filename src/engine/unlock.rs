use crate::engine::scoring::mastery_target;
use crate::store::schema::{LevelKey, MapState};

/// Level 1 is always open; later levels open once the previous one is completed.
pub fn is_level_unlocked(state: &MapState, map_id: &str, level: u32) -> bool {
    level <= 1 || state.is_completed(&LevelKey::new(map_id, level - 1))
}

/// Sum of best stars over levels `1..=levels_per_map` of `map_id`.
pub fn map_stars(state: &MapState, map_id: &str, levels_per_map: u32) -> u32 {
    (1..=levels_per_map)
        .map(|level| u32::from(state.best_stars(&LevelKey::new(map_id, level))))
        .sum()
}

/// Share of the map's possible stars earned so far, in `[0, 1]`.
pub fn map_progress(state: &MapState, map_id: &str, levels_per_map: u32) -> f64 {
    let target = mastery_target(levels_per_map);
    if target == 0 {
        return 0.0;
    }
    f64::from(map_stars(state, map_id, levels_per_map)) / f64::from(target)
}

pub fn is_map_mastered(state: &MapState, map_id: &str, levels_per_map: u32) -> bool {
    levels_per_map > 0 && map_stars(state, map_id, levels_per_map) == mastery_target(levels_per_map)
}

/// The map that follows `map_id` in `order`, if any.
pub fn next_map<'a>(order: &'a [String], map_id: &str) -> Option<&'a str> {
    let index = order.iter().position(|m| m == map_id)?;
    order.get(index + 1).map(String::as_str)
}

/// First level of the map that is unlocked but not completed, or the last
/// level when everything is done.
pub fn next_playable_level(state: &MapState, map_id: &str, levels_per_map: u32) -> u32 {
    (1..=levels_per_map)
        .find(|&level| !state.is_completed(&LevelKey::new(map_id, level)))
        .unwrap_or(levels_per_map.max(1))
}
