use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::catalog::MapCatalog;
use crate::engine::unlock::is_level_unlocked;
use crate::engine::{HintEngine, HintLevel, HintThresholds};
use crate::error::GameError;
use crate::generator::{Answer, GeneratedProblem, ProblemGenerator};
use crate::session::result::LevelResult;
use crate::store::ProgressStore;
use crate::store::schema::{ActiveSession, LevelKey};

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Incorrect { attempts: u32, hint: HintLevel },
    Solved(LevelResult),
}

/// One level in play: its problem, the attempt tracker, and the
/// checkpoint kept in the store until the level is solved.
#[derive(Clone, Debug)]
pub struct LevelSession {
    key: LevelKey,
    problem: GeneratedProblem,
    engine: HintEngine,
    started_at: Option<DateTime<Utc>>,
    resumed: bool,
}

impl LevelSession {
    /// Resume the checkpointed session for the level, or start a new one
    /// with a freshly generated problem.
    pub fn enter<G: ProblemGenerator + ?Sized>(
        store: &mut ProgressStore,
        catalog: &MapCatalog,
        map_id: &str,
        level: u32,
        thresholds: HintThresholds,
        generator: &mut G,
    ) -> Result<Self, GameError> {
        let map = catalog
            .get(map_id)
            .ok_or_else(|| GameError::UnknownMap(map_id.to_string()))?;
        if !store.state().is_map_unlocked(map_id) {
            return Err(GameError::MapLocked(map_id.to_string()));
        }
        let max = store.levels_per_map();
        if level == 0 || level > max {
            return Err(GameError::LevelOutOfRange {
                map_id: map_id.to_string(),
                level,
                max,
            });
        }
        if !is_level_unlocked(store.state(), map_id, level) {
            return Err(GameError::LevelLocked {
                map_id: map_id.to_string(),
                level,
            });
        }

        let key = LevelKey::new(map_id, level);
        if let Some(saved) = store.session(&key) {
            debug!(level = %key, attempts = saved.attempts, "resuming session");
            return Ok(Self {
                engine: HintEngine::resume(thresholds, saved.attempts),
                problem: saved.problem,
                started_at: saved.started_at,
                key,
                resumed: true,
            });
        }

        let problem = match map.problem_config() {
            Some(config) => generator.generate(&config, level),
            None => {
                warn!(map = %map_id, "falling back to a default counting problem");
                GeneratedProblem::fallback()
            }
        };
        let checkpoint = ActiveSession::new(problem);
        let started_at = checkpoint.started_at;
        store.save_session(&key, checkpoint);

        Ok(Self {
            key,
            problem,
            engine: HintEngine::new(thresholds),
            started_at,
            resumed: false,
        })
    }

    pub fn key(&self) -> &LevelKey {
        &self.key
    }

    pub fn problem(&self) -> &GeneratedProblem {
        &self.problem
    }

    pub fn hint_level(&self) -> HintLevel {
        self.engine.hint_level()
    }

    pub fn attempts(&self) -> u32 {
        self.engine.attempts()
    }

    pub fn is_solved(&self) -> bool {
        self.engine.is_solved()
    }

    /// Stars the level would be worth if solved now.
    pub fn stars(&self) -> u8 {
        self.engine.stars()
    }

    pub fn was_resumed(&self) -> bool {
        self.resumed
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Check `answer`. A miss updates the checkpoint; a solve records the
    /// stars, drops the checkpoint and reports the result. An answer of the
    /// wrong kind (a number for a comparison) is rejected without counting.
    pub fn submit(
        &mut self,
        store: &mut ProgressStore,
        answer: Answer,
    ) -> Result<SubmitOutcome, GameError> {
        if self.engine.is_solved() {
            return Err(GameError::AlreadySolved);
        }
        let correct = self
            .problem
            .check(answer)
            .ok_or_else(|| GameError::InvalidAnswer(answer.to_string()))?;

        if !self.engine.register_attempt(correct) {
            store.save_session(
                &self.key,
                ActiveSession {
                    problem: self.problem,
                    attempts: self.engine.attempts(),
                    started_at: self.started_at,
                },
            );
            return Ok(SubmitOutcome::Incorrect {
                attempts: self.engine.attempts(),
                hint: self.engine.hint_level(),
            });
        }

        let stars = self.engine.stars();
        let unlocked_map = store.complete_level(&self.key, stars);
        store.clear_session(&self.key);
        info!(level = %self.key, stars, attempts = self.engine.attempts(), "level solved");

        Ok(SubmitOutcome::Solved(LevelResult {
            map_id: self.key.map_id.clone(),
            level: self.key.level,
            stars,
            best_stars: store.state().best_stars(&self.key),
            failed_attempts: self.engine.attempts(),
            unlocked_map,
            timestamp: Utc::now(),
        }))
    }
}
