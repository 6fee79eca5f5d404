//! Game state store
//!
//! One explicit container holds everything about a run. Consumers get it
//! passed in; every mutation goes through the action methods below, each of
//! which is a single synchronous transition. Actions called out of order are
//! ignored rather than reported: the interaction gates are advisory and the
//! store has the final say.

use glam::Vec3;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::stone::{Stone, StoneId, StoneSize, generate_stones};
use super::story::{StoryId, StorySegment, StoryTrigger, mark_triggered, story_segments};
use crate::consts::*;
use crate::timer::score_for_elapsed;
use crate::tuning::Tuning;

/// Coarse game stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, waiting for start
    Intro,
    /// Instructions shown, crow can already fly
    Tutorial,
    /// Active gameplay
    Playing,
    /// Pitcher full, run over
    Success,
}

impl GamePhase {
    /// Phases in which the crow can fly
    pub fn allows_flight(&self) -> bool {
        matches!(self, GamePhase::Tutorial | GamePhase::Playing)
    }
}

/// Things that happened during an action, for the presentation layer
/// (sound cues, HUD flashes). Drained once per frame.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    GameStarted,
    TutorialCompleted,
    StonePickedUp { id: StoneId, size: StoneSize },
    StoneDropped { id: StoneId, size: StoneSize, water_level: f32 },
    StoryAdvanced(StoryId),
    GameCompleted { score: u32, elapsed_ms: f64 },
    GameReset,
}

/// `level` has reached `mark` (inclusive, tolerant of float accumulation)
#[inline]
fn reached(level: f32, mark: f32) -> bool {
    level + WATER_EPSILON >= mark
}

/// `mark` was crossed going from `old` to `new`
#[inline]
fn crossed(old: f32, new: f32, mark: f32) -> bool {
    reached(new, mark) && !reached(old, mark)
}

/// Complete state of a run
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Seed the stone layouts are drawn from
    seed: u64,
    #[serde(skip)]
    rng: Pcg32,
    tuning: Tuning,

    phase: GamePhase,
    tutorial_complete: bool,
    water_level: f32,
    /// Run start / end stamps (ms, caller's clock)
    start_time: Option<f64>,
    end_time: Option<f64>,
    score: u32,

    crow_position: Vec3,
    crow_rotation: f32,
    /// Stone in the crow's beak; always a member of `stones`
    held_stone: Option<StoneId>,

    /// Active stones (sorted by id)
    stones: Vec<Stone>,
    story: Vec<StorySegment>,
    current_story: Option<StoryId>,

    stones_picked: u32,
    stones_dropped: u32,

    #[serde(skip)]
    events: Vec<GameEvent>,
    /// Next stone ID. Survives resets so ids are never reused.
    #[serde(skip)]
    next_id: StoneId,
}

impl GameState {
    /// Create a new game with default tuning and the given layout seed
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new game with custom balance values
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let mut state = Self::blank(seed, tuning, Pcg32::seed_from_u64(seed), 1);
        state.spawn_stones();
        state
    }

    /// Create a new game with a random layout seed
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Run-start defaults for every field, no stones yet
    fn blank(seed: u64, tuning: Tuning, rng: Pcg32, next_id: StoneId) -> Self {
        Self {
            seed,
            rng,
            phase: GamePhase::Intro,
            tutorial_complete: false,
            water_level: tuning.starting_water_level.clamp(WATER_MIN, WATER_MAX),
            start_time: None,
            end_time: None,
            score: 0,
            crow_position: tuning.crow_spawn,
            crow_rotation: tuning.crow_spawn_rotation,
            held_stone: None,
            stones: Vec::new(),
            story: story_segments(),
            current_story: Some(StoryId::Intro),
            stones_picked: 0,
            stones_dropped: 0,
            events: Vec::new(),
            next_id,
            tuning,
        }
    }

    fn spawn_stones(&mut self) {
        let next_id = &mut self.next_id;
        self.stones = generate_stones(&mut self.rng, || {
            let id = *next_id;
            *next_id += 1;
            id
        });
    }

    // === Queries ===

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn tutorial_complete(&self) -> bool {
        self.tutorial_complete
    }

    pub fn water_level(&self) -> f32 {
        self.water_level
    }

    /// Water level has reached the success threshold
    pub fn is_pitcher_full(&self) -> bool {
        reached(self.water_level, self.tuning.success_threshold)
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<f64> {
        self.end_time
    }

    /// Completion score, 0 until the run is complete
    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn crow_position(&self) -> Vec3 {
        self.crow_position
    }

    pub fn crow_rotation(&self) -> f32 {
        self.crow_rotation
    }

    pub fn has_stone(&self) -> bool {
        self.held_stone.is_some()
    }

    pub fn held_stone_id(&self) -> Option<StoneId> {
        self.held_stone
    }

    pub fn held_stone(&self) -> Option<&Stone> {
        self.held_stone.and_then(|id| self.stone(id))
    }

    /// Active stones: on the ground or held
    pub fn stones(&self) -> &[Stone] {
        &self.stones
    }

    pub fn stone(&self, id: StoneId) -> Option<&Stone> {
        self.stones.iter().find(|s| s.id == id)
    }

    pub fn story_segments(&self) -> &[StorySegment] {
        &self.story
    }

    pub fn current_story(&self) -> Option<StoryId> {
        self.current_story
    }

    /// Narration line for the current story segment
    pub fn story_text(&self) -> Option<&'static str> {
        let current = self.current_story?;
        self.story.iter().find(|s| s.id == current).map(|s| s.text)
    }

    pub fn stones_dropped(&self) -> u32 {
        self.stones_dropped
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// JSON snapshot of the state (RNG and event outbox excluded)
    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    // === Actions ===

    pub fn set_crow_position(&mut self, position: Vec3) {
        self.crow_position = position;
    }

    pub fn set_crow_rotation(&mut self, rotation: f32) {
        self.crow_rotation = rotation;
    }

    /// Take a stone into the crow's beak.
    ///
    /// Ignored while already holding one, or for an unknown or already
    /// picked-up stone.
    pub fn pick_up_stone(&mut self, id: StoneId) {
        if self.held_stone.is_some() {
            log::debug!("pickup of stone {} ignored: already holding a stone", id);
            return;
        }
        let Some(stone) = self.stones.iter_mut().find(|s| s.id == id && !s.is_picked_up) else {
            log::debug!("pickup of stone {} ignored: not on the ground", id);
            return;
        };

        stone.is_picked_up = true;
        let size = stone.size;
        self.held_stone = Some(id);
        self.events.push(GameEvent::StonePickedUp { id, size });

        if self.stones_picked == 0 {
            self.advance_story(StoryTrigger::PickupFirst, StoryId::FirstStone);
        }
        self.stones_picked += 1;

        log::info!("Stone {} ({}) picked up", id, size.as_str());
    }

    /// Drop the held stone into the pitcher, raising the water.
    ///
    /// Ignored when not holding a stone.
    pub fn drop_stone(&mut self, now: f64) {
        let Some(held_id) = self.held_stone else {
            log::debug!("drop ignored: not holding a stone");
            return;
        };
        let Some(index) = self.stones.iter().position(|s| s.id == held_id) else {
            log::debug!("drop ignored: held stone {} is gone", held_id);
            return;
        };

        let size = self.stones[index].size;
        let old_level = self.water_level;
        let rise = size.water_rise() * self.tuning.water_rise_multiplier;
        let new_level = (old_level + rise).min(WATER_MAX);

        // First match wins
        let story = if self.stones_dropped == 0 {
            Some((StoryTrigger::DropFirst, StoryId::FirstDrop))
        } else if crossed(old_level, new_level, self.tuning.success_threshold) {
            Some((StoryTrigger::Success, StoryId::Success))
        } else if crossed(old_level, new_level, self.tuning.half_mark()) {
            Some((StoryTrigger::Halfway, StoryId::Halfway))
        } else {
            None
        };

        self.stones.remove(index);
        self.held_stone = None;
        self.water_level = new_level;
        self.stones_dropped += 1;
        self.events.push(GameEvent::StoneDropped {
            id: held_id,
            size,
            water_level: new_level,
        });
        if let Some((trigger, id)) = story {
            self.advance_story(trigger, id);
        }

        log::info!("Stone dropped! Water level: {:.2} -> {:.2}", old_level, new_level);

        if reached(new_level, self.tuning.success_threshold) {
            self.complete_game(now);
        }
    }

    /// Raise the water directly (debug and test paths). Negative or NaN
    /// amounts are ignored so the level never goes down.
    pub fn increase_water_level(&mut self, amount: f32, now: f64) {
        if amount.is_nan() || amount <= 0.0 {
            log::debug!("water increase of {} ignored", amount);
            return;
        }

        self.water_level = (self.water_level + amount).clamp(WATER_MIN, WATER_MAX);

        if reached(self.water_level, self.tuning.success_threshold) {
            self.complete_game(now);
        }
    }

    /// Leave the title screen and start the clock
    pub fn start_game(&mut self, now: f64) {
        if self.phase != GamePhase::Intro {
            log::debug!("start ignored in phase {:?}", self.phase);
            return;
        }

        self.phase = GamePhase::Tutorial;
        self.start_time = Some(now);
        self.story = story_segments();
        self.stones_picked = 0;
        self.stones_dropped = 0;
        self.events.push(GameEvent::GameStarted);
        self.advance_story(StoryTrigger::Start, StoryId::Intro);

        log::info!("Game started");
    }

    /// Finish the tutorial and begin playing
    pub fn complete_tutorial(&mut self) {
        match self.phase {
            GamePhase::Tutorial => {
                self.tutorial_complete = true;
                self.phase = GamePhase::Playing;
                self.events.push(GameEvent::TutorialCompleted);
            }
            GamePhase::Playing => self.tutorial_complete = true,
            phase => log::debug!("tutorial completion ignored in phase {:?}", phase),
        }
    }

    /// End the run and compute the score.
    ///
    /// Ignored before a start, and after the run is already complete so the
    /// score is computed exactly once.
    pub fn complete_game(&mut self, now: f64) {
        if self.end_time.is_some() {
            return;
        }
        let Some(start) = self.start_time else {
            log::debug!("completion ignored: game not started");
            return;
        };

        let elapsed_ms = (now - start).max(0.0);
        self.score = score_for_elapsed(elapsed_ms);
        self.phase = GamePhase::Success;
        self.end_time = Some(now);
        self.events.push(GameEvent::GameCompleted {
            score: self.score,
            elapsed_ms,
        });

        log::info!("Pitcher full after {:.1}s, score {}", elapsed_ms / 1000.0, self.score);
    }

    /// Start over: every field back to its run-start value, fresh stones
    pub fn reset_game(&mut self) {
        let mut fresh = Self::blank(self.seed, self.tuning.clone(), self.rng.clone(), self.next_id);
        fresh.spawn_stones();
        fresh.events.push(GameEvent::GameReset);
        *self = fresh;

        log::info!("Game reset");
    }

    pub fn mark_story_as_shown(&mut self, id: StoryId) {
        for segment in self.story.iter_mut().filter(|s| s.id == id) {
            segment.shown = true;
        }
    }

    pub fn set_current_story(&mut self, id: Option<StoryId>) {
        self.current_story = id;
    }

    fn advance_story(&mut self, trigger: StoryTrigger, id: StoryId) {
        mark_triggered(&mut self.story, trigger);
        self.current_story = Some(id);
        self.events.push(GameEvent::StoryAdvanced(id));
    }
}
