//! Frame controller
//!
//! Integrates the crow's flight from input intent and runs the gated
//! pickup/drop interactions. Speeds are per second and scaled by `dt`, so
//! flight does not depend on the render rate; the browser driver steps at a
//! fixed `SIM_DT`.

use super::state::{GamePhase, GameState};

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    // Held flags
    pub forward: bool,
    pub backward: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub ascend: bool,
    pub descend: bool,
    // One-shot actions
    /// Take the nearest stone in reach
    pub pickup: bool,
    /// Drop the held stone into the pitcher
    pub drop: bool,
    /// Start over (only once the pitcher is full)
    pub restart: bool,
}

impl TickInput {
    /// Any flight control is held
    pub fn is_flying(&self) -> bool {
        self.forward || self.backward || self.turn_left || self.turn_right || self.ascend || self.descend
    }
}

/// Advance the game by `dt` seconds; `now` is the wall clock in ms
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32, now: f64) {
    if input.restart && state.phase() == GamePhase::Success {
        state.reset_game();
        return;
    }

    if !state.phase().allows_flight() {
        return;
    }

    // Gates see the pose the key was pressed at, before this tick's move
    if input.pickup {
        state.try_pick_up_nearest();
    }
    if input.drop {
        state.try_drop(now);
    }

    // A drop may just have filled the pitcher
    if state.phase().allows_flight() {
        fly(state, input, dt);
    }
}

/// Apply flight controls, writing back only what changed
fn fly(state: &mut GameState, input: &TickInput, dt: f32) {
    let tuning = state.tuning();
    let step = tuning.move_speed * dt;
    let turn = tuning.turn_speed * dt;

    let current = state.crow_position();
    let current_rotation = state.crow_rotation();
    let mut pos = current;
    let mut rotation = current_rotation;

    // Forward is -Z at yaw 0
    if input.forward {
        pos.x -= rotation.sin() * step;
        pos.z -= rotation.cos() * step;
    }
    if input.backward {
        pos.x += rotation.sin() * step;
        pos.z += rotation.cos() * step;
    }
    if input.turn_left {
        rotation += turn;
    }
    if input.turn_right {
        rotation -= turn;
    }
    if input.ascend {
        pos.y += step;
    }
    if input.descend {
        pos.y -= step;
    }

    // max/min rather than clamp: never panics on inverted bounds
    pos.y = pos.y.max(tuning.min_height).min(tuning.max_height);
    pos.x = pos.x.max(-tuning.boundary).min(tuning.boundary);
    pos.z = pos.z.max(-tuning.boundary).min(tuning.boundary);

    if pos != current {
        state.set_crow_position(pos);
    }
    if rotation != current_rotation {
        state.set_crow_rotation(rotation);
    }
}
