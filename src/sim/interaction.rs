//! Pickup and drop eligibility
//!
//! Pure predicates over the store, recomputed whenever they are asked. The
//! actions themselves stay safe to call when these say no.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{GamePhase, GameState};
use super::stone::StoneId;
use crate::consts::PICKUP_RADIUS;
use crate::horizontal_distance_squared;

/// The pitcher the crow fills
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pitcher {
    /// Center of the pitcher's base
    pub position: Vec3,
    pub radius: f32,
    pub height: f32,
}

impl Default for Pitcher {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 2.0),
            radius: 1.0,
            height: 2.5,
        }
    }
}

impl Pitcher {
    /// Altitude the crow must clear to drop into the mouth
    pub fn top(&self) -> f32 {
        self.position.y + self.height / 2.0
    }

    /// `pos` is over the mouth and above the top
    pub fn is_above(&self, pos: Vec3) -> bool {
        horizontal_distance_squared(pos, self.position) < self.radius * self.radius
            && pos.y > self.top()
    }
}

impl GameState {
    /// The crow can take stone `id` right now
    pub fn can_pickup(&self, id: StoneId) -> bool {
        if self.phase() != GamePhase::Playing || self.has_stone() {
            return false;
        }
        self.stone(id).is_some_and(|stone| {
            !stone.is_picked_up
                && self.crow_position().distance_squared(stone.position)
                    < PICKUP_RADIUS * PICKUP_RADIUS
        })
    }

    /// The crow can drop its stone into the pitcher right now
    pub fn can_drop(&self) -> bool {
        self.has_stone()
            && self.phase() == GamePhase::Playing
            && self.tuning().pitcher.is_above(self.crow_position())
    }

    /// Closest stone the crow could take right now
    pub fn nearest_pickable_stone(&self) -> Option<StoneId> {
        let crow = self.crow_position();
        self.stones()
            .iter()
            .filter(|s| self.can_pickup(s.id))
            .min_by(|a, b| {
                crow.distance_squared(a.position)
                    .partial_cmp(&crow.distance_squared(b.position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|s| s.id)
    }

    /// Pick up the nearest eligible stone. Returns whether one was taken.
    pub fn try_pick_up_nearest(&mut self) -> bool {
        match self.nearest_pickable_stone() {
            Some(id) => {
                self.pick_up_stone(id);
                true
            }
            None => false,
        }
    }

    /// Drop into the pitcher if in position. Returns whether it happened.
    pub fn try_drop(&mut self, now: f64) -> bool {
        if !self.can_drop() {
            return false;
        }
        self.drop_stone(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playing() -> GameState {
        let mut state = GameState::new(21);
        state.start_game(0.0);
        state.complete_tutorial();
        state
    }

    fn first_stone(state: &GameState) -> (StoneId, Vec3) {
        let stone = &state.stones()[0];
        (stone.id, stone.position)
    }

    #[test]
    fn test_pitcher_top() {
        let pitcher = Pitcher::default();
        assert!((pitcher.top() - 1.25).abs() < f32::EPSILON);
        assert!(pitcher.is_above(Vec3::new(0.0, 1.5, 2.0)));
        assert!(!pitcher.is_above(Vec3::new(0.0, 1.0, 2.0)));
        assert!(!pitcher.is_above(Vec3::new(1.0, 2.0, 2.0)));
    }

    #[test]
    fn test_can_pickup_radius() {
        let mut state = playing();
        let (id, pos) = first_stone(&state);

        state.set_crow_position(pos + Vec3::new(1.9, 0.0, 0.0));
        assert!(state.can_pickup(id));

        state.set_crow_position(pos + Vec3::new(2.05, 0.0, 0.0));
        assert!(!state.can_pickup(id));

        // Altitude counts
        state.set_crow_position(pos + Vec3::new(1.5, 1.5, 0.0));
        assert!(!state.can_pickup(id));
    }

    #[test]
    fn test_can_pickup_requires_playing() {
        let mut state = GameState::new(21);
        let (id, pos) = first_stone(&state);
        state.set_crow_position(pos);
        assert!(!state.can_pickup(id));

        state.start_game(0.0);
        assert!(!state.can_pickup(id));

        state.complete_tutorial();
        assert!(state.can_pickup(id));
    }

    #[test]
    fn test_can_pickup_while_holding() {
        let mut state = playing();
        let (id, pos) = first_stone(&state);
        state.set_crow_position(pos);
        assert!(state.try_pick_up_nearest());
        assert_eq!(state.held_stone_id(), Some(id));
        assert!(!state.can_pickup(id));
        assert_eq!(state.nearest_pickable_stone(), None);
    }

    #[test]
    fn test_can_drop_over_pitcher() {
        let mut state = playing();
        let (_, pos) = first_stone(&state);
        state.set_crow_position(pos);
        state.try_pick_up_nearest();

        state.set_crow_position(Vec3::new(0.5, 1.0, 2.0));
        assert!(!state.can_drop(), "below the rim");
        assert!(!state.try_drop(1_000.0));
        assert!(state.has_stone());

        state.set_crow_position(Vec3::new(0.5, 1.3, 2.0));
        assert!(state.can_drop());
        assert!(state.try_drop(1_000.0));
        assert!(!state.has_stone());
        assert_eq!(state.stones().len(), 8);
    }

    #[test]
    fn test_cannot_drop_empty_handed() {
        let mut state = playing();
        state.set_crow_position(Vec3::new(0.0, 2.0, 2.0));
        assert!(!state.can_drop());
    }

    #[test]
    fn test_nearest_pickable_prefers_closest() {
        let mut state = playing();
        let target = state.stones()[3].clone();
        state.set_crow_position(target.position + Vec3::new(0.1, 0.0, 0.0));
        assert_eq!(state.nearest_pickable_stone(), Some(target.id));
    }
}
