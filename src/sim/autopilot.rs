//! Idle/demo mode - the crow plays by itself
//!
//! Fetches the nearest stone, climbs over the pitcher and drops it, until
//! the pitcher is full. Produces ordinary `TickInput`s so it goes through
//! exactly the same controller and gates as a player.

use glam::Vec3;

use super::state::{GamePhase, GameState};
use super::tick::TickInput;
use crate::consts::PICKUP_RADIUS;
use crate::{horizontal_distance_squared, normalize_angle, yaw_toward};

/// Heading error below which the crow stops turning (radians)
const HEADING_DEADBAND: f32 = 0.05;
/// Heading error below which the crow flies forward while turning
const HEADING_FORWARD: f32 = 0.35;
/// Cruise altitude between stones and pitcher
const CRUISE_HEIGHT: f32 = 1.8;
/// Horizontal distance at which the crow starts descending onto a stone
const DESCENT_RANGE: f32 = 2.5;
/// Altitude kept above the pitcher rim before moving in
const RIM_CLEARANCE: f32 = 0.3;
/// Hover band around a target altitude
const ALTITUDE_BAND: f32 = 0.1;
/// Slack kept inside the pickup radius when judging reachability
const REACH_MARGIN: f32 = 0.1;

/// Decide the next tick's input from the current state
pub fn steer(state: &GameState) -> TickInput {
    if state.phase() != GamePhase::Playing {
        return TickInput::default();
    }

    if state.has_stone() {
        steer_to_pitcher(state)
    } else {
        steer_to_stone(state)
    }
}

fn steer_to_stone(state: &GameState) -> TickInput {
    if state.nearest_pickable_stone().is_some() {
        return TickInput {
            pickup: true,
            ..Default::default()
        };
    }

    let crow = state.crow_position();
    let target = state
        .stones()
        .iter()
        .filter(|s| !s.is_picked_up && reachable(state, s.position))
        .min_by(|a, b| {
            horizontal_distance_squared(crow, a.position)
                .partial_cmp(&horizontal_distance_squared(crow, b.position))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    let Some(stone) = target else {
        return TickInput::default();
    };

    let distance = horizontal_distance_squared(crow, stone.position).sqrt();
    let altitude = if distance < DESCENT_RANGE {
        stone.position.y
    } else {
        CRUISE_HEIGHT
    };

    let mut input = head_toward(state, stone.position, 0.0);
    hold_altitude(&mut input, crow.y, altitude);
    input
}

fn steer_to_pitcher(state: &GameState) -> TickInput {
    if state.can_drop() {
        return TickInput {
            drop: true,
            ..Default::default()
        };
    }

    let crow = state.crow_position();
    let pitcher = state.tuning().pitcher;
    let altitude = pitcher.top() + RIM_CLEARANCE;

    let mut input = TickInput::default();
    hold_altitude(&mut input, crow.y, altitude);

    // Climb before crossing the rim
    if crow.y > pitcher.top() {
        let stop_within = pitcher.radius * 0.5;
        let heading = head_toward(state, pitcher.position, stop_within);
        input.forward = heading.forward;
        input.turn_left = heading.turn_left;
        input.turn_right = heading.turn_right;
    }
    input
}

/// Turn toward `target`, flying forward once roughly facing it and farther
/// than `stop_within`
fn head_toward(state: &GameState, target: Vec3, stop_within: f32) -> TickInput {
    let crow = state.crow_position();
    let error = normalize_angle(yaw_toward(crow, target) - state.crow_rotation());
    let distance = horizontal_distance_squared(crow, target).sqrt();

    TickInput {
        turn_left: error > HEADING_DEADBAND,
        turn_right: error < -HEADING_DEADBAND,
        forward: error.abs() < HEADING_FORWARD && distance > stop_within,
        ..Default::default()
    }
}

/// Stones scattered past the flight boundary may be out of reach from the
/// nearest point the crow can get to
fn reachable(state: &GameState, pos: Vec3) -> bool {
    let bound = state.tuning().boundary;
    let closest = Vec3::new(pos.x.clamp(-bound, bound), pos.y, pos.z.clamp(-bound, bound));
    let reach = PICKUP_RADIUS - REACH_MARGIN;
    horizontal_distance_squared(closest, pos) < reach * reach
}

fn hold_altitude(input: &mut TickInput, current: f32, target: f32) {
    input.ascend = current < target - ALTITUDE_BAND;
    input.descend = current > target + ALTITUDE_BAND;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::tick;

    #[test]
    fn test_idle_outside_playing() {
        let state = GameState::new(5);
        assert_eq!(steer(&state), TickInput::default());
    }

    #[test]
    fn test_requests_pickup_in_reach() {
        let mut state = GameState::new(5);
        state.start_game(0.0);
        state.complete_tutorial();
        let pos = state.stones()[2].position;
        state.set_crow_position(pos);
        assert!(steer(&state).pickup);
    }

    #[test]
    fn test_infinite_heading_does_not_hang() {
        let mut state = GameState::new(5);
        state.start_game(0.0);
        state.complete_tutorial();
        // Out of reach of every stone
        state.set_crow_position(Vec3::new(0.0, 3.0, 0.0));
        state.set_crow_rotation(f32::INFINITY);
        let input = steer(&state);
        assert!(!input.pickup);
        assert!(!input.turn_left && !input.turn_right);
    }

    #[test]
    fn test_skips_stones_past_the_boundary() {
        let state = GameState::new(5);
        assert!(reachable(&state, Vec3::new(11.5, 0.0, 0.0)));
        assert!(!reachable(&state, Vec3::new(12.0, 0.0, 0.0)));
        assert!(!reachable(&state, Vec3::new(11.5, 0.0, 11.5)));
        assert!(reachable(&state, Vec3::new(6.0, 0.0, -6.0)));
    }

    #[test]
    fn test_autopilot_fills_the_pitcher() {
        for seed in [1, 2, 3, 99, 2024] {
            let mut state = GameState::new(seed);
            state.start_game(0.0);
            state.complete_tutorial();

            let mut now = 0.0;
            let mut ticks = 0;
            while state.phase() == GamePhase::Playing && ticks < 60 * 600 {
                let input = steer(&state);
                now += SIM_DT as f64 * 1000.0;
                tick(&mut state, &input, SIM_DT, now);
                ticks += 1;
            }

            assert_eq!(state.phase(), GamePhase::Success, "seed {} stalled", seed);
            assert!(state.score() > 0);
            assert!(state.stones_dropped() >= 1);
        }
    }
}
