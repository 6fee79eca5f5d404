//! Property-based tests for the game store.
//!
//! Random action sequences, including out-of-order and invalid ones, must
//! never break the store's invariants.
//! Run with: cargo test --release invariants

#![allow(clippy::unwrap_used)]

use glam::Vec3;
use proptest::prelude::*;

use thirsty_crow::Tuning;
use thirsty_crow::consts::{SIM_DT, WATER_MAX, WATER_MIN};
use thirsty_crow::sim::{GamePhase, GameState, StoneSize, TickInput, steer, tick};

#[derive(Debug, Clone)]
enum Action {
    Start,
    CompleteTutorial,
    /// Pick up the n-th active stone (modulo count), or an unknown id
    PickUp(usize),
    PickUpUnknown,
    Drop,
    Raise(f32),
    Complete,
    Reset,
    Fly(TickInput),
    /// Teleport the crow (exercises the gates)
    Move(f32, f32, f32),
}

fn tick_input() -> impl Strategy<Value = TickInput> {
    (any::<[bool; 6]>(), any::<bool>(), any::<bool>()).prop_map(|(held, pickup, drop)| TickInput {
        forward: held[0],
        backward: held[1],
        turn_left: held[2],
        turn_right: held[3],
        ascend: held[4],
        descend: held[5],
        pickup,
        drop,
        restart: false,
    })
}

fn action() -> impl Strategy<Value = Action> {
    prop_oneof![
        Just(Action::Start),
        Just(Action::CompleteTutorial),
        (0usize..16).prop_map(Action::PickUp),
        Just(Action::PickUpUnknown),
        Just(Action::Drop),
        (-1.0f32..1.0).prop_map(Action::Raise),
        Just(Action::Complete),
        Just(Action::Reset),
        tick_input().prop_map(Action::Fly),
        (-12.0f32..12.0, -1.0f32..4.0, -12.0f32..12.0).prop_map(|(x, y, z)| Action::Move(x, y, z)),
    ]
}

fn apply(state: &mut GameState, action: &Action, now: f64) {
    match action {
        Action::Start => state.start_game(now),
        Action::CompleteTutorial => state.complete_tutorial(),
        Action::PickUp(n) => {
            if !state.stones().is_empty() {
                let id = state.stones()[n % state.stones().len()].id;
                state.pick_up_stone(id);
            }
        }
        Action::PickUpUnknown => state.pick_up_stone(u32::MAX),
        Action::Drop => state.drop_stone(now),
        Action::Raise(amount) => state.increase_water_level(*amount, now),
        Action::Complete => state.complete_game(now),
        Action::Reset => state.reset_game(),
        Action::Fly(input) => tick(state, input, SIM_DT, now),
        Action::Move(x, y, z) => state.set_crow_position(Vec3::new(*x, *y, *z)),
    }
}

fn check_hold(state: &GameState) -> Result<(), TestCaseError> {
    prop_assert_eq!(state.has_stone(), state.held_stone_id().is_some());
    if let Some(id) = state.held_stone_id() {
        let held = state.stone(id);
        prop_assert!(held.is_some(), "held stone {} not in active set", id);
        prop_assert!(held.unwrap().is_picked_up);
    }
    // At most one stone is off the ground
    let picked = state.stones().iter().filter(|s| s.is_picked_up).count();
    prop_assert!(picked <= 1);
    prop_assert_eq!(picked == 1, state.has_stone());
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Holding flag and held id always agree, whatever the action order.
    #[test]
    fn prop_hold_invariant(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..80)) {
        let mut state = GameState::new(seed);
        for (i, action) in actions.iter().enumerate() {
            apply(&mut state, action, 1_000.0 * i as f64);
            check_hold(&state)?;
        }
    }

    /// Water stays in bounds and only falls on reset.
    #[test]
    fn prop_water_monotonic(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..80)) {
        let mut state = GameState::new(seed);
        let mut last = state.water_level();
        for (i, action) in actions.iter().enumerate() {
            apply(&mut state, action, 1_000.0 * i as f64);
            let level = state.water_level();
            prop_assert!((WATER_MIN..=WATER_MAX).contains(&level));
            if !matches!(action, Action::Reset) {
                prop_assert!(level >= last, "{:?} lowered water {} -> {}", action, last, level);
            }
            last = level;
        }
    }

    /// Active stone ids are unique; a drop removes exactly the held stone.
    #[test]
    fn prop_stone_set(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..80)) {
        let mut state = GameState::new(seed);
        for (i, action) in actions.iter().enumerate() {
            let before = state.stones().len();
            let held = state.held_stone_id();
            apply(&mut state, action, 1_000.0 * i as f64);

            let mut ids: Vec<_> = state.stones().iter().map(|s| s.id).collect();
            let count = ids.len();
            ids.sort_unstable();
            ids.dedup();
            prop_assert_eq!(ids.len(), count);

            if matches!(action, Action::Drop) {
                match held {
                    Some(id) => {
                        prop_assert_eq!(count, before - 1);
                        prop_assert!(state.stone(id).is_none());
                    }
                    None => prop_assert_eq!(count, before),
                }
            }
        }
    }

    /// Once complete, score and end time never change until reset.
    #[test]
    fn prop_score_fixed_after_success(seed in any::<u64>(), actions in prop::collection::vec(action(), 1..60)) {
        let mut state = GameState::new(seed);
        state.start_game(0.0);
        state.complete_tutorial();
        state.increase_water_level(1.0, 7_000.0);
        let score = state.score();
        let end = state.end_time();
        prop_assert_eq!(score, 930);

        for (i, action) in actions.iter().enumerate() {
            if matches!(action, Action::Reset | Action::Start) {
                break;
            }
            apply(&mut state, action, 10_000.0 + 1_000.0 * i as f64);
            prop_assert_eq!(state.phase(), GamePhase::Success);
            prop_assert_eq!(state.score(), score);
            prop_assert_eq!(state.end_time(), end);
        }
    }

    /// Flight never leaves the box, whatever is held down.
    #[test]
    fn prop_flight_bounds(seed in any::<u64>(), inputs in prop::collection::vec(tick_input(), 1..400)) {
        let mut state = GameState::new(seed);
        state.start_game(0.0);
        let tuning = Tuning::default();
        for input in &inputs {
            tick(&mut state, input, SIM_DT, 0.0);
            let pos = state.crow_position();
            prop_assert!(pos.y >= tuning.min_height && pos.y <= tuning.max_height);
            prop_assert!(pos.x.abs() <= tuning.boundary);
            prop_assert!(pos.z.abs() <= tuning.boundary);
        }
    }

    /// Every layout has the same composition.
    #[test]
    fn prop_layout_composition(seed in any::<u64>()) {
        let state = GameState::new(seed);
        let stones = state.stones();
        prop_assert_eq!(stones.len(), 9);
        prop_assert_eq!(stones.iter().filter(|s| s.size == StoneSize::Small).count(), 4);
        prop_assert_eq!(stones.iter().filter(|s| s.size == StoneSize::Medium).count(), 3);
        prop_assert_eq!(stones.iter().filter(|s| s.size == StoneSize::Large).count(), 2);
    }

    /// The autopilot only ever asks for legal moves.
    #[test]
    fn prop_autopilot_keeps_invariants(seed in any::<u64>()) {
        let mut state = GameState::new(seed);
        state.start_game(0.0);
        state.complete_tutorial();
        let mut now = 0.0;
        for _ in 0..3_000 {
            let input = steer(&state);
            now += 1000.0 / 60.0;
            tick(&mut state, &input, SIM_DT, now);
            check_hold(&state)?;
            if state.phase() == GamePhase::Success {
                break;
            }
        }
    }
}
