//! The Thirsty Crow - a small arcade game about a clever crow
//!
//! Core modules:
//! - `sim`: Game state store, stone layout, interaction gates, frame controller
//! - `timer`: Elapsed time, stopwatch display and completion score
//! - `input`: Key codes to intents to per-tick input
//! - `audio`: Cues derived from game events (Web Audio playback on wasm)
//! - `settings`: Player preferences
//! - `tuning`: Data-driven game balance

pub mod audio;
pub mod input;
pub mod settings;
pub mod sim;
pub mod timer;
pub mod tuning;

pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec3;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep. Matches the 60 Hz reference rate the
    /// movement speeds were balanced at.
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Water level bounds (normalized)
    pub const WATER_MIN: f32 = 0.0;
    pub const WATER_MAX: f32 = 1.0;
    /// Tolerance for threshold comparisons on accumulated water levels
    pub const WATER_EPSILON: f32 = 1e-6;

    /// Pickup radius around a stone (world units)
    pub const PICKUP_RADIUS: f32 = 2.0;

    /// Completion score budget and per-second penalty
    pub const SCORE_BUDGET: u32 = 1000;
    pub const SCORE_PENALTY_PER_SEC: u32 = 10;

    /// Startup loading screen delay (ms)
    pub const LOADING_DELAY_MS: i32 = 1500;
}

/// Normalized angle to [-π, π]. Non-finite angles map to 0.
#[inline]
pub fn normalize_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped > PI { wrapped - TAU } else { wrapped }
}

/// Point on the ground plane at polar (r, theta), lifted to height `y`
#[inline]
pub fn ground_point(r: f32, theta: f32, y: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), y, r * theta.sin())
}

/// Squared distance on the ground plane (ignores height)
#[inline]
pub fn horizontal_distance_squared(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

/// Yaw that faces from `from` toward `to`.
///
/// Yaw 0 faces -Z; positive yaw turns toward -X, matching the crow's
/// forward vector `(-sin(yaw), 0, -cos(yaw))`.
#[inline]
pub fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    (-dx).atan2(-dz)
}
