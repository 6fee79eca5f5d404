//! Stones: size tiers and the randomized layout for a run

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ground_point;

/// Stable stone identifier, unique for the stone's lifetime
pub type StoneId = u32;

/// Stone size tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoneSize {
    Small,
    Medium,
    Large,
}

/// Fixed numeric effects of a size tier
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoneProperties {
    /// Render scale
    pub scale: f32,
    /// Water level gained when dropped (before amplification)
    pub water_rise: f32,
    /// Movement weight
    pub weight: f32,
    /// Counting value shown on the stone (1, 2 or 3)
    pub value: u32,
    /// Badge color (0xRRGGBB)
    pub color: u32,
}

const SMALL: StoneProperties = StoneProperties {
    scale: 0.6,
    water_rise: 0.1,
    weight: 0.5,
    value: 1,
    color: 0x33CC33,
};

const MEDIUM: StoneProperties = StoneProperties {
    scale: 0.8,
    water_rise: 0.2,
    weight: 1.0,
    value: 2,
    color: 0x3366CC,
};

const LARGE: StoneProperties = StoneProperties {
    scale: 1.0,
    water_rise: 0.3,
    weight: 1.5,
    value: 3,
    color: 0xCC3333,
};

impl StoneSize {
    pub fn properties(&self) -> &'static StoneProperties {
        match self {
            StoneSize::Small => &SMALL,
            StoneSize::Medium => &MEDIUM,
            StoneSize::Large => &LARGE,
        }
    }

    pub fn water_rise(&self) -> f32 {
        self.properties().water_rise
    }

    pub fn value(&self) -> u32 {
        self.properties().value
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoneSize::Small => "small",
            StoneSize::Medium => "medium",
            StoneSize::Large => "large",
        }
    }
}

/// A stone lying in the scene (or held by the crow)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stone {
    pub id: StoneId,
    pub size: StoneSize,
    /// Spawn position; never moves in the model
    pub position: Vec3,
    /// Set on pickup, stays set until the stone is dropped and removed
    pub is_picked_up: bool,
}

impl Stone {
    pub fn new(id: StoneId, size: StoneSize, position: Vec3) -> Self {
        Self {
            id,
            size,
            position,
            is_picked_up: false,
        }
    }
}

/// Stone composition of every run: four 1s, three 2s, two 3s.
/// 16 value-units on the ground against roughly 10 needed to fill the pitcher.
pub const STONE_LAYOUT: [StoneSize; 9] = [
    StoneSize::Small,
    StoneSize::Small,
    StoneSize::Small,
    StoneSize::Small,
    StoneSize::Medium,
    StoneSize::Medium,
    StoneSize::Medium,
    StoneSize::Large,
    StoneSize::Large,
];

/// Ring the stones are scattered on
pub const LAYOUT_MIN_RADIUS: f32 = 5.0;
pub const LAYOUT_MAX_RADIUS: f32 = 12.0;
/// Max angular jitter around each stone's even slot (radians)
pub const LAYOUT_ANGLE_JITTER: f32 = 0.25;
/// Share of stones resting slightly above the ground
pub const LAYOUT_RAISED_CHANCE: f64 = 0.3;
pub const LAYOUT_MAX_RAISE: f32 = 0.1;

/// Scatter a fresh set of stones around the pitcher.
///
/// `next_id` hands out ids; it is called once per stone.
pub fn generate_stones<R: Rng>(rng: &mut R, mut next_id: impl FnMut() -> StoneId) -> Vec<Stone> {
    let count = STONE_LAYOUT.len();

    STONE_LAYOUT
        .iter()
        .enumerate()
        .map(|(i, &size)| {
            let slot = std::f32::consts::TAU * (i as f32 / count as f32);
            let angle = slot + rng.random_range(-LAYOUT_ANGLE_JITTER..LAYOUT_ANGLE_JITTER);
            let radius = rng.random_range(LAYOUT_MIN_RADIUS..LAYOUT_MAX_RADIUS);
            let y = if rng.random_bool(LAYOUT_RAISED_CHANCE) {
                rng.random_range(0.0..LAYOUT_MAX_RAISE)
            } else {
                0.0
            };

            Stone::new(next_id(), size, ground_point(radius, angle, y))
        })
        .collect()
}
