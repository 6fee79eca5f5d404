//! Game simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform code:
//! - Time comes in as an argument, never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (stones sorted by ID)

pub mod autopilot;
pub mod interaction;
pub mod state;
pub mod stone;
pub mod story;
pub mod tick;

pub use autopilot::steer;
pub use interaction::Pitcher;
pub use state::{GameEvent, GamePhase, GameState};
pub use stone::{STONE_LAYOUT, Stone, StoneId, StoneProperties, StoneSize, generate_stones};
pub use story::{StoryId, StorySegment, StoryTrigger};
pub use tick::{TickInput, tick};
