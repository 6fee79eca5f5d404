//! Game balance values
//!
//! Defaults reproduce the classic feel. A page can override any subset by
//! embedding JSON in `<script id="crow-tuning" type="application/json">`.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::{WATER_MAX, WATER_MIN};
use crate::sim::Pitcher;

/// Balance numbers and scene layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Water ===
    /// Water level at the start of every run
    pub starting_water_level: f32,
    /// Level at which the crow can drink (inclusive)
    pub success_threshold: f32,
    /// Amplification applied to a stone's water rise when dropped
    pub water_rise_multiplier: f32,

    // === Flight ===
    /// Translation speed (units per second)
    pub move_speed: f32,
    /// Turn speed (radians per second)
    pub turn_speed: f32,
    /// Altitude bounds
    pub min_height: f32,
    pub max_height: f32,
    /// Horizontal bound on both axes (+/-)
    pub boundary: f32,

    // === Scene ===
    pub pitcher: Pitcher,
    pub crow_spawn: Vec3,
    pub crow_spawn_rotation: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            starting_water_level: 0.5,
            success_threshold: 0.8,
            water_rise_multiplier: 1.5,

            // 0.15 units and 0.07 rad per frame at 60 Hz
            move_speed: 9.0,
            turn_speed: 4.2,
            min_height: 0.0,
            max_height: 3.0,
            boundary: 10.0,

            pitcher: Pitcher::default(),
            crow_spawn: Vec3::new(0.0, 0.0, 5.0),
            crow_spawn_rotation: 0.0,
        }
    }
}

impl Tuning {
    /// Half of the full pitcher, the "halfway" story mark
    pub fn half_mark(&self) -> f32 {
        WATER_MAX / 2.0
    }

    /// Parse tuning from JSON. Missing fields take their defaults;
    /// values that would break the game are rejected.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning
            .validate()
            .map_err(<serde_json::Error as serde::de::Error>::custom)?;
        Ok(tuning)
    }

    /// Check that the values describe a playable scene
    pub fn validate(&self) -> Result<(), String> {
        let finite = [
            self.starting_water_level,
            self.success_threshold,
            self.water_rise_multiplier,
            self.move_speed,
            self.turn_speed,
            self.min_height,
            self.max_height,
            self.boundary,
            self.pitcher.radius,
            self.pitcher.height,
            self.crow_spawn_rotation,
        ];
        if finite.iter().any(|v| !v.is_finite())
            || !self.crow_spawn.is_finite()
            || !self.pitcher.position.is_finite()
        {
            return Err("non-finite value".into());
        }
        if self.boundary < 0.0 {
            return Err(format!("negative boundary {}", self.boundary));
        }
        if self.min_height > self.max_height {
            return Err(format!(
                "min_height {} above max_height {}",
                self.min_height, self.max_height
            ));
        }
        if self.pitcher.radius <= 0.0 || self.pitcher.height <= 0.0 {
            return Err("pitcher radius and height must be positive".into());
        }
        if self.success_threshold <= WATER_MIN || self.success_threshold > WATER_MAX {
            return Err(format!("success_threshold {} outside (0, 1]", self.success_threshold));
        }
        if self.water_rise_multiplier < 0.0 || self.move_speed < 0.0 || self.turn_speed < 0.0 {
            return Err("negative speed or multiplier".into());
        }
        Ok(())
    }

    /// Element holding page-provided tuning
    #[allow(dead_code)]
    const ELEMENT_ID: &'static str = "crow-tuning";

    /// Load tuning embedded in the page (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let text = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(Self::ELEMENT_ID))
            .and_then(|el| el.text_content());

        if let Some(json) = text {
            match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from page");
                    return tuning;
                }
                Err(e) => log::warn!("Ignoring invalid tuning: {}", e),
            }
        }

        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}
