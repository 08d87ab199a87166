//! Collision tuning and difficulty presets
//!
//! Loaded from JSON by the host; every field falls back to the reference
//! value when missing.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tuning load/validation errors
#[derive(thiserror::Error, Debug)]
pub enum TuningError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value is out of its valid range
    #[error("Invalid tuning value: {0}")]
    Invalid(String),
}

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
    Nightmare,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
            Difficulty::Nightmare => "Nightmare",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            "nightmare" => Some(Difficulty::Nightmare),
            _ => None,
        }
    }

    /// Multiplier applied to all contact damage dealt to the player
    pub fn damage_multiplier(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
            Difficulty::Nightmare => 2.0,
        }
    }
}

/// Challenge-mode modifiers supplied per frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChallengeModifiers {
    /// Scales the power-up drop chance of killed enemies
    pub powerup_spawn_rate: f32,
}

impl Default for ChallengeModifiers {
    fn default() -> Self {
        Self {
            powerup_spawn_rate: 1.0,
        }
    }
}

/// Collision tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    /// Spatial grid cell size
    pub cell_size: f32,
    /// Padding added to a projectile's radius for grid queries
    pub query_padding: f32,

    // === Contact damage (before difficulty multiplier) ===
    pub enemy_contact_damage: f32,
    pub boss_contact_damage: f32,
    pub asteroid_contact_damage: f32,
    /// Fraction of the boss radius used for body contact
    pub boss_contact_radius_scale: f32,

    // === Screen shake ===
    pub shake_enemy_killed: f32,
    pub shake_boss_hit: f32,
    pub shake_boss_defeated: f32,
    pub shake_player_hit: f32,
    pub shake_enemy_contact: f32,
    pub shake_boss_contact: f32,
    pub shake_asteroid_contact: f32,

    // === Rewards ===
    /// Base power-up drop chance per killed enemy (0.0 - 1.0)
    pub powerup_drop_chance: f64,
    pub asteroid_base_score: u64,

    // === Effects ===
    pub parry_explosion_radius: f32,
    pub player_death_explosion_radius: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            cell_size: GRID_CELL_SIZE,
            query_padding: PROJECTILE_QUERY_PADDING,

            enemy_contact_damage: ENEMY_CONTACT_DAMAGE,
            boss_contact_damage: BOSS_CONTACT_DAMAGE,
            asteroid_contact_damage: ASTEROID_CONTACT_DAMAGE,
            boss_contact_radius_scale: BOSS_CONTACT_RADIUS_SCALE,

            shake_enemy_killed: SHAKE_ENEMY_KILLED,
            shake_boss_hit: SHAKE_BOSS_HIT,
            shake_boss_defeated: SHAKE_BOSS_DEFEATED,
            shake_player_hit: SHAKE_PLAYER_HIT,
            shake_enemy_contact: SHAKE_ENEMY_CONTACT,
            shake_boss_contact: SHAKE_BOSS_CONTACT,
            shake_asteroid_contact: SHAKE_ASTEROID_CONTACT,

            powerup_drop_chance: POWERUP_DROP_CHANCE,
            asteroid_base_score: ASTEROID_BASE_SCORE,

            parry_explosion_radius: PARRY_EXPLOSION_RADIUS,
            player_death_explosion_radius: PLAYER_DEATH_EXPLOSION_RADIUS,
        }
    }
}

impl CollisionTuning {
    /// Parse tuning from a JSON string and validate it
    pub fn from_json_str(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let tuning = Self::from_json_str(&json)?;
        log::info!("Loaded collision tuning from {}", path.display());
        Ok(tuning)
    }

    /// Reject values the resolver cannot work with
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.cell_size <= 0.0 || !self.cell_size.is_finite() {
            return Err(TuningError::Invalid(format!(
                "cell_size must be positive, got {}",
                self.cell_size
            )));
        }
        if self.query_padding < 0.0 {
            return Err(TuningError::Invalid(format!(
                "query_padding must not be negative, got {}",
                self.query_padding
            )));
        }
        let damages = [
            ("enemy_contact_damage", self.enemy_contact_damage),
            ("boss_contact_damage", self.boss_contact_damage),
            ("asteroid_contact_damage", self.asteroid_contact_damage),
        ];
        for (name, value) in damages {
            if value < 0.0 {
                return Err(TuningError::Invalid(format!(
                    "{name} must not be negative, got {value}"
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.powerup_drop_chance) {
            return Err(TuningError::Invalid(format!(
                "powerup_drop_chance must be within 0..=1, got {}",
                self.powerup_drop_chance
            )));
        }
        Ok(())
    }
}
