//! Sound effect identifiers
//!
//! The collision core never plays audio itself. It names the cue and the
//! audio collaborator decides how to synthesize it.

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Something hit the player (or a negative mystery effect)
    Hit,
    /// Small enemy or small asteroid destroyed
    ExplosionSmall,
    /// Medium enemy or medium asteroid destroyed
    ExplosionMedium,
    /// Large enemy, large asteroid or the player destroyed
    ExplosionLarge,
    /// Player touched an asteroid
    AsteroidHit,
    /// Power-up collected
    PowerUpCollect,
    /// Weapon tier increased
    LevelUp,
}

/// Explosion size bucket, shared by enemies and asteroids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExplosionSize {
    Small,
    Medium,
    Large,
}

impl ExplosionSize {
    /// The explosion sound for this bucket
    pub fn sound(self) -> SoundEffect {
        match self {
            ExplosionSize::Small => SoundEffect::ExplosionSmall,
            ExplosionSize::Medium => SoundEffect::ExplosionMedium,
            ExplosionSize::Large => SoundEffect::ExplosionLarge,
        }
    }
}
