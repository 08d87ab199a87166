//! Void Blaster - collision core for a top-down arcade shooter
//!
//! Core modules:
//! - `sim`: Per-frame overlap detection and resolution (grid, resolver, events)
//! - `audio`: Sound effect identifiers emitted by the resolver
//! - `settings`: Data-driven collision tuning and difficulty presets

pub mod audio;
pub mod settings;
pub mod sim;

pub use audio::{ExplosionSize, SoundEffect};
pub use settings::{ChallengeModifiers, CollisionTuning, Difficulty, TuningError};

/// Game configuration constants (reference tuning values)
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield dimensions
    pub const PLAYFIELD_WIDTH: f32 = 1280.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;

    /// Spatial grid cell size
    pub const GRID_CELL_SIZE: f32 = 100.0;
    /// Extra query radius for projectile lookups (fast projectiles cross cells)
    pub const PROJECTILE_QUERY_PADDING: f32 = 50.0;

    /// Contact damage before the difficulty multiplier
    pub const ENEMY_CONTACT_DAMAGE: f32 = 30.0;
    pub const BOSS_CONTACT_DAMAGE: f32 = 50.0;
    pub const ASTEROID_CONTACT_DAMAGE: f32 = 15.0;

    /// Boss body contact uses a fraction of its full radius
    pub const BOSS_CONTACT_RADIUS_SCALE: f32 = 0.5;

    /// Screen shake magnitudes
    pub const SHAKE_ENEMY_KILLED: f32 = 5.0;
    pub const SHAKE_BOSS_HIT: f32 = 3.0;
    pub const SHAKE_BOSS_DEFEATED: f32 = 20.0;
    pub const SHAKE_PLAYER_HIT: f32 = 10.0;
    pub const SHAKE_ENEMY_CONTACT: f32 = 15.0;
    pub const SHAKE_BOSS_CONTACT: f32 = 20.0;
    pub const SHAKE_ASTEROID_CONTACT: f32 = 8.0;

    /// Base chance of a power-up dropping from a killed enemy
    pub const POWERUP_DROP_CHANCE: f64 = 0.15;

    /// Base score for a destroyed asteroid (radius is added on top)
    pub const ASTEROID_BASE_SCORE: u64 = 10;

    /// Explosion radius for a dash parry
    pub const PARRY_EXPLOSION_RADIUS: f32 = 12.0;
    /// Explosion radius when the player dies
    pub const PLAYER_DEATH_EXPLOSION_RADIUS: f32 = 80.0;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 20.0;
    pub const PLAYER_MAX_HEALTH: f32 = 100.0;
    pub const PLAYER_MAX_SHIELD: f32 = 100.0;
    pub const PLAYER_MAX_WEAPON_LEVEL: u8 = 5;
    pub const DASH_DURATION: f32 = 0.25;

    /// Power-up amounts
    pub const HEALTH_PICKUP_AMOUNT: f32 = 25.0;
    pub const SHIELD_PICKUP_AMOUNT: f32 = 50.0;
    pub const SPEED_BOOST_DURATION: f32 = 8.0;
    pub const POWERUP_RADIUS: f32 = 12.0;
}
