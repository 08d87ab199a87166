//! Collision simulation module
//!
//! Everything that runs inside one fixed-rate frame lives here:
//! - Circle overlap primitive
//! - Uniform grid rebuilt every frame
//! - Eight-phase collision resolver
//! - Event sink through which all consequences leave the core
//!
//! No rendering, audio or persistence dependencies.

pub mod entity;
pub mod events;
pub mod geometry;
pub mod grid;
pub mod resolver;
pub mod world;

pub use entity::{
    Asteroid, AsteroidSize, Boss, BossKind, Burn, BurnEffect, Damageable, Enemy, EnemyKind,
    MysteryEffect, Player, PowerUp, PowerUpKind, Projectile,
};
pub use events::{ChainHit, EventQueue, EventSink, GameEvent, SpawnRequest, VisualEffect};
pub use geometry::{Collider, circles_overlap};
pub use grid::{EntityRef, SpatialGrid};
pub use resolver::{CollisionResolver, FrameEntities, FrameParams, ResolveStats};
pub use world::{TickInput, World, tick};
