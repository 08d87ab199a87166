//! Event sink contract
//!
//! The resolver never renders, plays audio or touches score state. It reports
//! outcomes through [`EventSink`], whose methods all default to no-ops, so a
//! collaborator only implements the events it cares about and `()` is a valid
//! sink that ignores everything.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{BossKind, EnemyKind, PowerUpKind};
use crate::audio::SoundEffect;

/// RGBA color for floating text
pub type Color = [f32; 4];

pub const COLOR_SPLIT: Color = [1.0, 0.6, 0.1, 1.0];
pub const COLOR_LEVEL_UP: Color = [1.0, 0.85, 0.2, 1.0];
pub const COLOR_POSITIVE: Color = [0.3, 1.0, 0.4, 1.0];
pub const COLOR_NEGATIVE: Color = [1.0, 0.25, 0.25, 1.0];

/// Draw requests for the renderer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum VisualEffect {
    Explosion { pos: Vec2, radius: f32 },
    /// Projectile impact spark
    Impact { pos: Vec2 },
    FloatingText {
        pos: Vec2,
        text: &'static str,
        color: Color,
    },
}

/// Entity creation the core asks collaborators to perform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SpawnRequest {
    /// Drop a power-up (type chosen by the spawner)
    PowerUp { pos: Vec2 },
    /// Replace a dead splitter with two weaker children
    SplitEnemy {
        parent: usize,
        kind: EnemyKind,
        pos: Vec2,
        radius: f32,
    },
}

/// A chaining projectile struck an enemy; continuation lives with the caller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChainHit {
    /// Index into the projectile container
    pub projectile: usize,
    /// Index into the enemy container
    pub enemy: usize,
    pub pos: Vec2,
    pub remaining: u32,
    pub damage: f32,
}

/// Observer for collision outcomes
pub trait EventSink {
    fn effect(&mut self, _effect: VisualEffect) {}

    fn sound(&mut self, _sound: SoundEffect) {}

    fn screen_shake(&mut self, _magnitude: f32) {}

    fn score_added(&mut self, _points: u64) {}

    /// An enemy died (progression/achievements)
    fn enemy_killed(&mut self, _kind: EnemyKind, _points: u32) {}

    fn boss_defeated(&mut self, _kind: BossKind, _pos: Vec2) {}

    /// Health damage the player actually took
    fn player_damaged(&mut self, _amount: f32) {}

    /// The player's health reached zero this frame
    fn player_killed(&mut self, _pos: Vec2) {}

    fn powerup_collected(&mut self, _kind: PowerUpKind) {}

    fn spawn_request(&mut self, _request: SpawnRequest) {}

    fn chain_lightning(&mut self, _hit: ChainHit) {}
}

/// Null sink
impl EventSink for () {}

/// Tagged event, one variant per [`EventSink`] method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum GameEvent {
    Effect(VisualEffect),
    Sound(SoundEffect),
    ScreenShake(f32),
    ScoreAdded(u64),
    EnemyKilled { kind: EnemyKind, points: u32 },
    BossDefeated { kind: BossKind, pos: Vec2 },
    PlayerDamaged(f32),
    PlayerKilled { pos: Vec2 },
    PowerUpCollected(PowerUpKind),
    Spawn(SpawnRequest),
    ChainLightning(ChainHit),
}

/// Sink that records every event for the host to drain after the frame
#[derive(Debug, Clone, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Count events matching a predicate
    pub fn count(&self, pred: impl Fn(&GameEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl EventSink for EventQueue {
    fn effect(&mut self, effect: VisualEffect) {
        self.events.push(GameEvent::Effect(effect));
    }

    fn sound(&mut self, sound: SoundEffect) {
        self.events.push(GameEvent::Sound(sound));
    }

    fn screen_shake(&mut self, magnitude: f32) {
        self.events.push(GameEvent::ScreenShake(magnitude));
    }

    fn score_added(&mut self, points: u64) {
        self.events.push(GameEvent::ScoreAdded(points));
    }

    fn enemy_killed(&mut self, kind: EnemyKind, points: u32) {
        self.events.push(GameEvent::EnemyKilled { kind, points });
    }

    fn boss_defeated(&mut self, kind: BossKind, pos: Vec2) {
        self.events.push(GameEvent::BossDefeated { kind, pos });
    }

    fn player_damaged(&mut self, amount: f32) {
        self.events.push(GameEvent::PlayerDamaged(amount));
    }

    fn player_killed(&mut self, pos: Vec2) {
        self.events.push(GameEvent::PlayerKilled { pos });
    }

    fn powerup_collected(&mut self, kind: PowerUpKind) {
        self.events.push(GameEvent::PowerUpCollected(kind));
    }

    fn spawn_request(&mut self, request: SpawnRequest) {
        self.events.push(GameEvent::Spawn(request));
    }

    fn chain_lightning(&mut self, hit: ChainHit) {
        self.events.push(GameEvent::ChainLightning(hit));
    }
}
