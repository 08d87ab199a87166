//! Collidable entity types
//!
//! Entities live in dense per-type containers owned by the host. The `active`
//! flag is a tombstone: the resolver flips it, and the host compacts
//! containers once per frame. Health only ever changes through
//! [`Damageable::take_damage`], so shield and armor rules stay with each type.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::geometry::Collider;
use crate::audio::ExplosionSize;
use crate::consts::*;

/// Damage intake capability
pub trait Damageable {
    /// Apply `amount` of incoming damage, returning how much reached health
    fn take_damage(&mut self, amount: f32) -> f32;
    /// True once health has dropped to zero or below
    fn is_dead(&self) -> bool;
}

macro_rules! impl_collider {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Collider for $ty {
                #[inline]
                fn pos(&self) -> Vec2 {
                    self.pos
                }

                #[inline]
                fn radius(&self) -> f32 {
                    self.radius
                }
            }
        )*
    };
}

impl_collider!(Player, Enemy, Boss, Projectile, PowerUp, Asteroid);

/// Absorb as much of `amount` as `shield` allows, returning the remainder
fn absorb(shield: &mut f32, amount: f32) -> f32 {
    let absorbed = shield.min(amount).max(0.0);
    *shield -= absorbed;
    amount - absorbed
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// The player ship
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    /// Absorbs damage before health
    pub shield: f32,
    pub max_shield: f32,
    /// While > 0, incoming hits are parried instead of dealt
    pub dash_timer: f32,
    /// Weapon tier (1 - PLAYER_MAX_WEAPON_LEVEL)
    pub weapon_level: u8,
    /// Remaining speed boost (seconds)
    pub speed_boost_timer: f32,
    pub active: bool,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            radius: PLAYER_RADIUS,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            shield: 0.0,
            max_shield: PLAYER_MAX_SHIELD,
            dash_timer: 0.0,
            weapon_level: 1,
            speed_boost_timer: 0.0,
            active: true,
        }
    }

    /// Start a dash (grants a short invincibility window)
    pub fn start_dash(&mut self) {
        self.dash_timer = DASH_DURATION;
    }

    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Count down dash and speed boost timers
    pub fn tick_timers(&mut self, dt: f32) {
        self.dash_timer = (self.dash_timer - dt).max(0.0);
        self.speed_boost_timer = (self.speed_boost_timer - dt).max(0.0);
    }

    /// Apply a deterministic power-up. Returns true if any stat changed.
    ///
    /// `Mystery` is rolled through [`Player::apply_mystery`] instead and is a
    /// no-op here.
    pub fn apply_powerup(&mut self, kind: PowerUpKind) -> bool {
        match kind {
            PowerUpKind::Health => {
                let before = self.health;
                self.health = (self.health + HEALTH_PICKUP_AMOUNT).min(self.max_health);
                self.health > before
            }
            PowerUpKind::Shield => {
                let before = self.shield;
                self.shield = (self.shield + SHIELD_PICKUP_AMOUNT).min(self.max_shield);
                self.shield > before
            }
            PowerUpKind::Speed => {
                self.speed_boost_timer = SPEED_BOOST_DURATION;
                true
            }
            PowerUpKind::Weapon => {
                if self.weapon_level < PLAYER_MAX_WEAPON_LEVEL {
                    self.weapon_level += 1;
                    true
                } else {
                    false
                }
            }
            PowerUpKind::Mystery => false,
        }
    }

    /// Roll and apply a random mystery effect
    pub fn apply_mystery(&mut self, rng: &mut impl Rng) -> MysteryEffect {
        let effect = MysteryEffect::ALL[rng.random_range(0..MysteryEffect::ALL.len())];
        match effect {
            MysteryEffect::FullHeal => self.health = self.max_health,
            MysteryEffect::FullShield => self.shield = self.max_shield,
            MysteryEffect::Overdrive => {
                self.weapon_level = (self.weapon_level + 1).min(PLAYER_MAX_WEAPON_LEVEL);
            }
            MysteryEffect::Afterburner => self.speed_boost_timer = SPEED_BOOST_DURATION * 2.0,
            // Never lethal
            MysteryEffect::HullBreach => self.health = (self.health - 20.0).max(1.0),
            MysteryEffect::Jammed => self.weapon_level = self.weapon_level.saturating_sub(1).max(1),
            MysteryEffect::ShieldCollapse => self.shield = 0.0,
        }
        effect
    }
}

impl Damageable for Player {
    fn take_damage(&mut self, amount: f32) -> f32 {
        let through = absorb(&mut self.shield, amount.max(0.0));
        self.health = (self.health - through).max(0.0);
        through
    }

    fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

/// Outcome of a mystery power-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MysteryEffect {
    FullHeal,
    FullShield,
    Overdrive,
    Afterburner,
    HullBreach,
    Jammed,
    ShieldCollapse,
}

impl MysteryEffect {
    pub const ALL: [MysteryEffect; 7] = [
        MysteryEffect::FullHeal,
        MysteryEffect::FullShield,
        MysteryEffect::Overdrive,
        MysteryEffect::Afterburner,
        MysteryEffect::HullBreach,
        MysteryEffect::Jammed,
        MysteryEffect::ShieldCollapse,
    ];

    pub fn is_positive(&self) -> bool {
        matches!(
            self,
            MysteryEffect::FullHeal
                | MysteryEffect::FullShield
                | MysteryEffect::Overdrive
                | MysteryEffect::Afterburner
        )
    }

    /// Floating text shown on pickup
    pub fn label(&self) -> &'static str {
        match self {
            MysteryEffect::FullHeal => "FULL HEAL!",
            MysteryEffect::FullShield => "SHIELDS UP!",
            MysteryEffect::Overdrive => "OVERDRIVE!",
            MysteryEffect::Afterburner => "AFTERBURNER!",
            MysteryEffect::HullBreach => "HULL BREACH!",
            MysteryEffect::Jammed => "JAMMED!",
            MysteryEffect::ShieldCollapse => "SHIELDS DOWN!",
        }
    }
}

// ---------------------------------------------------------------------------
// Enemies
// ---------------------------------------------------------------------------

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Drone,
    Fighter,
    /// Breaks into two weaker enemies on death
    Splitter,
    Bomber,
    /// Carries a shield that soaks damage before health
    Shielder,
    Tank,
}

impl EnemyKind {
    pub fn max_health(&self) -> f32 {
        match self {
            Self::Drone => 10.0,
            Self::Fighter => 20.0,
            Self::Splitter => 40.0,
            Self::Bomber => 60.0,
            Self::Shielder => 50.0,
            Self::Tank => 150.0,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Self::Drone => 12.0,
            Self::Fighter => 16.0,
            Self::Splitter => 22.0,
            Self::Bomber => 26.0,
            Self::Shielder => 24.0,
            Self::Tank => 36.0,
        }
    }

    pub fn points(&self) -> u32 {
        match self {
            Self::Drone => 10,
            Self::Fighter => 25,
            Self::Splitter => 50,
            Self::Bomber => 75,
            Self::Shielder => 80,
            Self::Tank => 150,
        }
    }

    pub fn base_shield(&self) -> f32 {
        match self {
            Self::Shielder => 40.0,
            _ => 0.0,
        }
    }

    /// Explosion bucket used for the death sound
    pub fn explosion_size(&self) -> ExplosionSize {
        match self {
            Self::Drone | Self::Fighter => ExplosionSize::Small,
            Self::Splitter | Self::Bomber => ExplosionSize::Medium,
            Self::Shielder | Self::Tank => ExplosionSize::Large,
        }
    }

    pub fn splits_on_death(&self) -> bool {
        *self == Self::Splitter
    }
}

/// Damage over time applied by burning projectiles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Burn {
    /// Seconds left
    pub remaining: f32,
    pub damage_per_sec: f32,
}

/// An enemy entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub shield: f32,
    /// Score awarded on death
    pub points: u32,
    pub burn: Option<Burn>,
    pub active: bool,
}

impl Enemy {
    pub fn new(kind: EnemyKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: kind.radius(),
            health: kind.max_health(),
            shield: kind.base_shield(),
            points: kind.points(),
            burn: None,
            active: true,
        }
    }

    /// Start or refresh burning. A refresh keeps the stronger damage rate.
    pub fn apply_burn(&mut self, duration: f32, damage_per_sec: f32) {
        if duration <= 0.0 || damage_per_sec <= 0.0 {
            return;
        }
        self.burn = Some(match self.burn {
            Some(current) => Burn {
                remaining: current.remaining.max(duration),
                damage_per_sec: current.damage_per_sec.max(damage_per_sec),
            },
            None => Burn {
                remaining: duration,
                damage_per_sec,
            },
        });
    }

    /// Advance burning by `dt`, returning the damage dealt this step.
    /// Burn bypasses the shield.
    pub fn tick_burn(&mut self, dt: f32) -> f32 {
        let Some(mut burn) = self.burn else {
            return 0.0;
        };
        let step = dt.min(burn.remaining);
        let damage = burn.damage_per_sec * step;
        self.health -= damage;
        burn.remaining -= step;
        self.burn = if burn.remaining > 0.0 { Some(burn) } else { None };
        damage
    }
}

impl Damageable for Enemy {
    fn take_damage(&mut self, amount: f32) -> f32 {
        let through = absorb(&mut self.shield, amount.max(0.0));
        self.health -= through;
        through
    }

    fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Boss
// ---------------------------------------------------------------------------

/// Boss types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BossKind {
    Dreadnought,
    Hive,
    Leviathan,
}

impl BossKind {
    pub fn max_health(&self) -> f32 {
        match self {
            Self::Dreadnought => 500.0,
            Self::Hive => 1200.0,
            Self::Leviathan => 3000.0,
        }
    }

    pub fn radius(&self) -> f32 {
        match self {
            Self::Dreadnought => 60.0,
            Self::Hive => 72.0,
            Self::Leviathan => 96.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Dreadnought => "Dreadnought",
            Self::Hive => "Hive",
            Self::Leviathan => "Leviathan",
        }
    }
}

/// The boss (at most one per frame)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub kind: BossKind,
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub active: bool,
}

impl Boss {
    pub fn new(kind: BossKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: kind.radius(),
            health: kind.max_health(),
            max_health: kind.max_health(),
            active: true,
        }
    }

    /// Apply a hit. Returns true if this hit defeated the boss.
    pub fn apply_hit(&mut self, amount: f32) -> bool {
        let was_dead = self.is_dead();
        self.take_damage(amount);
        !was_dead && self.is_dead()
    }
}

impl Damageable for Boss {
    fn take_damage(&mut self, amount: f32) -> f32 {
        let amount = amount.max(0.0);
        self.health -= amount;
        amount
    }

    fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}

// ---------------------------------------------------------------------------
// Projectiles
// ---------------------------------------------------------------------------

/// Burn payload carried by a projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BurnEffect {
    pub duration: f32,
    pub damage_per_sec: f32,
}

/// A projectile entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    /// Integrated by the host; the resolver never reads it
    pub vel: Vec2,
    pub radius: f32,
    pub damage: f32,
    /// Player-owned (true) or enemy-owned (false)
    pub friendly: bool,
    /// Survives hitting an enemy (beam weapons)
    pub piercing: bool,
    pub burn: Option<BurnEffect>,
    /// Triggers chain lightning on hit while `chain_count > 0`
    pub chaining: bool,
    pub chain_count: u32,
    pub active: bool,
}

impl Projectile {
    fn new(pos: Vec2, radius: f32, damage: f32, friendly: bool) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            radius,
            damage,
            friendly,
            piercing: false,
            burn: None,
            chaining: false,
            chain_count: 0,
            active: true,
        }
    }

    /// Player-owned projectile
    pub fn friendly(pos: Vec2, radius: f32, damage: f32) -> Self {
        Self::new(pos, radius, damage, true)
    }

    /// Enemy-owned projectile
    pub fn hostile(pos: Vec2, radius: f32, damage: f32) -> Self {
        Self::new(pos, radius, damage, false)
    }

    pub fn with_velocity(mut self, vel: Vec2) -> Self {
        self.vel = vel;
        self
    }

    pub fn piercing(mut self) -> Self {
        self.piercing = true;
        self
    }

    pub fn with_burn(mut self, duration: f32, damage_per_sec: f32) -> Self {
        self.burn = Some(BurnEffect {
            duration,
            damage_per_sec,
        });
        self
    }

    pub fn with_chain(mut self, count: u32) -> Self {
        self.chaining = true;
        self.chain_count = count;
        self
    }

    /// Chain lightning should fire on the next hit
    pub fn chains(&self) -> bool {
        self.chaining && self.chain_count > 0
    }
}

// ---------------------------------------------------------------------------
// Power-ups
// ---------------------------------------------------------------------------

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Shield,
    Weapon,
    Speed,
    Mystery,
}

/// A power-up entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub kind: PowerUpKind,
    pub pos: Vec2,
    pub radius: f32,
    pub active: bool,
}

impl PowerUp {
    pub fn new(kind: PowerUpKind, pos: Vec2) -> Self {
        Self {
            kind,
            pos,
            radius: POWERUP_RADIUS,
            active: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Asteroids
// ---------------------------------------------------------------------------

/// Asteroid size classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AsteroidSize {
    Small,
    Medium,
    Large,
}

impl AsteroidSize {
    pub fn from_radius(radius: f32) -> Self {
        if radius < 20.0 {
            Self::Small
        } else if radius < 40.0 {
            Self::Medium
        } else {
            Self::Large
        }
    }

    pub fn explosion_size(&self) -> ExplosionSize {
        match self {
            Self::Small => ExplosionSize::Small,
            Self::Medium => ExplosionSize::Medium,
            Self::Large => ExplosionSize::Large,
        }
    }
}

/// An asteroid entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Asteroid {
    pub pos: Vec2,
    pub radius: f32,
    pub health: f32,
    pub active: bool,
}

impl Asteroid {
    /// Health scales with size
    pub fn new(pos: Vec2, radius: f32) -> Self {
        Self {
            pos,
            radius,
            health: radius,
            active: true,
        }
    }

    pub fn size(&self) -> AsteroidSize {
        AsteroidSize::from_radius(self.radius)
    }
}

impl Damageable for Asteroid {
    /// Deactivates itself once health is gone
    fn take_damage(&mut self, amount: f32) -> f32 {
        let amount = amount.max(0.0);
        self.health -= amount;
        if self.health <= 0.0 {
            self.active = false;
        }
        amount
    }

    fn is_dead(&self) -> bool {
        self.health <= 0.0
    }
}
