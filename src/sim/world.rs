//! Entity containers and the per-frame step
//!
//! `World` is the host side of the collision core: dense `Vec`s per entity
//! type, an optional player and boss, and the once-per-frame compaction pass
//! that drops tombstoned entries.

use serde::{Deserialize, Serialize};

use super::entity::{Asteroid, Boss, Damageable, Enemy, Player, PowerUp, Projectile};
use super::events::EventSink;
use super::resolver::{CollisionResolver, FrameEntities, FrameParams, ResolveStats};
use crate::settings::{ChallengeModifiers, Difficulty};

/// All live entities
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct World {
    pub player: Option<Player>,
    pub enemies: Vec<Enemy>,
    pub boss: Option<Boss>,
    pub projectiles: Vec<Projectile>,
    pub powerups: Vec<PowerUp>,
    pub asteroids: Vec<Asteroid>,
    /// Elapsed game time (seconds)
    pub elapsed: f32,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_player(player: Player) -> Self {
        Self {
            player: Some(player),
            ..Default::default()
        }
    }

    /// Borrow every container for one resolve call
    pub fn frame(&mut self) -> FrameEntities<'_> {
        FrameEntities {
            player: self.player.as_mut(),
            enemies: &mut self.enemies,
            boss: self.boss.as_mut(),
            projectiles: &mut self.projectiles,
            powerups: &mut self.powerups,
            asteroids: &mut self.asteroids,
        }
    }

    /// Remove inactive entities, including a defeated boss. Returns how many
    /// were dropped.
    ///
    /// Indices carried by events from the last frame are invalid afterwards,
    /// so hosts drain events first.
    pub fn compact(&mut self) -> usize {
        let before = self.entity_count();
        self.enemies.retain(|e| e.active);
        self.projectiles.retain(|p| p.active);
        self.powerups.retain(|p| p.active);
        self.asteroids.retain(|a| a.active);
        let boss_removed = self.boss.take_if(|b| !b.active).is_some();
        let removed = before - self.entity_count() + usize::from(boss_removed);
        if removed > 0 {
            log::trace!("compacted {} inactive entities", removed);
        }
        removed
    }

    /// Entities held in the per-type containers (excludes player and boss)
    pub fn entity_count(&self) -> usize {
        self.enemies.len() + self.projectiles.len() + self.powerups.len() + self.asteroids.len()
    }

    /// True once the player is gone or destroyed
    pub fn is_game_over(&self) -> bool {
        self.player.as_ref().is_none_or(|p| !p.active)
    }
}

/// Per-frame host input
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub difficulty: Difficulty,
    pub modifiers: ChallengeModifiers,
}

/// Advance timers and burn damage, then resolve collisions.
///
/// Compaction is left to the caller so event indices stay valid until the
/// events have been consumed.
pub fn tick<S: EventSink + ?Sized>(
    world: &mut World,
    resolver: &mut CollisionResolver,
    input: &TickInput,
    dt: f32,
    sink: &mut S,
) -> ResolveStats {
    world.elapsed += dt;

    let invincibility_timer = match world.player.as_mut() {
        Some(player) => {
            player.tick_timers(dt);
            player.dash_timer
        }
        None => 0.0,
    };

    let params = FrameParams {
        game_time: world.elapsed,
        invincibility_timer,
        damage_multiplier: input.difficulty.damage_multiplier(),
        powerup_spawn_rate: input.modifiers.powerup_spawn_rate,
    };

    // Burn kills go through the same death resolution as projectile kills
    let mut burned = 0;
    for (i, enemy) in world.enemies.iter_mut().enumerate() {
        if !enemy.active {
            continue;
        }
        if enemy.tick_burn(dt) > 0.0 && enemy.is_dead() {
            resolver.kill_enemy(i, enemy, &params, sink);
            burned += 1;
        }
    }

    let mut stats = resolver.resolve(&mut world.frame(), &params, sink);
    stats.enemies_killed += burned;
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::entity::{BossKind, EnemyKind, PowerUpKind};
    use crate::sim::events::{EventQueue, GameEvent};
    use glam::Vec2;

    #[test]
    fn test_compact_drops_inactive() {
        let mut world = World::with_player(Player::new(Vec2::ZERO));
        world.enemies.push(Enemy::new(EnemyKind::Drone, Vec2::new(500.0, 0.0)));
        world.enemies.push(Enemy::new(EnemyKind::Drone, Vec2::new(600.0, 0.0)));
        world.enemies[0].active = false;
        world.powerups.push(PowerUp::new(PowerUpKind::Health, Vec2::new(300.0, 0.0)));
        world.powerups[0].active = false;

        assert_eq!(world.compact(), 2);
        assert_eq!(world.enemies.len(), 1);
        assert_eq!(world.enemies[0].pos.x, 600.0);
        assert!(world.powerups.is_empty());
        assert_eq!(world.compact(), 0);
    }

    #[test]
    fn test_burn_kill_goes_through_death_resolution() {
        let mut world = World::with_player(Player::new(Vec2::ZERO));
        let mut enemy = Enemy::new(EnemyKind::Fighter, Vec2::new(400.0, 400.0));
        enemy.health = 1.0;
        enemy.apply_burn(1.0, 120.0);
        world.enemies.push(enemy);

        let mut resolver = CollisionResolver::default();
        let mut queue = EventQueue::new();
        let stats = tick(&mut world, &mut resolver, &TickInput::default(), SIM_DT, &mut queue);

        assert!(!world.enemies[0].active);
        assert_eq!(stats.enemies_killed, 1);
        assert_eq!(
            queue.count(|e| matches!(e, GameEvent::EnemyKilled { points: 25, .. })),
            1
        );
    }

    #[test]
    fn test_tick_counts_down_dash() {
        let mut player = Player::new(Vec2::ZERO);
        player.start_dash();
        let mut world = World::with_player(player);
        let mut resolver = CollisionResolver::default();

        for _ in 0..30 {
            tick(&mut world, &mut resolver, &TickInput::default(), SIM_DT, &mut ());
        }
        assert!(!world.player.as_ref().unwrap().is_dashing());
        assert!((world.elapsed - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_difficulty_scales_contact_damage() {
        let mut world = World::with_player(Player::new(Vec2::ZERO));
        world.enemies.push(Enemy::new(EnemyKind::Drone, Vec2::new(5.0, 0.0)));
        let mut resolver = CollisionResolver::default();
        let input = TickInput {
            difficulty: Difficulty::Easy,
            ..Default::default()
        };
        tick(&mut world, &mut resolver, &input, SIM_DT, &mut ());

        let player = world.player.as_ref().unwrap();
        assert!((player.health - 85.0).abs() < 0.001);
    }

    #[test]
    fn test_compact_drops_defeated_boss() {
        let mut world = World::new();
        world.boss = Some(Boss::new(BossKind::Hive, Vec2::ZERO));
        assert_eq!(world.compact(), 0);
        assert!(world.boss.is_some());

        world.boss.as_mut().unwrap().active = false;
        assert_eq!(world.compact(), 1);
        assert!(world.boss.is_none());
    }

    #[test]
    fn test_game_over() {
        let mut world = World::new();
        assert!(world.is_game_over());
        world.player = Some(Player::new(Vec2::ZERO));
        assert!(!world.is_game_over());
        world.player.as_mut().unwrap().active = false;
        assert!(world.is_game_over());
    }
}
