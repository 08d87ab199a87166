//! Per-frame collision resolution
//!
//! One call to [`CollisionResolver::resolve`] rebuilds the spatial grid and
//! runs eight phases in a fixed order:
//!
//! 1. friendly projectiles vs enemies (grid)
//! 2. friendly projectiles vs boss
//! 3. hostile projectiles vs player
//! 4. enemy body contact vs player
//! 5. boss body contact vs player
//! 6. power-ups vs player
//! 7. asteroids vs player
//! 8. friendly projectiles vs asteroids
//!
//! Later phases observe the `active`/health changes made by earlier ones, so
//! every loop re-checks `active` and the order must not change.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{
    Asteroid, Boss, Damageable, Enemy, Player, PowerUp, PowerUpKind, Projectile,
};
use super::events::{
    COLOR_LEVEL_UP, COLOR_NEGATIVE, COLOR_POSITIVE, COLOR_SPLIT, ChainHit, EventSink,
    SpawnRequest, VisualEffect,
};
use super::geometry::{circles_overlap, colliders_overlap};
use super::grid::SpatialGrid;
use crate::audio::SoundEffect;
use crate::settings::CollisionTuning;

/// Mutable views of the host's entity containers for one frame
pub struct FrameEntities<'a> {
    pub player: Option<&'a mut Player>,
    pub enemies: &'a mut [Enemy],
    pub boss: Option<&'a mut Boss>,
    pub projectiles: &'a mut [Projectile],
    pub powerups: &'a mut [PowerUp],
    pub asteroids: &'a mut [Asteroid],
}

/// Scalars the host supplies every frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameParams {
    /// Elapsed game time (seconds)
    pub game_time: f32,
    /// Player dash/invincibility timer; hits are parried while > 0
    pub invincibility_timer: f32,
    /// Difficulty scale for contact damage
    pub damage_multiplier: f32,
    /// Challenge-mode scale for the power-up drop chance
    pub powerup_spawn_rate: f32,
}

impl Default for FrameParams {
    fn default() -> Self {
        Self {
            game_time: 0.0,
            invincibility_timer: 0.0,
            damage_multiplier: 1.0,
            powerup_spawn_rate: 1.0,
        }
    }
}

/// Counters for one resolve call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Exact circle tests performed
    pub exact_tests: u32,
    /// Overlaps that were resolved
    pub hits: u32,
    pub enemies_killed: u32,
    pub asteroids_destroyed: u32,
    pub powerups_collected: u32,
    pub boss_defeated: bool,
    pub player_killed: bool,
}

/// Collision resolver
///
/// Owns the spatial grid, a scratch buffer for grid queries and the seeded RNG
/// used for drop rolls and mystery power-ups. Holds no entity state between
/// frames.
#[derive(Debug, Clone)]
pub struct CollisionResolver {
    tuning: CollisionTuning,
    grid: SpatialGrid,
    rng: Pcg32,
    candidates: Vec<usize>,
}

impl CollisionResolver {
    pub fn new(tuning: CollisionTuning, seed: u64) -> Self {
        Self {
            grid: SpatialGrid::new(tuning.cell_size),
            tuning,
            rng: Pcg32::seed_from_u64(seed),
            candidates: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &CollisionTuning {
        &self.tuning
    }

    /// Grid as rebuilt by the last resolve call
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    /// Resolve every overlap for one frame
    pub fn resolve<S: EventSink + ?Sized>(
        &mut self,
        frame: &mut FrameEntities<'_>,
        params: &FrameParams,
        sink: &mut S,
    ) -> ResolveStats {
        self.grid.rebuild(
            frame.enemies,
            frame.projectiles,
            frame.powerups,
            frame.asteroids,
        );

        let mut stats = ResolveStats::default();
        let invincible = params.invincibility_timer > 0.0
            || frame.player.as_deref().is_some_and(Player::is_dashing);

        self.projectiles_vs_enemies(frame.projectiles, frame.enemies, params, &mut stats, sink);
        self.projectiles_vs_boss(frame.projectiles, frame.boss.as_deref_mut(), &mut stats, sink);

        if let Some(player) = frame.player.as_deref_mut() {
            self.hostile_projectiles_vs_player(
                frame.projectiles,
                player,
                invincible,
                &mut stats,
                sink,
            );
            self.enemies_vs_player(frame.enemies, player, invincible, params, &mut stats, sink);
            self.boss_vs_player(frame.boss.as_deref_mut(), player, params, &mut stats, sink);
            self.powerups_vs_player(frame.powerups, player, &mut stats, sink);
            self.asteroids_vs_player(frame.asteroids, player, params, &mut stats, sink);
        }

        self.projectiles_vs_asteroids(frame.projectiles, frame.asteroids, &mut stats, sink);

        log::trace!(
            "resolve t={:.2}: {} tests, {} hits, {} kills",
            params.game_time,
            stats.exact_tests,
            stats.hits,
            stats.enemies_killed
        );
        stats
    }

    // ------------------------------------------------------------------
    // Phase 1: friendly projectiles vs enemies
    // ------------------------------------------------------------------

    fn projectiles_vs_enemies<S: EventSink + ?Sized>(
        &mut self,
        projectiles: &mut [Projectile],
        enemies: &mut [Enemy],
        params: &FrameParams,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        if enemies.is_empty() {
            return;
        }
        // Wide enough that the largest indexed entity can never be missed
        let padding = self.tuning.query_padding.max(self.grid.max_radius());
        let mut candidates = std::mem::take(&mut self.candidates);

        for (pi, projectile) in projectiles.iter_mut().enumerate() {
            if !projectile.active || !projectile.friendly {
                continue;
            }
            self.grid
                .query_enemies_into(projectile.pos, projectile.radius + padding, &mut candidates);

            for &ei in &candidates {
                let Some(enemy) = enemies.get_mut(ei) else {
                    continue;
                };
                if !enemy.active {
                    continue;
                }
                stats.exact_tests += 1;
                if !colliders_overlap(&*projectile, &*enemy) {
                    continue;
                }
                stats.hits += 1;

                if !projectile.piercing {
                    projectile.active = false;
                }
                enemy.take_damage(projectile.damage);
                if let Some(burn) = projectile.burn {
                    enemy.apply_burn(burn.duration, burn.damage_per_sec);
                }
                sink.effect(VisualEffect::Impact { pos: enemy.pos });

                if projectile.chains() {
                    sink.chain_lightning(ChainHit {
                        projectile: pi,
                        enemy: ei,
                        pos: enemy.pos,
                        remaining: projectile.chain_count,
                        damage: projectile.damage,
                    });
                }

                if enemy.is_dead() {
                    self.kill_enemy(ei, enemy, params, sink);
                    stats.enemies_killed += 1;
                }

                if !projectile.active {
                    break;
                }
            }
        }

        self.candidates = candidates;
    }

    /// Enemy-death resolution: deactivate and report every consequence.
    ///
    /// Also used for enemies that burn to death outside the resolve call.
    pub fn kill_enemy<S: EventSink + ?Sized>(
        &mut self,
        index: usize,
        enemy: &mut Enemy,
        params: &FrameParams,
        sink: &mut S,
    ) {
        if !enemy.active {
            return;
        }
        enemy.active = false;
        sink.effect(VisualEffect::Explosion {
            pos: enemy.pos,
            radius: enemy.radius,
        });

        if enemy.kind.splits_on_death() {
            sink.effect(VisualEffect::FloatingText {
                pos: enemy.pos,
                text: "SPLIT!",
                color: COLOR_SPLIT,
            });
            sink.spawn_request(SpawnRequest::SplitEnemy {
                parent: index,
                kind: enemy.kind,
                pos: enemy.pos,
                radius: enemy.radius,
            });
            log::debug!("splitter {} split at {:?}", index, enemy.pos);
        }

        sink.sound(enemy.kind.explosion_size().sound());
        sink.score_added(u64::from(enemy.points));
        sink.screen_shake(self.tuning.shake_enemy_killed);
        sink.enemy_killed(enemy.kind, enemy.points);

        let chance = self.tuning.powerup_drop_chance * f64::from(params.powerup_spawn_rate);
        if chance > 0.0 && self.rng.random_bool(chance.min(1.0)) {
            sink.spawn_request(SpawnRequest::PowerUp { pos: enemy.pos });
        }
    }

    // ------------------------------------------------------------------
    // Phase 2: friendly projectiles vs boss
    // ------------------------------------------------------------------

    fn projectiles_vs_boss<S: EventSink + ?Sized>(
        &mut self,
        projectiles: &mut [Projectile],
        boss: Option<&mut Boss>,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        let Some(boss) = boss else {
            return;
        };
        if !boss.active || boss.is_dead() {
            return;
        }

        for projectile in projectiles.iter_mut() {
            if !projectile.active || !projectile.friendly {
                continue;
            }
            stats.exact_tests += 1;
            if !colliders_overlap(&*projectile, &*boss) {
                continue;
            }
            stats.hits += 1;

            if !projectile.piercing {
                projectile.active = false;
            }
            sink.effect(VisualEffect::Impact { pos: projectile.pos });

            if boss.apply_hit(projectile.damage) {
                boss.active = false;
                sink.screen_shake(self.tuning.shake_boss_defeated);
                sink.boss_defeated(boss.kind, boss.pos);
                stats.boss_defeated = true;
                log::debug!("boss {} defeated", boss.kind.name());
                break;
            }
            sink.screen_shake(self.tuning.shake_boss_hit);
        }
    }

    // ------------------------------------------------------------------
    // Phase 3: hostile projectiles vs player
    // ------------------------------------------------------------------

    fn hostile_projectiles_vs_player<S: EventSink + ?Sized>(
        &mut self,
        projectiles: &mut [Projectile],
        player: &mut Player,
        invincible: bool,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        for projectile in projectiles.iter_mut() {
            if !player.active {
                return;
            }
            if !projectile.active || projectile.friendly {
                continue;
            }
            stats.exact_tests += 1;
            if !colliders_overlap(&*projectile, &*player) {
                continue;
            }
            stats.hits += 1;
            projectile.active = false;

            if invincible {
                // Dash parry: the shot is destroyed, the player is untouched
                sink.effect(VisualEffect::Explosion {
                    pos: projectile.pos,
                    radius: self.tuning.parry_explosion_radius,
                });
                continue;
            }

            let dealt = player.take_damage(projectile.damage);
            sink.player_damaged(dealt);
            sink.screen_shake(self.tuning.shake_player_hit);
            sink.sound(SoundEffect::Hit);
            self.check_player_death(player, stats, sink);
        }
    }

    // ------------------------------------------------------------------
    // Phase 4: enemy body contact vs player
    // ------------------------------------------------------------------

    fn enemies_vs_player<S: EventSink + ?Sized>(
        &mut self,
        enemies: &mut [Enemy],
        player: &mut Player,
        invincible: bool,
        params: &FrameParams,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        for enemy in enemies.iter_mut() {
            if !player.active {
                return;
            }
            if !enemy.active {
                continue;
            }
            stats.exact_tests += 1;
            if !colliders_overlap(&*enemy, &*player) {
                continue;
            }
            stats.hits += 1;

            // Rammed enemies are destroyed either way
            enemy.active = false;
            sink.effect(VisualEffect::Explosion {
                pos: enemy.pos,
                radius: enemy.radius,
            });
            sink.sound(enemy.kind.explosion_size().sound());

            if invincible {
                continue;
            }

            sink.sound(SoundEffect::Hit);
            let dealt =
                player.take_damage(self.tuning.enemy_contact_damage * params.damage_multiplier);
            sink.player_damaged(dealt);
            sink.screen_shake(self.tuning.shake_enemy_contact);
            self.check_player_death(player, stats, sink);
        }
    }

    // ------------------------------------------------------------------
    // Phase 5: boss body contact vs player
    // ------------------------------------------------------------------

    /// No dash parry here: boss contact always hurts.
    fn boss_vs_player<S: EventSink + ?Sized>(
        &mut self,
        boss: Option<&mut Boss>,
        player: &mut Player,
        params: &FrameParams,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        let Some(boss) = boss else {
            return;
        };
        if !boss.active || !player.active {
            return;
        }

        stats.exact_tests += 1;
        let contact_radius = boss.radius * self.tuning.boss_contact_radius_scale;
        if !circles_overlap(boss.pos, contact_radius, player.pos, player.radius) {
            return;
        }
        stats.hits += 1;

        let dealt = player.take_damage(self.tuning.boss_contact_damage * params.damage_multiplier);
        sink.player_damaged(dealt);
        sink.screen_shake(self.tuning.shake_boss_contact);
        self.check_player_death(player, stats, sink);
    }

    // ------------------------------------------------------------------
    // Phase 6: power-ups vs player
    // ------------------------------------------------------------------

    fn powerups_vs_player<S: EventSink + ?Sized>(
        &mut self,
        powerups: &mut [PowerUp],
        player: &mut Player,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        for powerup in powerups.iter_mut() {
            if !player.active {
                return;
            }
            if !powerup.active {
                continue;
            }
            stats.exact_tests += 1;
            if !colliders_overlap(&*powerup, &*player) {
                continue;
            }
            stats.hits += 1;
            stats.powerups_collected += 1;

            powerup.active = false;
            sink.powerup_collected(powerup.kind);
            self.apply_powerup(powerup.kind, player, sink);
        }
    }

    fn apply_powerup<S: EventSink + ?Sized>(
        &mut self,
        kind: PowerUpKind,
        player: &mut Player,
        sink: &mut S,
    ) {
        match kind {
            PowerUpKind::Health | PowerUpKind::Shield | PowerUpKind::Speed => {
                sink.sound(SoundEffect::PowerUpCollect);
                player.apply_powerup(kind);
            }
            PowerUpKind::Weapon => {
                if player.apply_powerup(kind) {
                    sink.sound(SoundEffect::LevelUp);
                    sink.effect(VisualEffect::FloatingText {
                        pos: player.pos,
                        text: "WEAPON UP!",
                        color: COLOR_LEVEL_UP,
                    });
                } else {
                    // Already at max tier: no celebration
                    sink.sound(SoundEffect::PowerUpCollect);
                }
            }
            PowerUpKind::Mystery => {
                let effect = player.apply_mystery(&mut self.rng);
                let (color, sound) = if effect.is_positive() {
                    (COLOR_POSITIVE, SoundEffect::PowerUpCollect)
                } else {
                    (COLOR_NEGATIVE, SoundEffect::Hit)
                };
                sink.effect(VisualEffect::FloatingText {
                    pos: player.pos,
                    text: effect.label(),
                    color,
                });
                sink.sound(sound);
            }
        }
    }

    // ------------------------------------------------------------------
    // Phase 7: asteroids vs player
    // ------------------------------------------------------------------

    fn asteroids_vs_player<S: EventSink + ?Sized>(
        &mut self,
        asteroids: &mut [Asteroid],
        player: &mut Player,
        params: &FrameParams,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        for asteroid in asteroids.iter_mut() {
            if !player.active {
                return;
            }
            if !asteroid.active {
                continue;
            }
            stats.exact_tests += 1;
            if !colliders_overlap(&*asteroid, &*player) {
                continue;
            }
            stats.hits += 1;

            let dealt =
                player.take_damage(self.tuning.asteroid_contact_damage * params.damage_multiplier);
            sink.effect(VisualEffect::Explosion {
                pos: asteroid.pos,
                radius: asteroid.radius,
            });
            sink.sound(SoundEffect::AsteroidHit);
            sink.sound(asteroid.size().explosion_size().sound());
            asteroid.active = false;
            sink.player_damaged(dealt);
            sink.screen_shake(self.tuning.shake_asteroid_contact);
            self.check_player_death(player, stats, sink);
        }
    }

    // ------------------------------------------------------------------
    // Phase 8: friendly projectiles vs asteroids
    // ------------------------------------------------------------------

    fn projectiles_vs_asteroids<S: EventSink + ?Sized>(
        &mut self,
        projectiles: &mut [Projectile],
        asteroids: &mut [Asteroid],
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        if asteroids.is_empty() {
            return;
        }

        for projectile in projectiles.iter_mut() {
            if !projectile.active || !projectile.friendly {
                continue;
            }
            for asteroid in asteroids.iter_mut() {
                if !asteroid.active {
                    continue;
                }
                stats.exact_tests += 1;
                if !colliders_overlap(&*projectile, &*asteroid) {
                    continue;
                }
                stats.hits += 1;

                projectile.active = false;
                asteroid.take_damage(projectile.damage);
                sink.effect(VisualEffect::Impact { pos: projectile.pos });

                if asteroid.is_dead() {
                    let size = asteroid.size().explosion_size();
                    sink.effect(VisualEffect::Explosion {
                        pos: asteroid.pos,
                        radius: asteroid.radius,
                    });
                    sink.sound(size.sound());
                    sink.score_added(self.tuning.asteroid_base_score + asteroid.radius as u64);
                    stats.asteroids_destroyed += 1;
                }
                break;
            }
        }
    }

    // ------------------------------------------------------------------

    /// Deactivate the player once health is gone. Runs after every damage
    /// application; the host polls `player.active` for game over.
    fn check_player_death<S: EventSink + ?Sized>(
        &mut self,
        player: &mut Player,
        stats: &mut ResolveStats,
        sink: &mut S,
    ) {
        if !player.active || !player.is_dead() {
            return;
        }
        sink.effect(VisualEffect::Explosion {
            pos: player.pos,
            radius: self.tuning.player_death_explosion_radius,
        });
        sink.sound(SoundEffect::ExplosionLarge);
        player.active = false;
        sink.player_killed(player.pos);
        stats.player_killed = true;
        log::debug!("player destroyed at {:?}", player.pos);
    }
}

impl Default for CollisionResolver {
    fn default() -> Self {
        Self::new(CollisionTuning::default(), 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::{BossKind, EnemyKind, MysteryEffect};
    use crate::sim::events::{EventQueue, GameEvent};
    use crate::sim::world::World;
    use crate::consts::PLAYER_MAX_WEAPON_LEVEL;
    use glam::Vec2;
    use proptest::prelude::*;

    fn run_with(
        resolver: &mut CollisionResolver,
        world: &mut World,
        params: FrameParams,
    ) -> (EventQueue, ResolveStats) {
        let mut queue = EventQueue::new();
        let stats = resolver.resolve(&mut world.frame(), &params, &mut queue);
        (queue, stats)
    }

    fn run(world: &mut World, params: FrameParams) -> (EventQueue, ResolveStats) {
        run_with(&mut CollisionResolver::default(), world, params)
    }

    fn player_at(x: f32, y: f32) -> Player {
        Player::new(Vec2::new(x, y))
    }

    fn has(queue: &EventQueue, event: &GameEvent) -> bool {
        queue.events().contains(event)
    }

    fn floating_texts(queue: &EventQueue) -> Vec<(&'static str, [f32; 4])> {
        queue
            .events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::Effect(VisualEffect::FloatingText { text, color, .. }) => {
                    Some((*text, *color))
                }
                _ => None,
            })
            .collect()
    }

    // --- End-to-end scenarios ---------------------------------------------

    #[test]
    fn test_hostile_projectile_damages_player() {
        let mut world = World::with_player(player_at(100.0, 100.0));
        world
            .projectiles
            .push(Projectile::hostile(Vec2::new(100.0, 100.0), 5.0, 10.0));

        let (queue, stats) = run(&mut world, FrameParams::default());

        let player = world.player.as_ref().unwrap();
        assert!((player.health - 90.0).abs() < 0.001);
        assert!(player.active);
        assert!(!world.projectiles[0].active);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PlayerDamaged(_))), 1);
        assert!(has(&queue, &GameEvent::PlayerDamaged(10.0)));
        assert!(has(&queue, &GameEvent::ScreenShake(10.0)));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::Hit)));
        assert_eq!(stats.hits, 1);
    }

    #[test]
    fn test_projectile_kills_enemy() {
        let mut world = World::new();
        let mut enemy = Enemy::new(EnemyKind::Drone, Vec2::new(300.0, 300.0));
        enemy.health = 10.0;
        enemy.points = 42;
        world.enemies.push(enemy);
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(300.0, 300.0), 4.0, 15.0));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert!(!world.enemies[0].active);
        assert_eq!(stats.enemies_killed, 1);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::EnemyKilled { .. })), 1);
        assert!(has(
            &queue,
            &GameEvent::EnemyKilled {
                kind: EnemyKind::Drone,
                points: 42
            }
        ));
        assert!(has(
            &queue,
            &GameEvent::Effect(VisualEffect::Explosion {
                pos: Vec2::new(300.0, 300.0),
                radius: EnemyKind::Drone.radius(),
            })
        ));
        assert!(has(&queue, &GameEvent::ScoreAdded(42)));
        assert!(has(&queue, &GameEvent::ScreenShake(5.0)));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::ExplosionSmall)));
    }

    #[test]
    fn test_boss_takes_two_hits() {
        let mut world = World::new();
        world.boss = Some(Boss::new(BossKind::Dreadnought, Vec2::new(600.0, 200.0)));
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(600.0, 200.0), 4.0, 300.0));
        let mut resolver = CollisionResolver::default();

        let (queue, _) = run_with(&mut resolver, &mut world, FrameParams::default());
        assert!((world.boss.as_ref().unwrap().health - 200.0).abs() < 0.001);
        assert!(has(&queue, &GameEvent::ScreenShake(3.0)));
        assert!(!has(&queue, &GameEvent::ScreenShake(20.0)));
        assert_eq!(queue.count(|e| matches!(e, GameEvent::BossDefeated { .. })), 0);

        world.compact();
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(610.0, 200.0), 4.0, 300.0));
        let (queue, stats) = run_with(&mut resolver, &mut world, FrameParams::default());

        assert!(world.boss.as_ref().unwrap().is_dead());
        assert!(stats.boss_defeated);
        assert!(has(&queue, &GameEvent::ScreenShake(20.0)));
        assert!(!has(&queue, &GameEvent::ScreenShake(3.0)));
        assert_eq!(queue.count(|e| matches!(e, GameEvent::BossDefeated { .. })), 1);
    }

    #[test]
    fn test_asteroid_destroyed_scores_by_radius() {
        let mut world = World::new();
        let mut asteroid = Asteroid::new(Vec2::new(800.0, 500.0), 30.0);
        asteroid.health = 20.0;
        world.asteroids.push(asteroid);
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(800.0, 500.0), 4.0, 25.0));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert!(!world.asteroids[0].active);
        assert!(!world.projectiles[0].active);
        assert_eq!(stats.asteroids_destroyed, 1);
        assert!(has(&queue, &GameEvent::ScoreAdded(40)));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::ExplosionMedium)));
    }

    // --- Projectile rules -------------------------------------------------

    #[test]
    fn test_piercing_projectile_survives() {
        let mut world = World::new();
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(0.0, 0.0)));
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(5.0, 0.0)));
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(2.0, 0.0), 4.0, 10.0).piercing());

        run(&mut world, FrameParams::default());

        assert!(world.projectiles[0].active);
        for enemy in &world.enemies {
            assert!((enemy.health - 140.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_non_piercing_projectile_hits_once() {
        let mut world = World::new();
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(0.0, 0.0)));
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(5.0, 0.0)));
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(2.0, 0.0), 4.0, 10.0));

        let (_, stats) = run(&mut world, FrameParams::default());

        assert!(!world.projectiles[0].active);
        assert_eq!(stats.hits, 1);
        let total: f32 = world.enemies.iter().map(|e| e.health).sum();
        assert!((total - 290.0).abs() < 0.001);
    }

    #[test]
    fn test_burn_and_chain_on_hit() {
        let mut world = World::new();
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(50.0, 50.0)));
        world.projectiles.push(
            Projectile::friendly(Vec2::new(50.0, 50.0), 4.0, 10.0)
                .with_burn(2.0, 10.0)
                .with_chain(3),
        );

        let (queue, _) = run(&mut world, FrameParams::default());

        let burn = world.enemies[0].burn.expect("burn applied");
        assert_eq!(burn.remaining, 2.0);
        assert!(has(
            &queue,
            &GameEvent::ChainLightning(ChainHit {
                projectile: 0,
                enemy: 0,
                pos: Vec2::new(50.0, 50.0),
                remaining: 3,
                damage: 10.0,
            })
        ));
        assert!(has(
            &queue,
            &GameEvent::Effect(VisualEffect::Impact {
                pos: Vec2::new(50.0, 50.0)
            })
        ));
    }

    #[test]
    fn test_exhausted_chain_does_not_fire() {
        let mut world = World::new();
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(50.0, 50.0)));
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(50.0, 50.0), 4.0, 10.0).with_chain(0));

        let (queue, _) = run(&mut world, FrameParams::default());
        assert_eq!(queue.count(|e| matches!(e, GameEvent::ChainLightning(_))), 0);
    }

    #[test]
    fn test_ownership_filters_pairs() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(500.0, 500.0)));
        // Friendly shot sitting on the player, hostile shot sitting on the enemy
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(0.0, 0.0), 4.0, 10.0));
        world
            .projectiles
            .push(Projectile::hostile(Vec2::new(500.0, 500.0), 4.0, 10.0));

        run(&mut world, FrameParams::default());

        assert_eq!(world.player.as_ref().unwrap().health, 100.0);
        assert_eq!(world.enemies[0].health, EnemyKind::Tank.max_health());
        assert!(world.projectiles.iter().all(|p| p.active));
    }

    #[test]
    fn test_grid_limits_exact_tests() {
        let mut world = World::new();
        for i in 0..20 {
            for j in 0..20 {
                world.enemies.push(Enemy::new(
                    EnemyKind::Drone,
                    Vec2::new(i as f32 * 100.0 + 50.0, j as f32 * 100.0 + 50.0),
                ));
            }
        }
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(1050.0, 1050.0), 4.0, 1.0));

        let (_, stats) = run(&mut world, FrameParams::default());

        assert_eq!(stats.hits, 1);
        assert!(stats.exact_tests > 0);
        assert!(stats.exact_tests < 20, "tested {} pairs", stats.exact_tests);
    }

    // --- Enemy death ------------------------------------------------------

    #[test]
    fn test_splitter_requests_children() {
        let mut world = World::new();
        let mut enemy = Enemy::new(EnemyKind::Splitter, Vec2::new(200.0, 200.0));
        enemy.health = 1.0;
        world.enemies.push(enemy);
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(200.0, 200.0), 4.0, 5.0));

        let (queue, _) = run(&mut world, FrameParams::default());

        assert!(floating_texts(&queue).contains(&("SPLIT!", COLOR_SPLIT)));
        assert!(has(
            &queue,
            &GameEvent::Spawn(SpawnRequest::SplitEnemy {
                parent: 0,
                kind: EnemyKind::Splitter,
                pos: Vec2::new(200.0, 200.0),
                radius: EnemyKind::Splitter.radius(),
            })
        ));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::ExplosionMedium)));
    }

    #[test]
    fn test_powerup_drop_scales_with_spawn_rate() {
        let tuning = CollisionTuning {
            powerup_drop_chance: 1.0,
            ..Default::default()
        };
        let make_world = || {
            let mut world = World::new();
            let mut enemy = Enemy::new(EnemyKind::Drone, Vec2::new(10.0, 10.0));
            enemy.health = 1.0;
            world.enemies.push(enemy);
            world
                .projectiles
                .push(Projectile::friendly(Vec2::new(10.0, 10.0), 4.0, 5.0));
            world
        };
        let is_drop = |e: &GameEvent| matches!(e, GameEvent::Spawn(SpawnRequest::PowerUp { .. }));

        let mut resolver = CollisionResolver::new(tuning.clone(), 1);
        let (queue, _) = run_with(&mut resolver, &mut make_world(), FrameParams::default());
        assert_eq!(queue.count(is_drop), 1);

        let mut resolver = CollisionResolver::new(tuning, 1);
        let params = FrameParams {
            powerup_spawn_rate: 0.0,
            ..Default::default()
        };
        let (queue, _) = run_with(&mut resolver, &mut make_world(), params);
        assert_eq!(queue.count(is_drop), 0);
    }

    #[test]
    fn test_enemy_killed_by_projectile_skips_body_contact() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        let mut enemy = Enemy::new(EnemyKind::Drone, Vec2::new(10.0, 0.0));
        enemy.health = 5.0;
        world.enemies.push(enemy);
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(10.0, 0.0), 4.0, 50.0));

        let (queue, _) = run(&mut world, FrameParams::default());

        assert_eq!(world.player.as_ref().unwrap().health, 100.0);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::EnemyKilled { .. })), 1);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PlayerDamaged(_))), 0);
    }

    // --- Player contact ---------------------------------------------------

    #[test]
    fn test_invincibility_parries_attackers() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        world
            .projectiles
            .push(Projectile::hostile(Vec2::new(5.0, 0.0), 4.0, 25.0));
        world.enemies.push(Enemy::new(EnemyKind::Fighter, Vec2::new(-10.0, 0.0)));
        let params = FrameParams {
            invincibility_timer: 0.2,
            ..Default::default()
        };

        let (queue, _) = run(&mut world, params);

        let player = world.player.as_ref().unwrap();
        assert_eq!(player.health, 100.0);
        assert!(!world.projectiles[0].active);
        assert!(!world.enemies[0].active);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PlayerDamaged(_))), 0);
        assert!(has(
            &queue,
            &GameEvent::Effect(VisualEffect::Explosion {
                pos: Vec2::new(5.0, 0.0),
                radius: CollisionTuning::default().parry_explosion_radius,
            })
        ));
    }

    #[test]
    fn test_player_dash_timer_also_parries() {
        let mut player = player_at(0.0, 0.0);
        player.start_dash();
        let mut world = World::with_player(player);
        world
            .projectiles
            .push(Projectile::hostile(Vec2::new(5.0, 0.0), 4.0, 25.0));

        run(&mut world, FrameParams::default());

        assert_eq!(world.player.as_ref().unwrap().health, 100.0);
        assert!(!world.projectiles[0].active);
    }

    #[test]
    fn test_enemy_contact_damage() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        world.enemies.push(Enemy::new(EnemyKind::Bomber, Vec2::new(20.0, 0.0)));
        let params = FrameParams {
            damage_multiplier: 1.5,
            ..Default::default()
        };

        let (queue, _) = run(&mut world, params);

        assert!(!world.enemies[0].active);
        assert!((world.player.as_ref().unwrap().health - 55.0).abs() < 0.001);
        assert!(has(&queue, &GameEvent::PlayerDamaged(45.0)));
        assert!(has(&queue, &GameEvent::ScreenShake(15.0)));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::Hit)));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::ExplosionMedium)));
        // Rammed enemies give no score
        assert_eq!(queue.count(|e| matches!(e, GameEvent::ScoreAdded(_))), 0);
    }

    #[test]
    fn test_shield_absorbs_contact_damage() {
        let mut player = player_at(0.0, 0.0);
        player.shield = 20.0;
        let mut world = World::with_player(player);
        world.enemies.push(Enemy::new(EnemyKind::Drone, Vec2::new(20.0, 0.0)));

        let (queue, _) = run(&mut world, FrameParams::default());

        let player = world.player.as_ref().unwrap();
        assert_eq!(player.shield, 0.0);
        assert!((player.health - 90.0).abs() < 0.001);
        assert!(has(&queue, &GameEvent::PlayerDamaged(10.0)));
    }

    #[test]
    fn test_boss_contact_uses_half_radius() {
        let mut world = World::with_player(player_at(60.0, 0.0));
        world.boss = Some(Boss::new(BossKind::Dreadnought, Vec2::ZERO));

        run(&mut world, FrameParams::default());
        assert_eq!(world.player.as_ref().unwrap().health, 100.0);

        world.player.as_mut().unwrap().pos = Vec2::new(40.0, 0.0);
        let (queue, _) = run(&mut world, FrameParams::default());
        assert!((world.player.as_ref().unwrap().health - 50.0).abs() < 0.001);
        assert!(has(&queue, &GameEvent::ScreenShake(20.0)));
    }

    #[test]
    fn test_boss_contact_ignores_dash() {
        let mut world = World::with_player(player_at(10.0, 0.0));
        world.boss = Some(Boss::new(BossKind::Dreadnought, Vec2::ZERO));
        let params = FrameParams {
            invincibility_timer: 1.0,
            ..Default::default()
        };

        run(&mut world, params);
        assert!((world.player.as_ref().unwrap().health - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_asteroid_contact() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        world.asteroids.push(Asteroid::new(Vec2::new(30.0, 0.0), 30.0));
        let params = FrameParams {
            damage_multiplier: 2.0,
            ..Default::default()
        };

        let (queue, _) = run(&mut world, params);

        assert!(!world.asteroids[0].active);
        assert!((world.player.as_ref().unwrap().health - 70.0).abs() < 0.001);
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::AsteroidHit)));
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::ExplosionMedium)));
        assert!(has(&queue, &GameEvent::ScreenShake(8.0)));
        assert!(has(
            &queue,
            &GameEvent::Effect(VisualEffect::Explosion {
                pos: Vec2::new(30.0, 0.0),
                radius: 30.0,
            })
        ));
    }

    #[test]
    fn test_player_death_stops_later_phases() {
        let mut player = player_at(0.0, 0.0);
        player.health = 10.0;
        let mut world = World::with_player(player);
        world.enemies.push(Enemy::new(EnemyKind::Drone, Vec2::new(10.0, 0.0)));
        world.enemies.push(Enemy::new(EnemyKind::Drone, Vec2::new(-10.0, 0.0)));
        world
            .powerups
            .push(PowerUp::new(PowerUpKind::Health, Vec2::new(0.0, 10.0)));

        let (queue, stats) = run(&mut world, FrameParams::default());

        let player = world.player.as_ref().unwrap();
        assert!(!player.active);
        assert!(stats.player_killed);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PlayerKilled { .. })), 1);
        assert!(has(&queue, &GameEvent::Sound(SoundEffect::ExplosionLarge)));
        // Second enemy and the power-up are left alone
        assert!(world.enemies[1].active);
        assert!(world.powerups[0].active);
    }

    fn assert_player_killed(world: &World, queue: &EventQueue, stats: &ResolveStats) {
        let player = world.player.as_ref().unwrap();
        assert!(!player.active);
        assert_eq!(player.health, 0.0);
        assert!(stats.player_killed);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PlayerKilled { .. })), 1);
        assert!(has(queue, &GameEvent::Sound(SoundEffect::ExplosionLarge)));
        assert!(has(
            queue,
            &GameEvent::Effect(VisualEffect::Explosion {
                pos: player.pos,
                radius: CollisionTuning::default().player_death_explosion_radius,
            })
        ));
    }

    #[test]
    fn test_hostile_projectile_kills_player() {
        let mut player = player_at(0.0, 0.0);
        player.health = 5.0;
        let mut world = World::with_player(player);
        world
            .projectiles
            .push(Projectile::hostile(Vec2::new(5.0, 0.0), 4.0, 10.0));
        world
            .projectiles
            .push(Projectile::hostile(Vec2::new(-5.0, 0.0), 4.0, 10.0));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert_player_killed(&world, &queue, &stats);
        // The second shot finds no live target
        assert!(world.projectiles[1].active);
    }

    #[test]
    fn test_boss_contact_kills_player() {
        let mut player = player_at(40.0, 0.0);
        player.health = 40.0;
        let mut world = World::with_player(player);
        world.boss = Some(Boss::new(BossKind::Dreadnought, Vec2::ZERO));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert_player_killed(&world, &queue, &stats);
        // Damage is reported unclamped by remaining health
        assert!(has(&queue, &GameEvent::PlayerDamaged(50.0)));
    }

    #[test]
    fn test_asteroid_contact_kills_player() {
        let mut player = player_at(0.0, 0.0);
        player.health = 10.0;
        let mut world = World::with_player(player);
        world.asteroids.push(Asteroid::new(Vec2::new(30.0, 0.0), 30.0));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert_player_killed(&world, &queue, &stats);
        assert!(!world.asteroids[0].active);
    }

    #[test]
    fn test_defeated_boss_stops_ramming() {
        let mut world = World::with_player(player_at(10.0, 0.0));
        let mut boss = Boss::new(BossKind::Dreadnought, Vec2::ZERO);
        boss.health = 1.0;
        world.boss = Some(boss);
        world
            .projectiles
            .push(Projectile::friendly(Vec2::ZERO, 4.0, 50.0));
        let mut resolver = CollisionResolver::default();

        let (queue, stats) = run_with(&mut resolver, &mut world, FrameParams::default());

        assert!(stats.boss_defeated);
        assert!(!world.boss.as_ref().unwrap().active);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::BossDefeated { .. })), 1);
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PlayerDamaged(_))), 0);
        assert_eq!(world.player.as_ref().unwrap().health, 100.0);

        // Same frame layout again without compaction: still harmless
        let (queue, _) = run_with(&mut resolver, &mut world, FrameParams::default());
        assert!(queue.is_empty());
        assert_eq!(world.player.as_ref().unwrap().health, 100.0);

        world.compact();
        assert!(world.boss.is_none());
    }

    #[test]
    fn test_large_enemy_across_cell_edge_is_hit() {
        // Padding alone would only reach the projectile's own cell
        let tuning = CollisionTuning {
            query_padding: 10.0,
            ..Default::default()
        };
        let mut resolver = CollisionResolver::new(tuning, 0);
        let mut world = World::new();
        world.enemies.push(Enemy::new(EnemyKind::Tank, Vec2::new(95.0, 50.0)));
        world
            .projectiles
            .push(Projectile::friendly(Vec2::new(128.0, 50.0), 4.0, 10.0));

        let (_, stats) = run_with(&mut resolver, &mut world, FrameParams::default());

        assert_eq!(stats.hits, 1);
        assert!(!world.projectiles[0].active);
        assert!((world.enemies[0].health - (EnemyKind::Tank.max_health() - 10.0)).abs() < 0.001);
    }

    // --- Power-ups --------------------------------------------------------

    #[test]
    fn test_weapon_level_up_fires_once() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        world
            .powerups
            .push(PowerUp::new(PowerUpKind::Weapon, Vec2::new(5.0, 0.0)));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert_eq!(world.player.as_ref().unwrap().weapon_level, 2);
        assert!(!world.powerups[0].active);
        assert_eq!(stats.powerups_collected, 1);
        assert_eq!(queue.count(|e| *e == GameEvent::Sound(SoundEffect::LevelUp)), 1);
        assert_eq!(floating_texts(&queue), vec![("WEAPON UP!", COLOR_LEVEL_UP)]);
    }

    #[test]
    fn test_weapon_at_max_tier_is_silent() {
        let mut player = player_at(0.0, 0.0);
        player.weapon_level = PLAYER_MAX_WEAPON_LEVEL;
        let mut world = World::with_player(player);
        world
            .powerups
            .push(PowerUp::new(PowerUpKind::Weapon, Vec2::new(5.0, 0.0)));

        let (queue, _) = run(&mut world, FrameParams::default());

        assert!(!world.powerups[0].active);
        assert_eq!(world.player.as_ref().unwrap().weapon_level, PLAYER_MAX_WEAPON_LEVEL);
        assert_eq!(queue.count(|e| *e == GameEvent::Sound(SoundEffect::LevelUp)), 0);
        assert!(floating_texts(&queue).is_empty());
    }

    #[test]
    fn test_stat_powerups_play_collect_sound() {
        let mut player = player_at(0.0, 0.0);
        player.health = 50.0;
        let mut world = World::with_player(player);
        for kind in [PowerUpKind::Health, PowerUpKind::Shield, PowerUpKind::Speed] {
            world.powerups.push(PowerUp::new(kind, Vec2::new(3.0, 3.0)));
        }

        let (queue, _) = run(&mut world, FrameParams::default());

        let player = world.player.as_ref().unwrap();
        assert_eq!(player.health, 75.0);
        assert_eq!(player.shield, 50.0);
        assert!(player.speed_boost_timer > 0.0);
        assert_eq!(
            queue.count(|e| *e == GameEvent::Sound(SoundEffect::PowerUpCollect)),
            3
        );
        assert_eq!(queue.count(|e| matches!(e, GameEvent::PowerUpCollected(_))), 3);
    }

    #[test]
    fn test_mystery_feedback_matches_outcome() {
        let mut seen_positive = false;
        let mut seen_negative = false;
        for seed in 0..32 {
            let mut world = World::with_player(player_at(0.0, 0.0));
            world
                .powerups
                .push(PowerUp::new(PowerUpKind::Mystery, Vec2::new(5.0, 0.0)));
            let mut resolver = CollisionResolver::new(CollisionTuning::default(), seed);

            let (queue, _) = run_with(&mut resolver, &mut world, FrameParams::default());

            let texts = floating_texts(&queue);
            assert_eq!(texts.len(), 1);
            let (label, color) = texts[0];
            let effect = MysteryEffect::ALL
                .iter()
                .find(|e| e.label() == label)
                .expect("known mystery label");
            if effect.is_positive() {
                seen_positive = true;
                assert_eq!(color, COLOR_POSITIVE);
                assert!(has(&queue, &GameEvent::Sound(SoundEffect::PowerUpCollect)));
            } else {
                seen_negative = true;
                assert_eq!(color, COLOR_NEGATIVE);
                assert!(has(&queue, &GameEvent::Sound(SoundEffect::Hit)));
            }
        }
        assert!(seen_positive && seen_negative);
    }

    // --- Degenerate frames ------------------------------------------------

    #[test]
    fn test_empty_frame_is_noop() {
        let mut world = World::new();
        world
            .projectiles
            .push(Projectile::friendly(Vec2::ZERO, 4.0, 10.0));
        world
            .projectiles
            .push(Projectile::hostile(Vec2::ZERO, 4.0, 10.0));

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert!(queue.is_empty());
        assert_eq!(stats, ResolveStats::default());
        assert!(world.projectiles.iter().all(|p| p.active));
    }

    #[test]
    fn test_null_sink_still_mutates() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        world
            .projectiles
            .push(Projectile::hostile(Vec2::ZERO, 4.0, 10.0));
        let mut resolver = CollisionResolver::default();

        resolver.resolve(&mut world.frame(), &FrameParams::default(), &mut ());

        assert_eq!(world.player.as_ref().unwrap().health, 90.0);
        assert!(!world.projectiles[0].active);
    }

    #[test]
    fn test_inactive_entities_are_ignored() {
        let mut world = World::with_player(player_at(0.0, 0.0));
        let mut enemy = Enemy::new(EnemyKind::Drone, Vec2::ZERO);
        enemy.active = false;
        world.enemies.push(enemy);
        let mut shot = Projectile::hostile(Vec2::ZERO, 4.0, 10.0);
        shot.active = false;
        world.projectiles.push(shot);

        let (queue, stats) = run(&mut world, FrameParams::default());

        assert!(queue.is_empty());
        assert_eq!(stats.hits, 0);
        assert_eq!(world.player.as_ref().unwrap().health, 100.0);
    }

    proptest! {
        #[test]
        fn prop_enemy_death_fires_one_kill(
            health in 1.0f32..100.0,
            damage in 1.0f32..100.0,
            points in 0u32..1000,
        ) {
            let mut world = World::new();
            let mut enemy = Enemy::new(EnemyKind::Fighter, Vec2::new(100.0, 100.0));
            enemy.health = health;
            enemy.points = points;
            world.enemies.push(enemy);
            world
                .projectiles
                .push(Projectile::friendly(Vec2::new(100.0, 100.0), 4.0, damage));

            let (queue, _) = run(&mut world, FrameParams::default());

            let kills: Vec<_> = queue
                .events()
                .iter()
                .filter_map(|e| match e {
                    GameEvent::EnemyKilled { points, .. } => Some(*points),
                    _ => None,
                })
                .collect();
            if health - damage <= 0.0 {
                prop_assert!(!world.enemies[0].active);
                prop_assert_eq!(kills, vec![points]);
            } else {
                prop_assert!(world.enemies[0].active);
                prop_assert!(kills.is_empty());
            }
        }
    }
}
