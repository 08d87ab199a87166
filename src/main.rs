//! Void Blaster headless demo
//!
//! Seeds a world with random entities and runs a few seconds of fixed-rate
//! frames through the collision core, logging what happened.
//!
//! Usage: `void-blaster [seed] [difficulty] [tuning.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    demo::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Headless demo is native only
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use rustc_hash::FxHashMap;

    use void_blaster::consts::*;
    use void_blaster::sim::{
        Asteroid, Boss, BossKind, CollisionResolver, Enemy, EnemyKind, EventQueue, GameEvent,
        Player, PowerUp, PowerUpKind, Projectile, SpawnRequest, TickInput, World, tick,
    };
    use void_blaster::{CollisionTuning, Difficulty};

    /// Demo length in frames (5 s at 60 Hz)
    const DEMO_FRAMES: u32 = 300;
    const FIRE_INTERVAL: f32 = 0.15;
    const PLAYER_SHOT_SPEED: f32 = 600.0;
    const ENEMY_SHOT_SPEED: f32 = 250.0;
    const ENEMY_SPEED: f32 = 60.0;
    const ASTEROID_SPEED: f32 = 40.0;

    const ENEMY_KINDS: [EnemyKind; 6] = [
        EnemyKind::Drone,
        EnemyKind::Fighter,
        EnemyKind::Splitter,
        EnemyKind::Bomber,
        EnemyKind::Shielder,
        EnemyKind::Tank,
    ];

    const POWERUP_KINDS: [PowerUpKind; 5] = [
        PowerUpKind::Health,
        PowerUpKind::Shield,
        PowerUpKind::Weapon,
        PowerUpKind::Speed,
        PowerUpKind::Mystery,
    ];

    pub fn run() {
        let mut args = std::env::args().skip(1);
        let seed: u64 = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
        let difficulty = args
            .next()
            .and_then(|s| Difficulty::from_str(&s))
            .unwrap_or_default();
        let tuning = match args.next() {
            Some(path) => match CollisionTuning::load(&path) {
                Ok(tuning) => tuning,
                Err(e) => {
                    log::warn!("Falling back to default tuning: {}", e);
                    CollisionTuning::default()
                }
            },
            None => CollisionTuning::default(),
        };

        log::info!(
            "Void Blaster demo starting (seed {}, difficulty {})",
            seed,
            difficulty.as_str()
        );

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut world = populate(&mut rng);
        let mut resolver = CollisionResolver::new(tuning, seed);
        let input = TickInput {
            difficulty,
            ..Default::default()
        };
        let mut queue = EventQueue::new();
        let mut counts: FxHashMap<&'static str, usize> = FxHashMap::default();
        let mut score: u64 = 0;
        let mut fire_cooldown = 0.0;

        for frame in 0..DEMO_FRAMES {
            fire_cooldown -= SIM_DT;
            if fire_cooldown <= 0.0 {
                fire(&mut world);
                fire_cooldown = FIRE_INTERVAL;
            }
            enemy_fire(&mut world, &mut rng);
            advance(&mut world, SIM_DT);

            tick(&mut world, &mut resolver, &input, SIM_DT, &mut queue);

            // Spawns are applied after the drain; indices are still valid here
            let mut spawns = Vec::new();
            for event in queue.drain() {
                *counts.entry(event_name(&event)).or_default() += 1;
                match event {
                    GameEvent::ScoreAdded(points) => score += points,
                    GameEvent::Spawn(request) => spawns.push(request),
                    GameEvent::BossDefeated { kind, .. } => {
                        log::info!("Frame {}: {} defeated", frame, kind.name());
                    }
                    GameEvent::PlayerKilled { .. } => {
                        log::info!("Frame {}: player destroyed", frame);
                    }
                    _ => {}
                }
            }
            for request in spawns {
                spawn(&mut world, request, &mut rng);
            }
            world.compact();

            if world.is_game_over() {
                break;
            }
        }

        let mut summary: Vec<_> = counts.into_iter().collect();
        summary.sort_unstable();
        for (name, count) in summary {
            log::info!("{:>18}: {}", name, count);
        }
        log::info!(
            "Demo finished after {:.2}s: score {}, {} entities left, player {}",
            world.elapsed,
            score,
            world.entity_count(),
            if world.is_game_over() { "destroyed" } else { "alive" }
        );
    }

    fn populate(rng: &mut Pcg32) -> World {
        let mut world = World::with_player(Player::new(Vec2::new(
            PLAYFIELD_WIDTH * 0.5,
            PLAYFIELD_HEIGHT - 80.0,
        )));

        for _ in 0..40 {
            let kind = ENEMY_KINDS[rng.random_range(0..ENEMY_KINDS.len())];
            let pos = Vec2::new(
                rng.random_range(0.0..PLAYFIELD_WIDTH),
                rng.random_range(0.0..PLAYFIELD_HEIGHT * 0.5),
            );
            world.enemies.push(Enemy::new(kind, pos));
        }
        for _ in 0..8 {
            let pos = Vec2::new(
                rng.random_range(0.0..PLAYFIELD_WIDTH),
                rng.random_range(0.0..PLAYFIELD_HEIGHT * 0.6),
            );
            world
                .asteroids
                .push(Asteroid::new(pos, rng.random_range(12.0..50.0)));
        }
        for _ in 0..4 {
            let kind = POWERUP_KINDS[rng.random_range(0..POWERUP_KINDS.len())];
            let pos = Vec2::new(
                rng.random_range(0.0..PLAYFIELD_WIDTH),
                rng.random_range(PLAYFIELD_HEIGHT * 0.5..PLAYFIELD_HEIGHT),
            );
            world.powerups.push(PowerUp::new(kind, pos));
        }
        world.boss = Some(Boss::new(
            BossKind::Dreadnought,
            Vec2::new(PLAYFIELD_WIDTH * 0.5, 90.0),
        ));

        log::info!("Spawned {} entities plus player and boss", world.entity_count());
        world
    }

    /// Player volley: one shot per weapon tier, fanned out
    fn fire(world: &mut World) {
        let Some(player) = world.player.as_ref().filter(|p| p.active) else {
            return;
        };
        let shots = u32::from(player.weapon_level);
        for i in 0..shots {
            let offset = (i as f32 - (shots - 1) as f32 * 0.5) * 12.0;
            let mut shot = Projectile::friendly(player.pos + Vec2::new(offset, -24.0), 4.0, 10.0)
                .with_velocity(Vec2::new(0.0, -PLAYER_SHOT_SPEED));
            if i == 0 && player.weapon_level >= 3 {
                shot = shot.with_burn(2.0, 8.0);
            }
            world.projectiles.push(shot);
        }
    }

    fn enemy_fire(world: &mut World, rng: &mut Pcg32) {
        let Some(target) = world.player.as_ref().map(|p| p.pos) else {
            return;
        };
        let mut shots = Vec::new();
        for enemy in world.enemies.iter().filter(|e| e.active) {
            if rng.random_bool(0.005) {
                let dir = (target - enemy.pos).normalize_or_zero();
                shots.push(
                    Projectile::hostile(enemy.pos, 5.0, 8.0).with_velocity(dir * ENEMY_SHOT_SPEED),
                );
            }
        }
        world.projectiles.extend(shots);
    }

    /// Integrate positions and retire anything that left the playfield
    fn advance(world: &mut World, dt: f32) {
        let bounds_min = Vec2::splat(-100.0);
        let bounds_max = Vec2::new(PLAYFIELD_WIDTH + 100.0, PLAYFIELD_HEIGHT + 100.0);
        let in_bounds = |p: Vec2| p.cmpge(bounds_min).all() && p.cmple(bounds_max).all();

        for shot in &mut world.projectiles {
            shot.pos += shot.vel * dt;
            if !in_bounds(shot.pos) {
                shot.active = false;
            }
        }
        for enemy in &mut world.enemies {
            enemy.pos.y += ENEMY_SPEED * dt;
            if !in_bounds(enemy.pos) {
                enemy.active = false;
            }
        }
        for asteroid in &mut world.asteroids {
            asteroid.pos.y += ASTEROID_SPEED * dt;
            if !in_bounds(asteroid.pos) {
                asteroid.active = false;
            }
        }
    }

    fn spawn(world: &mut World, request: SpawnRequest, rng: &mut Pcg32) {
        match request {
            SpawnRequest::PowerUp { pos } => {
                let kind = POWERUP_KINDS[rng.random_range(0..POWERUP_KINDS.len())];
                world.powerups.push(PowerUp::new(kind, pos));
            }
            SpawnRequest::SplitEnemy { pos, radius, .. } => {
                for side in [-1.0, 1.0] {
                    let child_pos = pos + Vec2::new(side * radius * 0.6, 0.0);
                    world.enemies.push(Enemy::new(EnemyKind::Drone, child_pos));
                }
            }
        }
    }

    fn event_name(event: &GameEvent) -> &'static str {
        match event {
            GameEvent::Effect(_) => "effect",
            GameEvent::Sound(_) => "sound",
            GameEvent::ScreenShake(_) => "screen_shake",
            GameEvent::ScoreAdded(_) => "score_added",
            GameEvent::EnemyKilled { .. } => "enemy_killed",
            GameEvent::BossDefeated { .. } => "boss_defeated",
            GameEvent::PlayerDamaged(_) => "player_damaged",
            GameEvent::PlayerKilled { .. } => "player_killed",
            GameEvent::PowerUpCollected(_) => "powerup_collected",
            GameEvent::Spawn(_) => "spawn_request",
            GameEvent::ChainLightning(_) => "chain_lightning",
        }
    }
}
