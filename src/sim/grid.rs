//! Uniform grid spatial index
//!
//! Buckets the numerous entity classes (enemies, projectiles, power-ups,
//! asteroids) by the cell containing their center. Rebuilt from scratch every
//! frame; queries return a superset of true neighbours that the caller filters
//! with the exact circle test.

use glam::Vec2;
use rustc_hash::FxHashMap;

use super::entity::{Asteroid, Enemy, PowerUp, Projectile};

/// Handle to an entity in one of the host's per-type containers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Enemy(usize),
    Projectile(usize),
    PowerUp(usize),
    Asteroid(usize),
}

/// Uniform grid over the playfield
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<EntityRef>>,
    /// Largest radius inserted since the last clear
    max_radius: f32,
    len: usize,
}

impl SpatialGrid {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            cells: FxHashMap::default(),
            max_radius: 0.0,
            len: 0,
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of entities currently indexed
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest entity radius indexed since the last rebuild
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.max_radius = 0.0;
        self.len = 0;
    }

    pub fn insert(&mut self, entity: EntityRef, pos: Vec2, radius: f32) {
        let key = self.cell_key(pos.x, pos.y);
        self.cells.entry(key).or_default().push(entity);
        self.max_radius = self.max_radius.max(radius);
        self.len += 1;
    }

    /// Clear and repopulate from the current entity lists.
    ///
    /// Inactive entities are indexed too; consumers check `active` when they
    /// resolve a candidate.
    pub fn rebuild(
        &mut self,
        enemies: &[Enemy],
        projectiles: &[Projectile],
        powerups: &[PowerUp],
        asteroids: &[Asteroid],
    ) {
        self.clear();
        for (i, e) in enemies.iter().enumerate() {
            self.insert(EntityRef::Enemy(i), e.pos, e.radius);
        }
        for (i, p) in projectiles.iter().enumerate() {
            self.insert(EntityRef::Projectile(i), p.pos, p.radius);
        }
        for (i, p) in powerups.iter().enumerate() {
            self.insert(EntityRef::PowerUp(i), p.pos, p.radius);
        }
        for (i, a) in asteroids.iter().enumerate() {
            self.insert(EntityRef::Asteroid(i), a.pos, a.radius);
        }
        log::trace!(
            "grid rebuilt: {} entities in {} cells (max radius {})",
            self.len,
            self.cells.len(),
            self.max_radius
        );
    }

    /// Floor-division bucketing: a point on a cell edge belongs to the cell
    /// on its positive side, never to both.
    fn cell_key(&self, x: f32, y: f32) -> (i32, i32) {
        (
            (x / self.cell_size).floor() as i32,
            (y / self.cell_size).floor() as i32,
        )
    }

    /// Write every entity whose cell intersects the square of half-width
    /// `radius` around `pos` into `buf` (cleared first).
    pub fn query_nearby_into(&self, pos: Vec2, radius: f32, buf: &mut Vec<EntityRef>) {
        buf.clear();
        self.visit_nearby(pos, radius, |entity| buf.push(entity));
    }

    pub fn query_nearby(&self, pos: Vec2, radius: f32) -> Vec<EntityRef> {
        let mut buf = Vec::new();
        self.query_nearby_into(pos, radius, &mut buf);
        buf
    }

    /// Enemy-only variant of [`SpatialGrid::query_nearby_into`], yielding
    /// container indices.
    pub fn query_enemies_into(&self, pos: Vec2, radius: f32, buf: &mut Vec<usize>) {
        buf.clear();
        self.visit_nearby(pos, radius, |entity| {
            if let EntityRef::Enemy(i) = entity {
                buf.push(i);
            }
        });
    }

    fn visit_nearby(&self, pos: Vec2, radius: f32, mut visit: impl FnMut(EntityRef)) {
        if self.cells.is_empty() {
            return;
        }
        let radius = radius.max(0.0);
        let (min_x, min_y) = self.cell_key(pos.x - radius, pos.y - radius);
        let (max_x, max_y) = self.cell_key(pos.x + radius, pos.y + radius);

        let span_x = i64::from(max_x) - i64::from(min_x) + 1;
        let span_y = i64::from(max_y) - i64::from(min_y) + 1;

        // Huge queries: walk the occupied cells instead of the covered ones
        if span_x.saturating_mul(span_y) > self.cells.len() as i64 {
            for (&(cx, cy), bucket) in &self.cells {
                if (min_x..=max_x).contains(&cx) && (min_y..=max_y).contains(&cy) {
                    bucket.iter().copied().for_each(&mut visit);
                }
            }
            return;
        }

        for cx in min_x..=max_x {
            for cy in min_y..=max_y {
                if let Some(bucket) = self.cells.get(&(cx, cy)) {
                    bucket.iter().copied().for_each(&mut visit);
                }
            }
        }
    }
}

impl Default for SpatialGrid {
    fn default() -> Self {
        Self::new(crate::consts::GRID_CELL_SIZE)
    }
}
