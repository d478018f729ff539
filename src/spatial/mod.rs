pub mod groups;

use glam::DVec2;

pub use groups::CollisionGroups;

use crate::organism::OrganismId;

/// Registration handle. Stale handles (removed or reused slots) are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpatialHandle {
    index: u32,
    generation: u32,
}

/// Nearest-match result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialHit {
    pub owner: OrganismId,
    /// Centre-to-centre distance from the query point.
    pub distance: f64,
    pub center: DVec2,
    pub radius: f64,
    pub groups: CollisionGroups,
}

/// Broad-phase index of circular sensors, queried by masked nearest point.
pub trait SpatialIndex {
    /// Register a sensor. Returns `None` when the index is full.
    fn insert(
        &mut self,
        owner: OrganismId,
        center: DVec2,
        radius: f64,
        groups: CollisionGroups,
    ) -> Option<SpatialHandle>;

    fn update(&mut self, handle: SpatialHandle, center: DVec2, radius: f64);

    fn set_groups(&mut self, handle: SpatialHandle, groups: CollisionGroups);

    fn remove(&mut self, handle: SpatialHandle);

    /// Closest sensor within `max_distance` whose groups interact with `query`.
    fn query_nearest(&self, point: DVec2, query: CollisionGroups, max_distance: f64) -> Option<SpatialHit>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy)]
struct Sensor {
    owner: OrganismId,
    center: DVec2,
    radius: f64,
    groups: CollisionGroups,
    bucket: usize,
}


/// Spatial hash grid with persistent sensors.
///
/// Cell size should be around the typical query distance. Uses a multiplicative
/// hash so distant cells share buckets; candidates are always distance-checked.
pub struct SpatialHash {
    inv_cell_size: f64,
    cell_size: f64,
    table_size: usize,
    /// Each bucket holds sensor slot indices.
    buckets: Vec<Vec<u32>>,
    slots: Vec<Option<Sensor>>,
    generations: Vec<u32>,
    free: Vec<u32>,
    capacity: usize,
    live: usize,
}

impl SpatialHash {
    pub fn new(cell_size: f64, table_size: usize, capacity: usize) -> Self {
        let table_size = table_size.max(1);
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            buckets.push(Vec::with_capacity(8));
        }
        Self {
            inv_cell_size: 1.0 / cell_size,
            cell_size,
            table_size,
            buckets,
            slots: Vec::new(),
            generations: Vec::new(),
            free: Vec::new(),
            capacity,
            live: 0,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    fn cell_coords(&self, pos: DVec2) -> (i64, i64) {
        let cx = (pos.x * self.inv_cell_size).floor();
        let cy = (pos.y * self.inv_cell_size).floor();
        // Non-finite positions all land in cell 0.
        let clamp = |v: f64| if v.is_finite() { v as i64 } else { 0 };
        (clamp(cx), clamp(cy))
    }

    fn hash(&self, pos: DVec2) -> usize {
        let (cx, cy) = self.cell_coords(pos);
        self.hash_cell(cx, cy)
    }

    fn hash_cell(&self, cx: i64, cy: i64) -> usize {
        let h = (cx as u32).wrapping_mul(73856093) ^ (cy as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }

    fn sensor(&self, handle: SpatialHandle) -> Option<&Sensor> {
        let idx = handle.index as usize;
        if self.generations.get(idx) != Some(&handle.generation) {
            return None;
        }
        self.slots.get(idx)?.as_ref()
    }

    fn unlink(&mut self, bucket: usize, index: u32) {
        let list = &mut self.buckets[bucket];
        if let Some(pos) = list.iter().position(|&i| i == index) {
            list.swap_remove(pos);
        }
    }

    fn consider(
        &self,
        index: u32,
        point: DVec2,
        query: CollisionGroups,
        max_distance: f64,
        best: &mut Option<SpatialHit>,
    ) {
        let Some(sensor) = self.slots[index as usize].as_ref() else {
            return;
        };
        if !query.interacts(sensor.groups) {
            return;
        }
        let distance = sensor.center.distance(point);
        if distance > max_distance {
            return;
        }
        if best.map_or(true, |b| distance < b.distance) {
            *best = Some(SpatialHit {
                owner: sensor.owner,
                distance,
                center: sensor.center,
                radius: sensor.radius,
                groups: sensor.groups,
            });
        }
    }

    fn scan_all(&self, point: DVec2, query: CollisionGroups, max_distance: f64) -> Option<SpatialHit> {
        let mut best = None;
        for index in 0..self.slots.len() {
            self.consider(index as u32, point, query, max_distance, &mut best);
        }
        best
    }
}

impl SpatialIndex for SpatialHash {
    fn insert(
        &mut self,
        owner: OrganismId,
        center: DVec2,
        radius: f64,
        groups: CollisionGroups,
    ) -> Option<SpatialHandle> {
        if self.live >= self.capacity {
            return None;
        }
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                self.slots.push(None);
                self.generations.push(0);
                (self.slots.len() - 1) as u32
            }
        };
        let bucket = self.hash(center);
        self.slots[index as usize] = Some(Sensor {
            owner,
            center,
            radius,
            groups,
            bucket,
        });
        self.buckets[bucket].push(index);
        self.live += 1;
        Some(SpatialHandle {
            index,
            generation: self.generations[index as usize],
        })
    }

    fn update(&mut self, handle: SpatialHandle, center: DVec2, radius: f64) {
        let Some(old_bucket) = self.sensor(handle).map(|s| s.bucket) else {
            return;
        };
        let bucket = self.hash(center);
        if bucket != old_bucket {
            self.unlink(old_bucket, handle.index);
            self.buckets[bucket].push(handle.index);
        }
        if let Some(sensor) = self.slots[handle.index as usize].as_mut() {
            sensor.center = center;
            sensor.radius = radius;
            sensor.bucket = bucket;
        }
    }

    fn set_groups(&mut self, handle: SpatialHandle, groups: CollisionGroups) {
        if self.sensor(handle).is_none() {
            return;
        }
        if let Some(sensor) = self.slots[handle.index as usize].as_mut() {
            sensor.groups = groups;
        }
    }

    fn remove(&mut self, handle: SpatialHandle) {
        let Some(bucket) = self.sensor(handle).map(|s| s.bucket) else {
            return;
        };
        self.unlink(bucket, handle.index);
        let idx = handle.index as usize;
        self.slots[idx] = None;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
    }

    fn query_nearest(&self, point: DVec2, query: CollisionGroups, max_distance: f64) -> Option<SpatialHit> {
        if self.live == 0 || !(max_distance >= 0.0) {
            return None;
        }

        // A sensor within range sits at most this many cells from the query cell.
        let rings = (max_distance * self.inv_cell_size).ceil() + 1.0;
        let side = 2.0 * rings + 1.0;
        if side * side > self.table_size as f64 {
            // The ring walk would revisit buckets: every bucket once is cheaper.
            return self.scan_all(point, query, max_distance);
        }
        let rings = rings as i64;

        let (cx, cy) = self.cell_coords(point);
        let mut best: Option<SpatialHit> = None;

        for ring in 0..=rings {
            for dy in -ring..=ring {
                for dx in -ring..=ring {
                    if dx.abs() != ring && dy.abs() != ring {
                        continue;
                    }
                    let bucket = self.hash_cell(cx.wrapping_add(dx), cy.wrapping_add(dy));
                    for &index in &self.buckets[bucket] {
                        self.consider(index, point, query, max_distance, &mut best);
                    }
                }
            }
            // Everything beyond this ring is at least `ring * cell_size` away.
            if let Some(hit) = best {
                if hit.distance <= ring as f64 * self.cell_size {
                    return best;
                }
            }
        }
        best
    }

    fn len(&self) -> usize {
        self.live
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> OrganismId {
        OrganismId(n)
    }

    #[test]
    fn insert_and_query() {
        let mut grid = SpatialHash::new(64.0, 256, 64);
        let tag = CollisionGroups::organism(0);
        grid.insert(id(0), DVec2::new(100.0, 100.0), 3.0, tag);
        grid.insert(id(1), DVec2::new(110.0, 105.0), 3.0, tag);
        grid.insert(id(2), DVec2::new(900.0, 900.0), 3.0, tag);

        let query = CollisionGroups::prey_query(1).unwrap();
        let hit = grid.query_nearest(DVec2::new(108.0, 104.0), query, 50.0).unwrap();
        assert_eq!(hit.owner, id(1));
        assert!((hit.distance - DVec2::new(2.0, 1.0).length()).abs() < 1e-9);
    }

    #[test]
    fn far_targets_need_a_long_reach() {
        let mut grid = SpatialHash::new(10.0, 64, 8);
        let query = CollisionGroups::prey_query(3).unwrap();
        grid.insert(id(7), DVec2::new(5000.0, -3000.0), 1.0, CollisionGroups::organism(2));
        assert!(grid.query_nearest(DVec2::ZERO, query, 25.0).is_none());
        assert!(grid.query_nearest(DVec2::ZERO, query, 5000.0).is_none());
        let hit = grid.query_nearest(DVec2::ZERO, query, 6000.0).unwrap();
        assert_eq!(hit.owner, id(7));
        assert!(grid.query_nearest(DVec2::ZERO, query, f64::INFINITY).is_some());
    }

    #[test]
    fn nearest_within_reach_wins_over_hash_neighbours() {
        // Distant cells share buckets with nearby ones.
        let mut grid = SpatialHash::new(10.0, 64, 16);
        let tag = CollisionGroups::organism(0);
        let query = CollisionGroups::prey_query(1).unwrap();
        grid.insert(id(1), DVec2::new(400.0, 0.0), 1.0, tag);
        grid.insert(id(2), DVec2::new(12.0, 0.0), 1.0, tag);
        grid.insert(id(3), DVec2::new(-7.0, 0.0), 1.0, tag);

        let hit = grid.query_nearest(DVec2::ZERO, query, 5.0);
        assert!(hit.is_none());
        let hit = grid.query_nearest(DVec2::ZERO, query, 15.0).unwrap();
        assert_eq!(hit.owner, id(3));
        let hit = grid.query_nearest(DVec2::new(390.0, 0.0), query, 15.0).unwrap();
        assert_eq!(hit.owner, id(1));
    }

    #[test]
    fn ring_walk_matches_full_scan() {
        let mut grid = SpatialHash::new(16.0, 1024, 256);
        let mut rng = fastrand::Rng::with_seed(9);
        let tag = CollisionGroups::organism(2);
        for n in 0..200 {
            let p = DVec2::new(rng.f64() * 400.0 - 200.0, rng.f64() * 400.0 - 200.0);
            grid.insert(id(n), p, 1.0, tag);
        }
        let query = CollisionGroups::prey_query(3).unwrap();
        for _ in 0..50 {
            let p = DVec2::new(rng.f64() * 400.0 - 200.0, rng.f64() * 400.0 - 200.0);
            let reach = rng.f64() * 60.0;
            let walked = grid.query_nearest(p, query, reach).map(|h| h.owner);
            let scanned = grid.scan_all(p, query, reach).map(|h| h.owner);
            assert_eq!(walked, scanned, "at {p} within {reach}");
        }
    }

    #[test]
    fn update_moves_sensor() {
        let mut grid = SpatialHash::new(32.0, 128, 8);
        let tag = CollisionGroups::organism(4);
        let query = CollisionGroups::prey_query(5).unwrap();
        let a = grid.insert(id(1), DVec2::new(0.0, 0.0), 1.0, tag).unwrap();
        grid.insert(id(2), DVec2::new(200.0, 0.0), 1.0, tag);

        assert_eq!(grid.query_nearest(DVec2::new(190.0, 0.0), query, 20.0).unwrap().owner, id(2));
        grid.update(a, DVec2::new(195.0, 0.0), 2.0);
        let hit = grid.query_nearest(DVec2::new(190.0, 0.0), query, 20.0).unwrap();
        assert_eq!(hit.owner, id(1));
        assert_eq!(hit.radius, 2.0);
    }

    #[test]
    fn removed_and_retired_sensors_are_invisible() {
        let mut grid = SpatialHash::new(32.0, 128, 8);
        let tag = CollisionGroups::organism(1);
        let query = CollisionGroups::prey_query(2).unwrap();
        let a = grid.insert(id(1), DVec2::ZERO, 1.0, tag).unwrap();
        let b = grid.insert(id(2), DVec2::new(5.0, 0.0), 1.0, tag).unwrap();

        grid.set_groups(a, CollisionGroups::NONE);
        assert_eq!(grid.query_nearest(DVec2::ZERO, query, 10.0).unwrap().owner, id(2));

        grid.remove(b);
        grid.remove(b); // stale handle, ignored
        assert!(grid.query_nearest(DVec2::ZERO, query, 10.0).is_none());
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn stale_handle_does_not_touch_reused_slot() {
        let mut grid = SpatialHash::new(32.0, 128, 8);
        let tag = CollisionGroups::organism(0);
        let a = grid.insert(id(1), DVec2::ZERO, 1.0, tag).unwrap();
        grid.remove(a);
        let b = grid.insert(id(2), DVec2::new(3.0, 3.0), 1.0, tag).unwrap();
        grid.update(a, DVec2::new(999.0, 999.0), 1.0);
        let hit = grid
            .query_nearest(DVec2::new(3.0, 3.0), CollisionGroups::prey_query(1).unwrap(), 10.0)
            .unwrap();
        assert_eq!(hit.owner, id(2));
        assert_eq!(hit.center, DVec2::new(3.0, 3.0));
        assert_ne!(a, b);
    }

    #[test]
    fn full_index_declines() {
        let mut grid = SpatialHash::new(32.0, 16, 1);
        let tag = CollisionGroups::organism(0);
        assert!(grid.insert(id(1), DVec2::ZERO, 1.0, tag).is_some());
        assert!(grid.insert(id(2), DVec2::ZERO, 1.0, tag).is_none());
    }

    #[test]
    fn masked_query_across_all_levels() {
        let mut grid = SpatialHash::new(16.0, 64, 64);
        // Co-located stack: one organism per level, plus jitter.
        for level in 0..16u32 {
            let p = DVec2::new(level as f64 * 0.1, 0.0);
            grid.insert(id(level as u64), p, 1.0, CollisionGroups::organism(level));
        }
        for predator in 1..16u32 {
            let query = CollisionGroups::prey_query(predator).unwrap();
            let hit = grid.query_nearest(DVec2::new(0.75, 0.0), query, 2.0).unwrap();
            assert_eq!(hit.owner, id((predator - 1) as u64));
            assert_eq!(hit.groups.level_bit_index(), Some(predator - 1));
        }
    }
}
