use std::f64::consts::TAU;

use glam::DVec2;

use super::band::BandProfile;
use crate::config::SimConfig;
use crate::draw::DrawList;
use crate::geom::from_angle;
use crate::organism::{Organism, OrganismId, OrganismTemplate, Spawn};
use crate::world::WorldContext;

/// Organisms a level's hunters may take: the level below plus, when it sits
/// there, the player.
#[derive(Default)]
pub struct PreyPool<'a> {
    pub level: Option<&'a mut Level>,
    pub player: Option<&'a mut Organism>,
}

impl PreyPool<'_> {
    pub fn find_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        if let Some(player) = self.player.as_deref_mut() {
            if player.id() == id {
                return Some(player);
            }
        }
        self.level.as_deref_mut()?.find_mut(id)
    }
}

/// One population band: all autonomous organisms of a single level.
#[derive(Debug)]
pub struct Level {
    index: u32,
    template: OrganismTemplate,
    size: f64,
    band: BandProfile,
    organisms: Vec<Organism>,
}

impl Level {
    pub fn new(index: u32, template: OrganismTemplate, size: f64, band: BandProfile) -> Self {
        Self {
            index,
            template,
            size,
            band,
            organisms: Vec::with_capacity(band.max_population),
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn band(&self) -> BandProfile {
        self.band
    }

    pub fn set_band(&mut self, band: BandProfile) {
        if band != self.band {
            log::debug!("level {} rebanded: {:?}", self.index, band);
        }
        self.band = band;
    }

    pub fn organism_size(&self) -> f64 {
        self.size
    }

    pub fn organisms(&self) -> &[Organism] {
        &self.organisms
    }

    pub fn population(&self) -> usize {
        self.organisms.len()
    }

    pub fn find_mut(&mut self, id: OrganismId) -> Option<&mut Organism> {
        self.organisms.iter_mut().find(|o| o.id() == id)
    }

    /// Place one organism at a random point of the spawn annulus around the
    /// player. The annulus never reaches inside the player's own body.
    pub fn spawn(&mut self, ctx: &mut WorldContext, config: &SimConfig) -> OrganismId {
        let zoom = ctx.zoom.max(f64::EPSILON);
        let inner = (config.spawn_inner_radius / zoom).max(ctx.player.size);
        let outer = (config.spawn_outer_radius / zoom).max(inner);
        let angle = ctx.rng.f64() * TAU;
        let radius = inner + ctx.rng.f64() * (outer - inner);
        let position = ctx.player.position + from_angle(angle) * radius;
        let direction = ctx.rng.f64() * TAU;
        self.spawn_at(position, direction, ctx)
    }

    pub fn spawn_at(&mut self, position: DVec2, direction: f64, ctx: &mut WorldContext) -> OrganismId {
        let organism = Organism::spawn(
            &self.template,
            Spawn {
                level: self.index,
                size: self.size,
                position,
                direction,
                target_direction: direction,
                is_player: false,
            },
            ctx,
        );
        let id = organism.id();
        log::debug!("level {} spawned {:?} at {:.1}", self.index, id, position);
        self.organisms.push(organism);
        id
    }

    /// Tick every organism, applying its predation against `prey`, then top
    /// up the population by one and sweep out the dead and the distant.
    pub fn update(&mut self, dt: f64, ctx: &mut WorldContext, prey: &mut PreyPool, config: &SimConfig) {
        let speed = self.band.speed_modifier;
        for organism in &mut self.organisms {
            let Some(outcome) = organism.tick(dt, speed, ctx) else {
                continue;
            };
            match prey.find_mut(outcome.prey()) {
                Some(target) => {
                    organism.resolve_predation(outcome, target, ctx.spatial);
                }
                None => log::error!(
                    "level {}: {:?} targeted {:?}, which is not in its prey pool",
                    self.index,
                    organism.id(),
                    outcome.prey()
                ),
            }
        }

        if self.organisms.len() < self.band.max_population {
            self.spawn(ctx, config);
        }

        self.sweep(ctx, config.cull_radius);
    }

    /// Destroy dead organisms and those beyond `cull_radius / zoom` of the player.
    pub fn sweep(&mut self, ctx: &mut WorldContext, cull_radius: f64) {
        let limit = cull_radius / ctx.zoom.max(f64::EPSILON);
        let center = ctx.player.position;
        let mut i = 0;
        while i < self.organisms.len() {
            let organism = &self.organisms[i];
            let far = organism.position().distance(center) > limit;
            if organism.is_dead() || far {
                let organism = self.organisms.swap_remove(i);
                log::debug!(
                    "level {} removed {:?} ({})",
                    self.index,
                    organism.id(),
                    if far { "culled" } else { "eaten" }
                );
                organism.destroy(ctx);
            } else {
                i += 1;
            }
        }
    }

    /// Destroy every organism.
    pub fn teardown(mut self, ctx: &mut WorldContext) {
        for organism in self.organisms.drain(..) {
            organism.destroy(ctx);
        }
    }

    pub fn draw(&self, draw: &mut DrawList) {
        for organism in &self.organisms {
            organism.draw(draw, self.band.alpha);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::SpatialIndex;
    use crate::organism::template::ecosystem_template;
    use crate::world::testing::TestWorld;

    fn level(index: u32, offset: i64) -> Level {
        Level::new(
            index,
            ecosystem_template(index).unwrap(),
            crate::config::LEVEL_SIZES[index as usize],
            BandProfile::for_offset(offset).unwrap(),
        )
    }

    fn roomy() -> SimConfig {
        SimConfig {
            cull_radius: 1.0e9,
            ..SimConfig::default()
        }
    }

    #[test]
    fn population_converges_one_per_tick() {
        let mut world = TestWorld::new(1);
        let mut lvl = level(2, 0);
        let config = roomy();
        for tick in 1..=8 {
            lvl.update(1.0 / 60.0, &mut world.ctx(), &mut PreyPool::default(), &config);
            assert_eq!(lvl.population(), tick.min(5));
        }
        assert_eq!(world.spatial.len(), 5);
    }

    #[test]
    fn spawns_inside_annulus() {
        let mut world = TestWorld::new(2);
        world.zoom = 10.0;
        let mut lvl = level(1, 0);
        let config = SimConfig::default();
        for _ in 0..50 {
            lvl.spawn(&mut world.ctx(), &config);
        }
        for o in lvl.organisms() {
            let r = o.position().length();
            assert!((150.0..=400.0).contains(&r), "{r}");
        }
    }

    #[test]
    fn dead_leave_within_one_tick() {
        let mut world = TestWorld::new(3);
        let mut lvl = level(2, -3);
        let id = lvl.spawn_at(DVec2::new(10.0, 0.0), 0.0, &mut world.ctx());
        lvl.find_mut(id).unwrap().mark_eaten(&mut world.spatial);

        let config = SimConfig {
            cull_radius: 1.0e9,
            ..SimConfig::default()
        };
        // The band is already full, so nothing replaces it this tick.
        lvl.update(1.0 / 60.0, &mut world.ctx(), &mut PreyPool::default(), &config);
        assert!(lvl.find_mut(id).is_none());
        assert_eq!(lvl.population(), 0);
        assert_eq!(world.spatial.len(), 0);
    }

    #[test]
    fn distant_organisms_are_culled() {
        let mut world = TestWorld::new(4);
        let mut lvl = level(1, 0);
        lvl.spawn_at(DVec2::new(5000.0, 0.0), 0.0, &mut world.ctx());
        lvl.spawn_at(DVec2::new(50.0, 0.0), 0.0, &mut world.ctx());
        lvl.sweep(&mut world.ctx(), 4000.0);
        assert_eq!(lvl.population(), 1);
        assert!(world.particles.count() >= 3);
    }

    #[test]
    fn hunters_eat_from_the_pool() {
        let mut world = TestWorld::new(5);
        let mut hunters = level(3, 0);
        let mut prey = level(2, 1);
        let meal = prey.spawn_at(DVec2::new(5.0, 0.0), 0.0, &mut world.ctx());
        hunters.spawn_at(DVec2::ZERO, 0.0, &mut world.ctx());

        let config = roomy();
        let mut pool = PreyPool {
            level: Some(&mut prey),
            player: None,
        };
        hunters.update(1.0 / 60.0, &mut world.ctx(), &mut pool, &config);
        assert!(prey.find_mut(meal).unwrap().is_dead());
        let hunter = &hunters.organisms()[0];
        assert_eq!(hunter.last_eaten().map(|m| m.id), Some(meal));

        prey.sweep(&mut world.ctx(), config.cull_radius);
        assert!(prey.find_mut(meal).is_none());
    }

    #[test]
    fn teardown_releases_everything() {
        let mut world = TestWorld::new(6);
        let mut lvl = level(4, -1);
        for _ in 0..4 {
            lvl.spawn(&mut world.ctx(), &SimConfig::default());
        }
        assert_eq!(world.spatial.len(), 4);
        lvl.teardown(&mut world.ctx());
        assert_eq!(world.spatial.len(), 0);
    }
}
