//! Population management around the player.
//!
//! Levels are indexed by evolutionary level. Only levels within
//! [`band::LOWEST_OFFSET`]..=[`band::HIGHEST_OFFSET`] of the player exist;
//! everything else is torn down or not yet created.

pub mod band;
pub mod level;

pub use band::{band_offset, BandProfile};
pub use level::{Level, PreyPool};

use crate::config::SimConfig;
use crate::draw::DrawList;
use crate::organism::template::ecosystem_template;
use crate::organism::Organism;
use crate::world::WorldContext;

#[derive(Debug, Default)]
pub struct Ecosystem {
    levels: Vec<Option<Level>>,
}

impl Ecosystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create, reband and tear down levels for a player at `player_level`.
    pub fn sync_bands(&mut self, player_level: u32, config: &SimConfig, ctx: &mut WorldContext) {
        let highest = player_level as i64 - band::LOWEST_OFFSET;
        if self.levels.len() as i64 <= highest {
            self.levels.resize_with(highest as usize + 1, || None);
        }

        for (index, slot) in self.levels.iter_mut().enumerate() {
            let index = index as u32;
            match BandProfile::for_offset(band_offset(player_level, index)) {
                Some(band) => match slot {
                    Some(level) => level.set_band(band),
                    None => {
                        let Some(template) = ecosystem_template(index) else {
                            continue;
                        };
                        log::info!(
                            "level {index} created (population {}, speed {})",
                            band.max_population,
                            band.speed_modifier
                        );
                        *slot = Some(Level::new(index, template, config.size_for(index), band));
                    }
                },
                None => {
                    if let Some(level) = slot.take() {
                        log::info!("level {index} torn down ({} organisms)", level.population());
                        level.teardown(ctx);
                    }
                }
            }
        }
    }

    /// Update every live level in ascending order. Hunters in level `i` see
    /// level `i - 1`, and the player when it sits at `i - 1`.
    pub fn update(&mut self, dt: f64, ctx: &mut WorldContext, player: &mut Organism, config: &SimConfig) {
        for i in 0..self.levels.len() {
            let (lower, rest) = self.levels.split_at_mut(i);
            let Some(level) = rest.first_mut().and_then(Option::as_mut) else {
                continue;
            };
            let player_is_prey = !player.is_dead() && player.level() + 1 == level.index();
            let mut pool = PreyPool {
                level: lower.last_mut().and_then(Option::as_mut),
                player: if player_is_prey { Some(&mut *player) } else { None },
            };
            level.update(dt, ctx, &mut pool, config);
        }
    }

    pub fn level(&self, index: u32) -> Option<&Level> {
        self.levels.get(index as usize)?.as_ref()
    }

    pub fn level_mut(&mut self, index: u32) -> Option<&mut Level> {
        self.levels.get_mut(index as usize)?.as_mut()
    }

    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter().flatten()
    }

    /// Organisms across every live level.
    pub fn population(&self) -> usize {
        self.levels().map(Level::population).sum()
    }

    /// Destroy every level.
    pub fn teardown(&mut self, ctx: &mut WorldContext) {
        for level in self.levels.drain(..).flatten() {
            level.teardown(ctx);
        }
    }

    /// Draw levels bottom-up so larger creatures cover smaller ones.
    pub fn draw(&self, draw: &mut DrawList) {
        for level in self.levels() {
            level.draw(draw);
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::spatial::SpatialIndex;
    use crate::organism::template::ecosystem_template;
    use crate::organism::Spawn;
    use crate::world::testing::TestWorld;

    fn live(eco: &Ecosystem) -> Vec<u32> {
        eco.levels().map(Level::index).collect()
    }

    fn player(world: &mut TestWorld, level: u32, position: DVec2) -> Organism {
        let template = ecosystem_template(level).unwrap();
        Organism::spawn(
            &template,
            Spawn {
                level,
                size: crate::config::LEVEL_SIZES[level as usize],
                position,
                direction: 0.0,
                target_direction: 0.0,
                is_player: true,
            },
            &mut world.ctx(),
        )
    }

    #[test]
    fn bands_follow_the_player() {
        let mut world = TestWorld::new(1);
        let config = SimConfig::default();
        let mut eco = Ecosystem::new();

        eco.sync_bands(1, &config, &mut world.ctx());
        assert_eq!(live(&eco), vec![0, 1, 2, 3, 4]);
        let far = eco.level(4).unwrap().band();
        assert_eq!((far.max_population, far.speed_modifier, far.alpha), (1, 0.3, 0.5));
        assert_eq!(eco.level(0).unwrap().band().max_population, 20);

        eco.sync_bands(3, &config, &mut world.ctx());
        assert_eq!(live(&eco), vec![2, 3, 4, 5, 6]);
        assert_eq!(eco.level(4).unwrap().band().max_population, 10);
    }

    #[test]
    fn levels_without_templates_stay_empty() {
        let mut world = TestWorld::new(2);
        let mut eco = Ecosystem::new();
        eco.sync_bands(9, &SimConfig::default(), &mut world.ctx());
        assert_eq!(live(&eco), vec![8, 9]);
    }

    #[test]
    fn teardown_releases_sensors() {
        let mut world = TestWorld::new(3);
        let config = SimConfig::default();
        let mut eco = Ecosystem::new();
        let mut me = player(&mut world, 1, DVec2::ZERO);
        eco.sync_bands(1, &config, &mut world.ctx());
        for _ in 0..10 {
            eco.update(1.0 / 60.0, &mut world.ctx(), &mut me, &config);
        }
        assert!(eco.population() > 0);
        assert_eq!(world.spatial.len(), eco.population() + 1);

        eco.sync_bands(4, &config, &mut world.ctx());
        assert!(eco.level(0).is_none() && eco.level(1).is_none() && eco.level(2).is_none());
        assert_eq!(world.spatial.len(), eco.population() + 1);

        eco.teardown(&mut world.ctx());
        assert_eq!(eco.population(), 0);
        assert_eq!(world.spatial.len(), 1);
    }

    #[test]
    fn hunters_can_eat_the_player() {
        let mut world = TestWorld::new(4);
        let config = SimConfig {
            cull_radius: 1.0e9,
            ..SimConfig::default()
        };
        let mut eco = Ecosystem::new();
        let mut me = player(&mut world, 1, DVec2::new(2.0, 0.0));
        eco.sync_bands(1, &config, &mut world.ctx());
        eco.level_mut(2)
            .unwrap()
            .spawn_at(DVec2::ZERO, 0.0, &mut world.ctx());

        eco.update(1.0 / 60.0, &mut world.ctx(), &mut me, &config);
        assert!(me.is_dead());
    }
}
