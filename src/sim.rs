//! Fixed-step driver tying the player, the ecosystem and the particle layer
//! together.

use glam::DVec2;

use crate::config::{ConfigError, SimConfig};
use crate::draw::DrawList;
use crate::ecosystem::Ecosystem;
use crate::particles::ParticleSystem;
use crate::player::{Growth, Player, PlayerInput};
use crate::spatial::SpatialHash;
use crate::stats::{timed, TickCost};
use crate::world::{IdAllocator, PlayerSnapshot, WorldContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimStatus {
    Running,
    Won,
    GameOver,
}

/// Collaborators every update borrows through a [`WorldContext`].
struct Shared {
    spatial: SpatialHash,
    particles: ParticleSystem,
    rng: fastrand::Rng,
    ids: IdAllocator,
}

impl Shared {
    fn ctx(&mut self, player: PlayerSnapshot, zoom: f64) -> WorldContext<'_> {
        WorldContext {
            spatial: &mut self.spatial,
            particles: &mut self.particles,
            rng: &mut self.rng,
            ids: &mut self.ids,
            player,
            zoom,
        }
    }
}

pub struct Simulation {
    config: SimConfig,
    shared: Shared,
    ecosystem: Ecosystem,
    player: Player,
    /// Current camera zoom. The runner eases it toward `target_zoom`.
    zoom: f64,
    target_zoom: f64,
    status: SimStatus,
    time: f64,
    last_cost: TickCost,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        let mut shared = Shared {
            spatial: SpatialHash::new(
                config.spatial_cell_size,
                config.spatial_table_size,
                config.spatial_capacity,
            ),
            particles: ParticleSystem::with_capacity(config.max_particles),
            rng,
            ids: IdAllocator::new(),
        };

        let level = config.starting_level;
        let zoom = config.zoom_for(level);
        let origin = PlayerSnapshot::at(DVec2::ZERO, config.size_for(level), level);
        let player = Player::new(&config, &mut shared.ctx(origin, zoom));

        let mut ecosystem = Ecosystem::new();
        ecosystem.sync_bands(level, &config, &mut shared.ctx(player.snapshot(), zoom));

        log::info!(
            "simulation started at level {} (win at {}, zoom {:.3})",
            level,
            config.win_level,
            zoom
        );

        Ok(Self {
            config,
            shared,
            ecosystem,
            player,
            zoom,
            target_zoom: zoom,
            status: SimStatus::Running,
            time: 0.0,
            last_cost: TickCost::default(),
        })
    }

    /// Advance one step of `dt` seconds. Finished simulations stay frozen.
    pub fn tick(&mut self, dt: f64, input: &PlayerInput) -> SimStatus {
        if self.status != SimStatus::Running {
            return self.status;
        }
        self.time += dt;
        let mut cost = TickCost::default();

        timed(&mut cost.particles, || self.shared.particles.update(dt));

        let snapshot = self.player.snapshot();
        timed(&mut cost.bands, || {
            self.ecosystem
                .sync_bands(self.player.level(), &self.config, &mut self.shared.ctx(snapshot, self.zoom))
        });

        timed(&mut cost.ecosystem, || {
            self.ecosystem.update(
                dt,
                &mut self.shared.ctx(snapshot, self.zoom),
                self.player.organism_mut(),
                &self.config,
            )
        });
        self.last_cost = cost;

        if self.player.is_dead() {
            return self.finish(SimStatus::GameOver);
        }

        timed(&mut cost.player, || self.update_player(dt, input));
        self.last_cost = cost;

        if self.player.level() >= self.config.win_level {
            return self.finish(SimStatus::Won);
        }
        self.status
    }

    fn update_player(&mut self, dt: f64, input: &PlayerInput) {
        let mut ctx = self.shared.ctx(self.player.snapshot(), self.zoom);
        let Some(outcome) = self.player.update(dt, input, &mut ctx) else {
            return;
        };

        let prey_level = self.player.level().saturating_sub(1);
        let Some(prey) = self
            .ecosystem
            .level_mut(prey_level)
            .and_then(|level| level.find_mut(outcome.prey()))
        else {
            log::error!("player targeted {:?}, missing from level {}", outcome.prey(), prey_level);
            return;
        };

        if let Growth::Evolved(level) = self.player.feed(outcome, prey, &self.config, &mut ctx) {
            self.target_zoom *= self.config.zoom_per_level;
            log::debug!("level {level}: camera target zoom {:.4}", self.target_zoom);
        }
    }

    fn finish(&mut self, status: SimStatus) -> SimStatus {
        match status {
            SimStatus::Won => log::info!("player won at level {} after {:.1}s", self.player.level(), self.time),
            SimStatus::GameOver => log::info!(
                "game over: player eaten at level {} after {:.1}s",
                self.player.level(),
                self.time
            ),
            SimStatus::Running => {}
        }
        self.status = status;
        status
    }

    /// Append the whole scene: particles under the ecosystem under the player.
    pub fn draw(&self, draw: &mut DrawList) {
        self.shared.particles.draw(draw);
        self.ecosystem.draw(draw);
        self.player.organism().draw(draw, 1.0);
    }

    /// Destroy every organism, releasing all sensors.
    pub fn teardown(&mut self) {
        let snapshot = self.player.snapshot();
        self.ecosystem.teardown(&mut self.shared.ctx(snapshot, self.zoom));
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn status(&self) -> SimStatus {
        self.status
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn ecosystem(&self) -> &Ecosystem {
        &self.ecosystem
    }

    pub fn particles(&self) -> &ParticleSystem {
        &self.shared.particles
    }

    /// Per-phase wall-clock cost of the most recent tick.
    pub fn last_tick_cost(&self) -> TickCost {
        self.last_cost
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn target_zoom(&self) -> f64 {
        self.target_zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom > 0.0 && zoom.is_finite() {
            self.zoom = zoom;
        }
    }

    /// Organisms in the ecosystem, excluding the player.
    pub fn population(&self) -> usize {
        self.ecosystem.population()
    }

    /// Simulated seconds elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }
}
