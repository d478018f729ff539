//! Simulation tuning. Defaults reproduce the stock game pacing.

use thiserror::Error;

/// Body size per evolutionary level.
pub const LEVEL_SIZES: [f64; 13] = [
    1.5, 3.0, 6.0, 12.0, 24.0, 48.0, 100.0, 192.0, 384.0, 768.0, 1536.0, 3072.0, 6144.0,
];

/// Meals needed to leave each level. Index 0 is never used (the player starts at 1).
pub const POINTS_NEEDED: [u32; 11] = [0, 10, 8, 8, 10, 14, 14, 16, 14, 16, 16];

/// Reaching this level wins the game.
pub const WIN_LEVEL: u32 = 11;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("tick rate must be positive, got {0}")]
    TickRate(f64),
    #[error("starting level {start} must be between 1 and {win}")]
    StartingLevel { start: u32, win: u32 },
    #[error("size table needs an entry for every level up to {needed}, has {len}")]
    SizeTable { needed: u32, len: usize },
    #[error("points table needs an entry for every level below {needed}, has {len}")]
    PointsTable { needed: u32, len: usize },
    #[error("spawn annulus is empty: inner {inner} >= outer {outer}")]
    SpawnAnnulus { inner: f64, outer: f64 },
    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },
}

#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Fixed simulation step in seconds.
    pub tick_rate: f64,
    /// Level the player starts at.
    pub starting_level: u32,
    pub win_level: u32,
    pub sizes: Vec<f64>,
    pub points_needed: Vec<u32>,
    /// Spawn annulus around the player, in world units at zoom 1.
    pub spawn_inner_radius: f64,
    pub spawn_outer_radius: f64,
    /// Organisms farther than this (at zoom 1) from the player are culled.
    pub cull_radius: f64,
    /// Camera zoom at level 1.
    pub initial_zoom: f64,
    /// Target zoom is multiplied by this on every evolution.
    pub zoom_per_level: f64,
    pub spatial_cell_size: f64,
    pub spatial_table_size: usize,
    /// Maximum registered organisms. Spawns beyond this get no sensor.
    pub spatial_capacity: usize,
    pub max_particles: usize,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 1.0 / 60.0,
            starting_level: 1,
            win_level: WIN_LEVEL,
            sizes: LEVEL_SIZES.to_vec(),
            points_needed: POINTS_NEEDED.to_vec(),
            spawn_inner_radius: 1500.0,
            spawn_outer_radius: 4000.0,
            cull_radius: 4000.0,
            initial_zoom: 10.0,
            zoom_per_level: 0.55,
            spatial_cell_size: 256.0,
            spatial_table_size: 1024,
            spatial_capacity: 4096,
            max_particles: crate::particles::MAX_PARTICLES,
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate > 0.0) {
            return Err(ConfigError::TickRate(self.tick_rate));
        }
        if self.starting_level < 1 || self.starting_level >= self.win_level {
            return Err(ConfigError::StartingLevel {
                start: self.starting_level,
                win: self.win_level,
            });
        }
        if self.sizes.len() <= self.win_level as usize {
            return Err(ConfigError::SizeTable {
                needed: self.win_level,
                len: self.sizes.len(),
            });
        }
        if self.points_needed.len() < self.win_level as usize {
            return Err(ConfigError::PointsTable {
                needed: self.win_level,
                len: self.points_needed.len(),
            });
        }
        if !(self.spawn_inner_radius < self.spawn_outer_radius) {
            return Err(ConfigError::SpawnAnnulus {
                inner: self.spawn_inner_radius,
                outer: self.spawn_outer_radius,
            });
        }
        for (name, value) in [
            ("cull_radius", self.cull_radius),
            ("initial_zoom", self.initial_zoom),
            ("zoom_per_level", self.zoom_per_level),
            ("spatial_cell_size", self.spatial_cell_size),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NonPositive { name, value });
            }
        }
        if self.cull_radius < self.spawn_outer_radius {
            log::warn!(
                "cull radius {} is inside the spawn annulus (outer {}); some spawns will be culled immediately",
                self.cull_radius,
                self.spawn_outer_radius
            );
        }
        Ok(())
    }

    /// Body size for `level`, clamped to the last table entry.
    pub fn size_for(&self, level: u32) -> f64 {
        let idx = (level as usize).min(self.sizes.len().saturating_sub(1));
        self.sizes.get(idx).copied().unwrap_or(1.0)
    }

    /// Meals needed to leave `level`. Levels past the table never advance.
    pub fn points_for(&self, level: u32) -> Option<u32> {
        self.points_needed.get(level as usize).copied().filter(|&p| p > 0)
    }

    /// Zoom at `level`, assuming the camera has caught up with every evolution.
    pub fn zoom_for(&self, level: u32) -> f64 {
        self.initial_zoom * self.zoom_per_level.powi(level.saturating_sub(1) as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_bad_values() {
        let cfg = SimConfig {
            tick_rate: 0.0,
            ..SimConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::TickRate(0.0)));

        let cfg = SimConfig {
            starting_level: 0,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::StartingLevel { .. })));

        let cfg = SimConfig {
            spawn_inner_radius: 10.0,
            spawn_outer_radius: 5.0,
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::SpawnAnnulus { .. })));

        let cfg = SimConfig {
            sizes: vec![1.0, 2.0],
            ..SimConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::SizeTable { .. })));

        let cfg = SimConfig {
            initial_zoom: -1.0,
            ..SimConfig::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::NonPositive { name: "initial_zoom", .. })
        ));
    }

    #[test]
    fn lookups() {
        let cfg = SimConfig::default();
        assert_eq!(cfg.size_for(3), 12.0);
        assert_eq!(cfg.size_for(99), 6144.0);
        assert_eq!(cfg.points_for(1), Some(10));
        assert_eq!(cfg.points_for(0), None);
        assert_eq!(cfg.points_for(11), None);
        assert!((cfg.zoom_for(3) - 10.0 * 0.55 * 0.55).abs() < 1e-12);
    }
}
