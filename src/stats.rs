//! Tick cost accounting for the headless runner.

use instant::Instant;

/// Seconds of simulated time between reports.
const REPORT_INTERVAL: f64 = 5.0;

/// Wall-clock cost of one simulation tick, split by phase, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickCost {
    pub particles: f64,
    pub bands: f64,
    pub ecosystem: f64,
    pub player: f64,
}

impl TickCost {
    pub fn total(&self) -> f64 {
        self.particles + self.bands + self.ecosystem + self.player
    }

    fn add(&mut self, other: &TickCost) {
        self.particles += other.particles;
        self.bands += other.bands;
        self.ecosystem += other.ecosystem;
        self.player += other.player;
    }

    fn scaled(&self, factor: f64) -> TickCost {
        TickCost {
            particles: self.particles * factor,
            bands: self.bands * factor,
            ecosystem: self.ecosystem * factor,
            player: self.player * factor,
        }
    }
}

/// Run `f`, storing its wall-clock duration in `slot`.
pub fn timed<R>(slot: &mut f64, f: impl FnOnce() -> R) -> R {
    let start = Instant::now();
    let result = f();
    *slot = start.elapsed().as_secs_f64();
    result
}

/// Summary of one reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub ticks: u32,
    /// Simulated seconds covered.
    pub sim_seconds: f64,
    /// Mean per-phase cost.
    pub mean: TickCost,
    /// Most expensive single tick.
    pub worst: f64,
    /// Ecosystem population and live particles at the end of the window.
    pub population: usize,
    pub particles: usize,
}

impl TickReport {
    /// Simulated seconds per wall-clock second spent ticking.
    pub fn speedup(&self) -> f64 {
        let wall = self.mean.total() * self.ticks as f64;
        if wall > 0.0 {
            self.sim_seconds / wall
        } else {
            f64::INFINITY
        }
    }
}

/// Accumulates tick costs and emits a [`TickReport`] every few seconds of
/// simulated time.
#[derive(Debug, Default)]
pub struct TickStats {
    tick_count: u64,
    window_ticks: u32,
    window_time: f64,
    window_sum: TickCost,
    window_worst: f64,
    last_report: Option<TickReport>,
}

impl TickStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    /// Record one tick of `dt` simulated seconds. Returns the window summary
    /// when the window closes.
    pub fn record(&mut self, dt: f64, cost: TickCost, population: usize, particles: usize) -> Option<TickReport> {
        self.tick_count += 1;
        self.window_ticks += 1;
        self.window_time += dt;
        self.window_sum.add(&cost);
        self.window_worst = self.window_worst.max(cost.total());

        if self.window_time < REPORT_INTERVAL {
            return None;
        }

        let report = TickReport {
            ticks: self.window_ticks,
            sim_seconds: self.window_time,
            mean: self.window_sum.scaled(1.0 / self.window_ticks as f64),
            worst: self.window_worst,
            population,
            particles,
        };
        log::info!(
            "ticks: {} | avg: {:.3}ms (particles {:.0}us, bands {:.0}us, ecosystem {:.0}us, player {:.0}us) | worst: {:.3}ms | {:.0}x realtime | organisms: {} | particles: {}",
            self.tick_count,
            report.mean.total() * 1000.0,
            report.mean.particles * 1e6,
            report.mean.bands * 1e6,
            report.mean.ecosystem * 1e6,
            report.mean.player * 1e6,
            report.worst * 1000.0,
            report.speedup(),
            population,
            particles,
        );

        self.window_ticks = 0;
        self.window_time = 0.0;
        self.window_sum = TickCost::default();
        self.window_worst = 0.0;
        self.last_report = Some(report);
        Some(report)
    }
}
