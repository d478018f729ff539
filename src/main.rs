use std::f64::consts::PI;

use primordial::stats::TickStats;
use primordial::{DrawList, PlayerInput, SimConfig, SimStatus, Simulation};

/// Max accumulated time before we clamp (prevents spiral of death).
const MAX_ACCUMULATOR: f64 = 0.25;
/// Simulated frame length. Deliberately not a multiple of the tick rate.
const FRAME_TIME: f64 = 1.0 / 50.0;
/// Give up after this much simulated time.
const MAX_SIM_SECONDS: f64 = 600.0;
/// Camera zoom easing rate, per second.
const CAMERA_EASE: f64 = 2.0;

struct App {
    sim: Simulation,
    stats: TickStats,
    draw: DrawList,
    accumulator: f64,
}

impl App {
    fn new(config: SimConfig) -> Result<Self, primordial::ConfigError> {
        Ok(Self {
            sim: Simulation::new(config)?,
            stats: TickStats::new(),
            draw: DrawList::new(),
            accumulator: 0.0,
        })
    }

    /// Head for the nearest visible meal, otherwise sweep slowly.
    fn autopilot(&self) -> PlayerInput {
        let organism = self.sim.player().organism();
        let steer_toward = match organism.closest_eatable() {
            Some(prey) => prey.angle,
            None => (self.sim.time() * 0.2).sin() * PI,
        };
        PlayerInput {
            steer_toward: Some(steer_toward),
            ..PlayerInput::default()
        }
    }

    /// Run fixed-timestep ticks for one frame, then ease the camera and draw.
    fn frame(&mut self, dt: f64) -> SimStatus {
        self.accumulator = (self.accumulator + dt).min(MAX_ACCUMULATOR);
        let tick_rate = self.sim.config().tick_rate;

        let mut status = self.sim.status();
        while self.accumulator >= tick_rate && status == SimStatus::Running {
            let input = self.autopilot();
            status = self.sim.tick(tick_rate, &input);
            self.stats.record(
                tick_rate,
                self.sim.last_tick_cost(),
                self.sim.population(),
                self.sim.particles().count(),
            );
            self.accumulator -= tick_rate;
        }

        let zoom = self.sim.zoom();
        let eased = zoom + (self.sim.target_zoom() - zoom) * (1.0 - (-CAMERA_EASE * dt).exp());
        self.sim.set_zoom(eased);

        self.draw.clear();
        self.sim.draw(&mut self.draw);
        status
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = SimConfig {
        seed: std::env::var("PRIMORDIAL_SEED").ok().and_then(|s| s.parse().ok()),
        ..SimConfig::default()
    };
    let mut app = App::new(config)?;

    let mut elapsed = 0.0;
    let status = loop {
        let status = app.frame(FRAME_TIME);
        elapsed += FRAME_TIME;
        if status != SimStatus::Running || elapsed >= MAX_SIM_SECONDS {
            break status;
        }
    };

    let player = app.sim.player();
    log::info!(
        "finished: {:?} at level {} ({} points) after {:.1}s, {} ticks, {} draw commands",
        status,
        player.level(),
        player.points(),
        app.sim.time(),
        app.stats.tick_count(),
        app.draw.len()
    );
    app.sim.teardown();
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("primordial starting up");

    if let Err(e) = run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
