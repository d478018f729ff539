//! The player's organism: steered by input, scored per meal, and rebuilt as a
//! new creature at each evolution.

use std::f64::consts::FRAC_PI_4;

use glam::DVec2;

use crate::config::SimConfig;
use crate::draw::Color;
use crate::organism::template::{
    AnatomySpec, BlobSpec, FishSpec, Hue, Look, OrganismTemplate, Paint, WormSpec,
};
use crate::organism::{Organism, Predation, Spawn, TURN_SPEED};
use crate::world::{PlayerSnapshot, WorldContext};

/// Player speed in body lengths per second.
pub const PLAYER_SPEED: f64 = 5.0;
/// Player reach as a multiple of its size, before subtracting the prey's.
const EAT_REACH: f64 = 1.5;

/// Steering for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Absolute heading to swim toward, e.g. from the pointer.
    pub steer_toward: Option<f64>,
    pub turn_left: bool,
    pub turn_right: bool,
}

/// Result of offering the player a meal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    Refused,
    Ate,
    Evolved(u32),
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Upgrade {
    /// Keep the body, take on the organism's own hue.
    Recolor,
    Become(OrganismTemplate),
    Keep,
}

fn player_template(look: Look, anatomy: AnatomySpec) -> OrganismTemplate {
    OrganismTemplate {
        speed: PLAYER_SPEED,
        ..OrganismTemplate::new(look, anatomy)
    }
}

fn tinted(hue: f64, stroke_width: f64) -> Look {
    Look {
        hue: Hue::Fixed(hue),
        stroke_width,
        ..Look::default()
    }
}

fn starting_template() -> OrganismTemplate {
    player_template(
        Look {
            hue: Hue::Fixed(0.0),
            fill: Paint::Fixed(Color::BLACK),
            stroke: Paint::Fixed(Color::WHITE),
            stroke_width: 0.4,
            fill_alpha: 1.0,
        },
        AnatomySpec::Blob(BlobSpec::default()),
    )
}

/// What reaching `level` does to the player's body.
fn upgrade(level: u32) -> Upgrade {
    let worm = |joints, eyes| AnatomySpec::Worm(WormSpec { joints, eyes });
    let fish = AnatomySpec::Fish;
    let become_ = |look, anatomy| Upgrade::Become(player_template(look, anatomy));
    match level {
        2 => Upgrade::Recolor,
        3 => become_(
            tinted(30.0, 1.6),
            AnatomySpec::Blob(BlobSpec {
                specks: 10,
                ..BlobSpec::default()
            }),
        ),
        4 => become_(tinted(60.0, 3.2), worm(3, false)),
        5 => become_(tinted(90.0, 6.4), worm(6, true)),
        6 => become_(tinted(120.0, 12.8), worm(9, true)),
        7 => become_(tinted(150.0, 25.6), fish(FishSpec::default())),
        8 => become_(
            tinted(180.0, 51.2),
            fish(FishSpec {
                thickness: 1.8,
                back_fins: true,
                spots: true,
                ..FishSpec::default()
            }),
        ),
        9 => become_(
            tinted(210.0, 102.4),
            fish(FishSpec {
                thickness: 2.8,
                back_fins: true,
                vertical_stripes: true,
                eye_angle: FRAC_PI_4,
                ..FishSpec::default()
            }),
        ),
        10 => become_(
            Look {
                fill: Paint::Oklch {
                    lightness: 0.2,
                    chroma: 0.3,
                },
                ..tinted(240.0, 204.8)
            },
            fish(FishSpec {
                thickness: 2.5,
                back_fins: true,
                pupils: false,
                eye_angle: FRAC_PI_4,
                eye_size: 0.2,
                fin_scale: 0.3,
                round_tail: 0.5,
                round_head: 3.0,
                caudal_fin: false,
                ..FishSpec::default()
            }),
        ),
        _ => Upgrade::Keep,
    }
}

#[derive(Debug)]
pub struct Player {
    organism: Organism,
    level: u32,
    points: u32,
    progress: f64,
    was_hunted: bool,
}

impl Player {
    /// Spawn at the origin as a pale blob, then jump straight to the starting
    /// level's body.
    pub fn new(config: &SimConfig, ctx: &mut WorldContext) -> Self {
        let level = config.starting_level;
        let organism = Organism::spawn(
            &starting_template(),
            Spawn {
                level,
                size: config.size_for(level),
                position: DVec2::ZERO,
                direction: 0.0,
                target_direction: 0.0,
                is_player: true,
            },
            ctx,
        );
        let mut player = Self {
            organism,
            level,
            points: 0,
            progress: 0.0,
            was_hunted: false,
        };
        if level > 1 {
            player.apply_upgrade(config, ctx);
        }
        player
    }

    pub fn organism(&self) -> &Organism {
        &self.organism
    }

    pub fn organism_mut(&mut self) -> &mut Organism {
        &mut self.organism
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    /// Fraction of the current level's meals eaten.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn position(&self) -> DVec2 {
        self.organism.position()
    }

    pub fn is_dead(&self) -> bool {
        self.organism.is_dead()
    }

    /// Whether anything chased the player during the last ecosystem pass.
    pub fn was_hunted(&self) -> bool {
        self.was_hunted
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot::at(self.organism.position(), self.organism.size(), self.level)
    }

    /// Steer, move and look for food. A returned `Eat` must be resolved
    /// against the prey with [`Player::feed`].
    pub fn update(&mut self, dt: f64, input: &PlayerInput, ctx: &mut WorldContext) -> Option<Predation> {
        if self.organism.is_dead() {
            return None;
        }

        let mut target = input
            .steer_toward
            .unwrap_or_else(|| self.organism.target_direction());
        let turn = TURN_SPEED * dt;
        if input.turn_left {
            target += turn;
        }
        if input.turn_right {
            target -= turn;
        }
        self.organism.set_target_direction(target);

        // Hunters mark the player during the ecosystem pass; the tick clears it.
        self.was_hunted = self.organism.is_hunted();
        self.organism.tick(dt, 1.0, ctx);

        let Some(prey) = self.organism.scan_prey(&*ctx.spatial) else {
            self.organism.track(None);
            return None;
        };
        if prey.distance < self.organism.size() * EAT_REACH - prey.size {
            Some(Predation::Eat {
                prey: prey.id,
                distance: prey.distance,
                angle: prey.angle,
            })
        } else {
            self.organism.track(Some(prey));
            None
        }
    }

    /// Eat `prey`, scoring a point and evolving once the level's quota is met.
    pub fn feed(
        &mut self,
        outcome: Predation,
        prey: &mut Organism,
        config: &SimConfig,
        ctx: &mut WorldContext,
    ) -> Growth {
        if !matches!(outcome, Predation::Eat { .. }) {
            return Growth::Refused;
        }
        if !self.organism.resolve_predation(outcome, prey, ctx.spatial) {
            return Growth::Refused;
        }

        let Some(needed) = config.points_for(self.level) else {
            return Growth::Ate;
        };
        self.points += 1;
        self.progress = self.points as f64 / needed as f64;
        log::debug!("player ate {:?}: {}/{}", prey.id(), self.points, needed);

        if self.points >= needed {
            self.evolve(config, ctx);
            return Growth::Evolved(self.level);
        }
        Growth::Ate
    }

    fn evolve(&mut self, config: &SimConfig, ctx: &mut WorldContext) {
        self.level += 1;
        self.points = 0;
        self.progress = 0.0;
        self.organism.set_level(self.level, ctx.spatial);
        self.organism.set_target_size(config.size_for(self.level));
        self.apply_upgrade(config, ctx);
        self.organism.set_alpha(0.0);
        log::info!(
            "player evolved to level {} as a {}",
            self.level,
            self.organism.anatomy().name()
        );
    }

    fn apply_upgrade(&mut self, config: &SimConfig, ctx: &mut WorldContext) {
        match upgrade(self.level) {
            Upgrade::Keep => {}
            Upgrade::Recolor => {
                let palette = self.organism.palette_mut();
                palette.stroke = Color::from_oklch(0.7, 0.3, palette.hue);
                palette.fill = Color::from_oklch(0.1, 0.1, palette.hue);
                palette.stroke_width = 0.8;
            }
            Upgrade::Become(template) => {
                let next = Organism::spawn(
                    &template,
                    Spawn {
                        level: self.level,
                        size: config.size_for(self.level),
                        position: self.organism.position(),
                        direction: self.organism.direction(),
                        target_direction: self.organism.target_direction(),
                        is_player: true,
                    },
                    ctx,
                );
                let old = std::mem::replace(&mut self.organism, next);
                old.destroy(ctx);
            }
        }
    }
}
