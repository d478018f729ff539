//! Organisms: movement, predation and lifecycle shared by every creature,
//! with per-variant bodies in [`anatomy`].

pub mod anatomy;
mod blob;
mod fish;
pub mod template;
mod worm;

use std::f64::consts::TAU;

use glam::DVec2;

use crate::draw::{Color, DrawList};
use crate::geom::{angle_diff, from_angle, heading};
use crate::noise_field::{NoiseField, NoiseOptions};
use crate::particles::ParticleSpawn;
use crate::spatial::{CollisionGroups, SpatialHandle, SpatialIndex};
use crate::world::WorldContext;

pub use anatomy::Anatomy;
pub use template::OrganismTemplate;
use template::Look;

/// Size gained per second while growing toward `target_size`.
pub const GROWTH_RATE: f64 = 100.0;
/// Maximum turn rate, radians per second.
pub const TURN_SPEED: f64 = 2.0;
/// Trail particles shed per second, on average.
pub const EMISSION_RATE: f64 = 3.0;
/// Seconds for a freshly spawned organism to fade in.
const FADE_IN: f64 = 3.0;
const PLAYER_FADE_IN: f64 = 2.0;
/// A meal keeps shaping the body for this long.
const MEAL_MEMORY: f64 = 1.0;
const WANDER_SWAY: f64 = 0.5;
/// Trail particle speed relative to the organism's own.
const TRAIL_DRAG: f64 = 0.8;

/// Stable identity for the lifetime of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OrganismId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganismState {
    Wandering,
    /// Steering toward `closest_eatable`.
    Hunting,
    /// Eaten. Invisible to queries; removed by the owner on its next sweep.
    Dead,
}

/// Nearest eligible prey as seen from the hunter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreyFix {
    pub id: OrganismId,
    /// Centre-to-centre distance.
    pub distance: f64,
    /// Direction from hunter to prey.
    pub angle: f64,
    pub size: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Meal {
    pub id: OrganismId,
    pub distance: f64,
    pub angle: f64,
    /// Seconds since the meal.
    pub elapsed: f64,
}

/// What the organism is paying attention to, weighted by recency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Focus {
    pub angle: f64,
    pub distance: f64,
    pub weight: f64,
}

/// Resolved colors for one organism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    pub hue: f64,
    pub fill: Color,
    pub stroke: Color,
    pub stroke_width: f64,
    pub fill_alpha: f64,
}

impl Palette {
    pub fn from_look(look: &Look, rng: &mut fastrand::Rng) -> Self {
        let hue = look.hue.pick(rng);
        Self {
            hue,
            fill: look.fill.resolve(hue),
            stroke: look.stroke.resolve(hue),
            stroke_width: look.stroke_width,
            fill_alpha: look.fill_alpha,
        }
    }

    pub fn plain(stroke: Color, fill: Color) -> Self {
        Self {
            hue: 0.0,
            fill,
            stroke,
            stroke_width: 1.0,
            fill_alpha: 1.0,
        }
    }
}

/// Snapshot of the state anatomy code animates from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: DVec2,
    pub direction: f64,
    pub size: f64,
    pub timer: f64,
    pub level: u32,
    pub hunting_range: f64,
    pub focus: Option<Focus>,
    pub is_player: bool,
}

/// Outcome of a tick that involves another organism. The caller owns the
/// prey and applies it with [`Organism::resolve_predation`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Predation {
    Eat {
        prey: OrganismId,
        distance: f64,
        angle: f64,
    },
    Hunt {
        prey: OrganismId,
    },
}

impl Predation {
    pub fn prey(&self) -> OrganismId {
        match *self {
            Predation::Eat { prey, .. } | Predation::Hunt { prey } => prey,
        }
    }
}

/// Placement for a new organism.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spawn {
    pub level: u32,
    pub size: f64,
    pub position: DVec2,
    pub direction: f64,
    pub target_direction: f64,
    pub is_player: bool,
}

#[derive(Debug)]
pub struct Organism {
    id: OrganismId,
    level: u32,
    is_player: bool,
    position: DVec2,
    direction: f64,
    target_direction: f64,
    /// Body lengths per second.
    speed: f64,
    size: f64,
    target_size: f64,
    hunting_range: f64,
    state: OrganismState,
    hunted: bool,
    closest_eatable: Option<PreyFix>,
    last_eaten: Option<Meal>,
    timer: f64,
    alpha: f64,
    palette: Palette,
    groups: CollisionGroups,
    handle: Option<SpatialHandle>,
    move_noise: NoiseField,
    anatomy: Anatomy,
}

impl Organism {
    /// Build an organism and register its sensor. A full spatial index leaves
    /// it unregistered: it still moves and eats, but nothing can find it.
    pub fn spawn(template: &OrganismTemplate, spawn: Spawn, ctx: &mut WorldContext) -> Self {
        let id = ctx.ids.next_id();
        let size = spawn.size.max(f64::EPSILON);
        let palette = Palette::from_look(&template.look, ctx.rng);
        let groups = CollisionGroups::organism(spawn.level);

        let handle = ctx.spatial.insert(id, spawn.position, size, groups);
        if handle.is_none() {
            log::warn!("spatial index full, {id:?} spawned without a sensor");
        }

        let move_noise = NoiseField::new(NoiseOptions::ranged(-0.01, 0.01, 0.5 / size), ctx.rng);
        let anatomy = Anatomy::build(
            &template.anatomy,
            spawn.position,
            size,
            spawn.level,
            palette.hue,
            ctx.rng,
        );

        Self {
            id,
            level: spawn.level,
            is_player: spawn.is_player,
            position: spawn.position,
            direction: spawn.direction,
            target_direction: spawn.target_direction,
            speed: template.speed,
            size,
            target_size: size,
            hunting_range: template.hunting_range,
            state: OrganismState::Wandering,
            hunted: false,
            closest_eatable: None,
            last_eaten: None,
            timer: 0.0,
            alpha: if spawn.is_player { 1.0 } else { 0.0 },
            palette,
            groups,
            handle,
            move_noise,
            anatomy,
        }
    }

    pub fn id(&self) -> OrganismId {
        self.id
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn is_player(&self) -> bool {
        self.is_player
    }

    pub fn position(&self) -> DVec2 {
        self.position
    }

    pub fn direction(&self) -> f64 {
        self.direction
    }

    pub fn target_direction(&self) -> f64 {
        self.target_direction
    }

    pub fn set_target_direction(&mut self, angle: f64) {
        self.target_direction = angle;
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn target_size(&self) -> f64 {
        self.target_size
    }

    /// Grow toward `size` at [`GROWTH_RATE`]. Organisms never shrink.
    pub fn set_target_size(&mut self, size: f64) {
        self.target_size = size;
    }

    pub fn hunting_range(&self) -> f64 {
        self.hunting_range
    }

    pub fn state(&self) -> OrganismState {
        self.state
    }

    pub fn is_dead(&self) -> bool {
        self.state == OrganismState::Dead
    }

    pub fn is_hunting(&self) -> bool {
        self.state == OrganismState::Hunting
    }

    /// Something chased this organism since its last tick.
    pub fn is_hunted(&self) -> bool {
        self.hunted
    }

    pub fn closest_eatable(&self) -> Option<PreyFix> {
        self.closest_eatable
    }

    pub fn last_eaten(&self) -> Option<Meal> {
        self.last_eaten
    }

    pub fn recently_ate(&self) -> bool {
        self.last_eaten.is_some_and(|m| m.elapsed < MEAL_MEMORY)
    }

    pub fn timer(&self) -> f64 {
        self.timer
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    pub fn groups(&self) -> CollisionGroups {
        self.groups
    }

    pub fn has_sensor(&self) -> bool {
        self.handle.is_some()
    }

    pub fn anatomy(&self) -> &Anatomy {
        &self.anatomy
    }

    fn focus(&self) -> Option<Focus> {
        if let Some(meal) = self.last_eaten.filter(|m| m.elapsed < MEAL_MEMORY) {
            return Some(Focus {
                angle: meal.angle,
                distance: meal.distance,
                weight: 1.0 - meal.elapsed,
            });
        }
        self.closest_eatable.map(|prey| Focus {
            angle: prey.angle,
            distance: prey.distance,
            weight: 1.0,
        })
    }

    pub fn pose(&self) -> Pose {
        Pose {
            position: self.position,
            direction: self.direction,
            size: self.size,
            timer: self.timer,
            level: self.level,
            hunting_range: self.hunting_range,
            focus: self.focus(),
            is_player: self.is_player,
        }
    }

    /// Advance one step. Autonomous organisms also hunt; the returned
    /// predation names the prey and must be applied by whoever owns it.
    pub fn tick(&mut self, dt: f64, speed_modifier: f64, ctx: &mut WorldContext) -> Option<Predation> {
        if self.is_dead() {
            return None;
        }
        self.timer += dt;
        if let Some(meal) = self.last_eaten.as_mut() {
            meal.elapsed += dt;
        }
        self.hunted = false;

        if self.target_size > self.size {
            let old = self.size;
            self.size = (self.size + GROWTH_RATE * dt).min(self.target_size);
            self.anatomy.resize(old, self.size, self.level);
        }

        let speed = self.anatomy.swim_speed(self.speed, self.timer);
        self.position += from_angle(self.direction) * speed * self.size * dt * speed_modifier;

        let diff = angle_diff(self.direction, self.target_direction);
        let turn = TURN_SPEED * dt;
        if diff.abs() > turn {
            self.direction += turn * diff.signum();
        }

        if let Some(handle) = self.handle {
            ctx.spatial.update(handle, self.position, self.size);
        }

        let predation = if self.is_player {
            None
        } else {
            self.forage(dt, &*ctx.spatial)
        };

        let pose = self.pose();
        self.anatomy.update(dt, &pose, self.palette.hue, ctx.rng);

        if ctx.rng.f64() < EMISSION_RATE * dt {
            let origin = self.anatomy.emission_point(&pose);
            let vel = -from_angle(self.direction) * speed * self.size * speed_modifier * TRAIL_DRAG;
            self.shed(origin, vel, ctx);
        }

        let fade = if self.is_player { PLAYER_FADE_IN } else { FADE_IN };
        self.alpha = (self.alpha + dt / fade).min(1.0);

        predation
    }

    /// Hunt, eat or wander.
    fn forage(&mut self, dt: f64, spatial: &dyn SpatialIndex) -> Option<Predation> {
        self.state = OrganismState::Wandering;

        if let Some(prey) = self.scan_prey(spatial) {
            if prey.distance < self.size - prey.size {
                self.closest_eatable = None;
                return Some(Predation::Eat {
                    prey: prey.id,
                    distance: prey.distance,
                    angle: prey.angle,
                });
            }
            if prey.distance < self.hunting_range * self.size {
                self.closest_eatable = Some(prey);
                self.target_direction = prey.angle;
                self.state = OrganismState::Hunting;
                return Some(Predation::Hunt { prey: prey.id });
            }
        }

        self.closest_eatable = None;
        let drift = self.move_noise.get3(self.position.x, self.position.y, self.timer);
        self.target_direction += drift + self.timer.sin() * WANDER_SWAY * dt;
        None
    }

    /// Nearest organism exactly one level below, within hunting range.
    /// Level 0 never hunts.
    pub fn scan_prey(&self, spatial: &dyn SpatialIndex) -> Option<PreyFix> {
        let query = CollisionGroups::prey_query(self.level)?;
        let reach = self.hunting_range * self.size;
        let hit = spatial.query_nearest(self.position, query, reach)?;
        let expected = (self.level - 1) % crate::spatial::groups::LEVEL_BITS;
        if hit.groups.level_bit_index() != Some(expected) {
            log::error!(
                "{:?} at level {} matched {:?} outside its prey level ({:?})",
                self.id,
                self.level,
                hit.owner,
                hit.groups
            );
            return None;
        }
        Some(PreyFix {
            id: hit.owner,
            distance: hit.distance,
            angle: heading(hit.center - self.position),
            size: hit.radius,
        })
    }

    /// Cache a prey the player could not reach yet.
    pub fn track(&mut self, prey: Option<PreyFix>) {
        self.closest_eatable = prey;
    }

    /// Apply `outcome` to `prey`. Mismatched or ineligible prey is logged and
    /// skipped. Returns true when the prey was eaten.
    pub fn resolve_predation(
        &mut self,
        outcome: Predation,
        prey: &mut Organism,
        spatial: &mut dyn SpatialIndex,
    ) -> bool {
        if self.is_dead() || prey.id != outcome.prey() || prey.is_dead() || prey.level + 1 != self.level {
            log::error!(
                "{:?} (level {}) cannot take {:?} (level {}, {:?}) for {:?}",
                self.id,
                self.level,
                prey.id,
                prey.level,
                prey.state,
                outcome
            );
            return false;
        }
        match outcome {
            Predation::Eat { distance, angle, .. } => {
                prey.mark_eaten(spatial);
                self.record_meal(prey.id, distance, angle);
                true
            }
            Predation::Hunt { .. } => {
                prey.mark_hunted();
                false
            }
        }
    }

    pub fn record_meal(&mut self, id: OrganismId, distance: f64, angle: f64) {
        self.closest_eatable = None;
        self.last_eaten = Some(Meal {
            id,
            distance,
            angle,
            elapsed: 0.0,
        });
    }

    /// Kill this organism and hide it from every query immediately. Death is
    /// final: nothing restores the groups afterwards.
    pub fn mark_eaten(&mut self, spatial: &mut dyn SpatialIndex) {
        self.state = OrganismState::Dead;
        self.closest_eatable = None;
        self.groups = CollisionGroups::NONE;
        if let Some(handle) = self.handle {
            spatial.set_groups(handle, self.groups);
        }
    }

    pub fn mark_hunted(&mut self) {
        self.hunted = true;
    }

    /// Move to a new level, re-tagging the sensor. The dead stay untagged.
    pub fn set_level(&mut self, level: u32, spatial: &mut dyn SpatialIndex) {
        self.level = level;
        if self.is_dead() {
            return;
        }
        self.groups = CollisionGroups::organism(level);
        if let Some(handle) = self.handle {
            spatial.set_groups(handle, self.groups);
        }
    }

    fn shed(&self, origin: DVec2, vel: DVec2, ctx: &mut WorldContext) {
        let offset = from_angle(ctx.rng.f64() * TAU) * self.size * 0.5;
        ctx.particles.spawn(ParticleSpawn {
            pos: origin + offset,
            vel,
            size: self.size * ctx.rng.f64() * 0.6,
            color: self.palette.stroke,
            alpha: 0.1,
            max_age: 0.5 + ctx.rng.f64() * 1.5,
        });
    }

    /// Release the sensor and scatter a burst of particles where the body was.
    pub fn destroy(mut self, ctx: &mut WorldContext) {
        if let Some(handle) = self.handle.take() {
            ctx.spatial.remove(handle);
        }
        let pose = self.pose();
        for origin in self.anatomy.burst_points(&pose) {
            self.shed(origin, DVec2::ZERO, ctx);
        }
    }

    pub fn draw(&self, draw: &mut DrawList, alpha: f64) {
        let alpha = self.alpha * alpha;
        if alpha <= 0.0 {
            return;
        }
        self.anatomy.draw(draw, &self.pose(), &self.palette, alpha);
    }
}
