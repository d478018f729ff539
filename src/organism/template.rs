//! Declarative organism blueprints: one per ecosystem level, plus the player's
//! evolution stages.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::draw::Color;

/// Body speed in body-lengths per second.
pub const DEFAULT_SPEED: f64 = 2.0;
/// Chase radius as a multiple of body size.
pub const DEFAULT_HUNTING_RANGE: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Hue {
    Fixed(f64),
    /// Uniformly drawn per organism.
    Between(f64, f64),
}

impl Hue {
    pub fn pick(self, rng: &mut fastrand::Rng) -> f64 {
        match self {
            Hue::Fixed(h) => h,
            Hue::Between(lo, hi) => lo + rng.f64() * (hi - lo),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Fixed(Color),
    /// Lightness/chroma at the organism's hue.
    Oklch { lightness: f64, chroma: f64 },
}

impl Paint {
    pub fn resolve(self, hue: f64) -> Color {
        match self {
            Paint::Fixed(c) => c,
            Paint::Oklch { lightness, chroma } => Color::from_oklch(lightness, chroma, hue),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Look {
    pub hue: Hue,
    pub fill: Paint,
    pub stroke: Paint,
    pub stroke_width: f64,
    pub fill_alpha: f64,
}

impl Default for Look {
    fn default() -> Self {
        Self {
            hue: Hue::Fixed(0.0),
            fill: Paint::Oklch {
                lightness: 0.1,
                chroma: 0.1,
            },
            stroke: Paint::Oklch {
                lightness: 0.7,
                chroma: 0.3,
            },
            stroke_width: 2.0,
            fill_alpha: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlobSpec {
    /// Decorative specks kept inside the membrane.
    pub specks: usize,
    pub wiggle: bool,
    /// Outline polygon resolution.
    pub segments: usize,
}

impl Default for BlobSpec {
    fn default() -> Self {
        Self {
            specks: 0,
            wiggle: true,
            segments: 120,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WormSpec {
    pub joints: usize,
    pub eyes: bool,
}

impl Default for WormSpec {
    fn default() -> Self {
        Self {
            joints: 3,
            eyes: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FishSpec {
    /// Larger values shorten the spine links.
    pub thickness: f64,
    pub back_fins: bool,
    pub pupils: bool,
    pub spots: bool,
    pub horizontal_stripes: bool,
    pub vertical_stripes: bool,
    pub eye_angle: f64,
    pub eye_size: f64,
    /// Head bulge as a multiple of half the body size.
    pub round_head: f64,
    /// Tail bulge as a multiple of the body size.
    pub round_tail: f64,
    pub fin_scale: f64,
    pub caudal_fin: bool,
}

impl Default for FishSpec {
    fn default() -> Self {
        Self {
            thickness: 1.0,
            back_fins: false,
            pupils: true,
            spots: false,
            horizontal_stripes: false,
            vertical_stripes: false,
            eye_angle: FRAC_PI_2,
            eye_size: 0.4,
            round_head: 1.0,
            round_tail: 0.0,
            fin_scale: 0.5,
            caudal_fin: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnatomySpec {
    Blob(BlobSpec),
    Worm(WormSpec),
    Fish(FishSpec),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrganismTemplate {
    pub look: Look,
    pub anatomy: AnatomySpec,
    pub speed: f64,
    pub hunting_range: f64,
}

impl OrganismTemplate {
    pub fn new(look: Look, anatomy: AnatomySpec) -> Self {
        Self {
            look,
            anatomy,
            speed: DEFAULT_SPEED,
            hunting_range: DEFAULT_HUNTING_RANGE,
        }
    }
}

fn oklch(lightness: f64, chroma: f64) -> Paint {
    Paint::Oklch { lightness, chroma }
}

fn swimmer_look(lo: f64, hi: f64, stroke_width: f64) -> Look {
    Look {
        hue: Hue::Between(lo, hi),
        fill: oklch(0.3, 0.1),
        stroke: oklch(0.7, 0.3),
        stroke_width,
        fill_alpha: 0.8,
    }
}

/// Blueprint for autonomous organisms living at ecosystem level `index`.
/// Levels without a blueprint are never populated.
pub fn ecosystem_template(index: u32) -> Option<OrganismTemplate> {
    let blob = |look: Look, spec: BlobSpec| OrganismTemplate::new(look, AnatomySpec::Blob(spec));
    let template = match index {
        0 => blob(
            Look {
                fill: Paint::Fixed(Color(0x999999)),
                stroke: Paint::Fixed(Color::BLACK),
                stroke_width: 0.0,
                ..Look::default()
            },
            BlobSpec {
                wiggle: false,
                ..BlobSpec::default()
            },
        ),
        1 => blob(
            Look {
                fill: Paint::Fixed(Color::BLACK),
                stroke: Paint::Fixed(Color(0xBBBBBB)),
                stroke_width: 0.2,
                ..Look::default()
            },
            BlobSpec::default(),
        ),
        2 => blob(
            Look {
                hue: Hue::Between(50.0, 100.0),
                stroke_width: 0.4,
                ..Look::default()
            },
            BlobSpec::default(),
        ),
        3 => blob(
            Look {
                hue: Hue::Between(150.0, 200.0),
                fill: oklch(0.1, 0.1),
                stroke: oklch(0.5, 0.1),
                stroke_width: 0.8,
                ..Look::default()
            },
            BlobSpec {
                specks: 10,
                ..BlobSpec::default()
            },
        ),
        4 => OrganismTemplate::new(
            swimmer_look(100.0, 150.0, 1.6),
            AnatomySpec::Worm(WormSpec::default()),
        ),
        5 => OrganismTemplate::new(
            swimmer_look(200.0, 250.0, 3.2),
            AnatomySpec::Worm(WormSpec {
                joints: 6,
                eyes: true,
            }),
        ),
        6 => OrganismTemplate::new(
            swimmer_look(150.0, 200.0, 6.4),
            AnatomySpec::Worm(WormSpec {
                joints: 9,
                eyes: true,
            }),
        ),
        7 => OrganismTemplate::new(
            Look {
                hue: Hue::Between(0.0, 50.0),
                stroke_width: 12.8,
                ..Look::default()
            },
            AnatomySpec::Fish(FishSpec::default()),
        ),
        8 => OrganismTemplate::new(
            Look {
                hue: Hue::Between(200.0, 250.0),
                stroke_width: 25.6,
                ..Look::default()
            },
            AnatomySpec::Fish(FishSpec {
                thickness: 1.8,
                back_fins: true,
                spots: true,
                ..FishSpec::default()
            }),
        ),
        9 => OrganismTemplate::new(
            Look {
                hue: Hue::Between(0.0, 50.0),
                stroke_width: 51.2,
                ..Look::default()
            },
            AnatomySpec::Fish(FishSpec {
                thickness: 2.8,
                back_fins: true,
                vertical_stripes: true,
                eye_angle: FRAC_PI_4,
                ..FishSpec::default()
            }),
        ),
        _ => return None,
    };
    Some(template)
}
