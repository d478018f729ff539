//! Seeded coherent noise with fractal octaves and range remapping.
//!
//! Organisms use one field for wander-angle drift and blobs use others for
//! outline wiggle and speck drift.

use noise::{NoiseFn, Simplex};

/// Construction parameters. `seed: None` draws one from the caller's RNG.
#[derive(Debug, Clone, Copy)]
pub struct NoiseOptions {
    pub seed: Option<u32>,
    pub min: f64,
    pub max: f64,
    pub scale: f64,
    pub power: f64,
    pub octaves: u32,
    pub gain: f64,
    pub lacunarity: f64,
}

impl Default for NoiseOptions {
    fn default() -> Self {
        Self {
            seed: None,
            min: -1.0,
            max: 1.0,
            scale: 1.0,
            power: 1.0,
            octaves: 0,
            gain: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl NoiseOptions {
    pub fn ranged(min: f64, max: f64, scale: f64) -> Self {
        Self {
            min,
            max,
            scale,
            ..Self::default()
        }
    }
}

pub struct NoiseField {
    seed: u32,
    source: Simplex,
    min: f64,
    max: f64,
    scale: f64,
    power: f64,
    gain: f64,
    lacunarity: f64,
    layers: Vec<NoiseField>,
}

impl std::fmt::Debug for NoiseField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseField")
            .field("seed", &self.seed)
            .field("range", &(self.min, self.max))
            .field("scale", &self.scale)
            .field("octaves", &self.layers.len())
            .finish()
    }
}

impl NoiseField {
    pub fn new(opts: NoiseOptions, rng: &mut fastrand::Rng) -> Self {
        let seed = opts.seed.unwrap_or_else(|| rng.u32(..));
        Self::seeded(seed, opts)
    }

    /// Build a field from an explicit seed. Octave layers derive their seeds
    /// from the parent seed, so the whole stack is reproducible.
    pub fn seeded(seed: u32, opts: NoiseOptions) -> Self {
        let mut seeds = fastrand::Rng::with_seed(seed as u64);
        let layers = (0..opts.octaves)
            .map(|_| Self::seeded(seeds.u32(..), NoiseOptions::default()))
            .collect();

        Self {
            seed,
            source: Simplex::new(seed),
            min: opts.min,
            max: opts.max,
            scale: opts.scale,
            power: opts.power,
            gain: opts.gain,
            lacunarity: opts.lacunarity,
            layers,
        }
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// 2D sample remapped into `[min, max]`.
    pub fn get2(&self, x: f64, y: f64) -> f64 {
        self.sample(x, y, None)
    }

    /// 3D sample remapped into `[min, max]`. Organisms pass their timer as `z`.
    pub fn get3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.sample(x, y, Some(z))
    }

    fn sample(&self, x: f64, y: f64, z: Option<f64>) -> f64 {
        let mut n = if self.layers.is_empty() {
            self.raw(x * self.scale, y * self.scale, z.map(|z| z * self.scale))
        } else {
            let mut sum = 0.0;
            let mut amp = 1.0;
            let mut freq = self.scale;
            let mut total_amp = 0.0;
            for layer in &self.layers {
                sum += layer.raw(x * freq, y * freq, z.map(|z| z * freq)) * amp;
                total_amp += amp;
                amp *= self.gain;
                freq *= self.lacunarity;
            }
            if total_amp > 0.0 {
                sum / total_amp
            } else {
                0.0
            }
        };

        if self.power != 1.0 {
            n = (((n + 1.0) * 0.5).powf(self.power) - 0.5) * 2.0;
        }

        let t = ((n + 1.0) * 0.5).clamp(0.0, 1.0);
        t * (self.max - self.min) + self.min
    }

    /// Unscaled backend sample clamped to `[-1, 1]`.
    fn raw(&self, x: f64, y: f64, z: Option<f64>) -> f64 {
        let v = match z {
            Some(z) => NoiseFn::<f64, 3>::get(&self.source, [x, y, z]),
            None => NoiseFn::<f64, 2>::get(&self.source, [x, y]),
        };
        if v.is_finite() {
            v.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}
