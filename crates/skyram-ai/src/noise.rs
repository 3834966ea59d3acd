//! Seeded smooth value noise for the procedural chaos offset.
//!
//! Each controller draws its own pair of signals from its spawn seed, so
//! sibling units never fly the same wobble.

use rand::Rng;

/// 1D value noise in [-1, 1], smooth-stepped between integer lattice points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueNoise {
    seed: u64,
}

/// Independent lateral and vertical noise signals for one controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosNoise {
    lateral: ValueNoise,
    vertical: ValueNoise,
}

impl ValueNoise {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Sample at time `t`.
    pub fn sample(&self, t: f64) -> f64 {
        let i0 = t.floor();
        let f = t - i0;
        let smooth = f * f * (3.0 - 2.0 * f);
        let a = self.lattice(i0 as i64);
        let b = self.lattice(i0 as i64 + 1);
        a + (b - a) * smooth
    }

    fn lattice(&self, i: i64) -> f64 {
        let h = splitmix64(self.seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
        // Top 53 bits to [0, 1), then to [-1, 1).
        (h >> 11) as f64 / (1u64 << 53) as f64 * 2.0 - 1.0
    }
}

impl ChaosNoise {
    pub fn new(lateral_seed: u64, vertical_seed: u64) -> Self {
        Self {
            lateral: ValueNoise::new(lateral_seed),
            vertical: ValueNoise::new(vertical_seed),
        }
    }

    /// Draw both seeds from the controller's RNG.
    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        Self::new(rng.gen(), rng.gen())
    }

    /// (lateral, vertical) at time `t`.
    pub fn sample(&self, t: f64) -> (f64, f64) {
        (self.lateral.sample(t), self.vertical.sample(t))
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}
