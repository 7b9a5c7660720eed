//! Simple random number generator for reproducibility.
//!
//! This module provides a lightweight xorshift-based PRNG so that weight
//! initialization and synthetic data are reproducible from a seed.

/// Xorshift RNG with uniform and Gaussian sampling.
#[derive(Debug, Clone)]
pub struct SimpleRng {
    state: u64,
    spare_gaussian: Option<f64>,
}

impl SimpleRng {
    /// Create a new RNG from a seed.
    ///
    /// The seed goes through one splitmix64 step first, so small seeds do
    /// not start xorshift in a low-entropy state.
    pub fn new(seed: u64) -> Self {
        let state = match splitmix64(seed) {
            0 => 0x9e3779b97f4a7c15,
            mixed => mixed,
        };
        Self {
            state,
            spare_gaussian: None,
        }
    }

    /// Basic xorshift to generate u32.
    pub fn next_u32(&mut self) -> u32 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        (x >> 32) as u32
    }

    /// Uniform sample in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / (u32::MAX as f64 + 1.0)
    }

    /// Uniform sample in [low, high).
    pub fn gen_range_f64(&mut self, low: f64, high: f64) -> f64 {
        low + (high - low) * self.next_f64()
    }

    /// Standard normal sample via the Box-Muller transform.
    ///
    /// Each transform yields two independent samples; the second one is kept
    /// for the next call.
    pub fn next_gaussian(&mut self) -> f64 {
        if let Some(z) = self.spare_gaussian.take() {
            return z;
        }
        // 1 - u lies in (0, 1], keeping ln finite.
        let u1 = 1.0 - self.next_f64();
        let u2 = self.next_f64();
        let radius = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f64::consts::PI * u2;
        self.spare_gaussian = Some(radius * theta.sin());
        radius * theta.cos()
    }

    /// Integer sample in [0, upper).
    pub fn gen_usize(&mut self, upper: usize) -> usize {
        if upper == 0 {
            0
        } else {
            (self.next_u32() as usize) % upper
        }
    }
}

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e3779b97f4a7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111eb);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rng_deterministic() {
        let mut rng1 = SimpleRng::new(42);
        let mut rng2 = SimpleRng::new(42);

        for _ in 0..100 {
            assert_eq!(rng1.next_u32(), rng2.next_u32());
            assert_eq!(rng1.next_gaussian(), rng2.next_gaussian());
        }
    }

    #[test]
    fn test_rng_next_f64_range() {
        let mut rng = SimpleRng::new(12345);

        for _ in 0..1000 {
            let val = rng.next_f64();
            assert!((0.0..1.0).contains(&val));
        }
    }

    #[test]
    fn test_gaussian_moments() {
        let mut rng = SimpleRng::new(2024);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| rng.next_gaussian()).collect();

        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 0.05, "mean {} too far from 0", mean);
        assert!((var - 1.0).abs() < 0.05, "variance {} too far from 1", var);
        assert!(samples.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_rng_gen_usize_zero() {
        let mut rng = SimpleRng::new(22222);
        assert_eq!(rng.gen_usize(0), 0);
    }

    #[test]
    fn test_first_gaussian_not_degenerate_for_small_seeds() {
        let firsts: Vec<f64> = (1..=1000u64)
            .map(|seed| SimpleRng::new(seed).next_gaussian())
            .collect();

        let near_zero = firsts.iter().filter(|z| z.abs() < 1e-3).count();
        assert!(near_zero < 10, "{} first samples near zero", near_zero);

        // E|z| = sqrt(2 / pi) for a standard normal.
        let mean_abs = firsts.iter().map(|z| z.abs()).sum::<f64>() / firsts.len() as f64;
        assert!((mean_abs - 0.798).abs() < 0.1, "mean |z| {}", mean_abs);
    }

    #[test]
    fn test_nearby_seeds_diverge() {
        let a = SimpleRng::new(1).next_u32();
        let b = SimpleRng::new(2).next_u32();
        assert_ne!(a, b);
        assert!(a > 1 << 16 || b > 1 << 16);
    }
}
