// Poisson Click Generator: seedable user behaviour for workload scenarios
// Models a visitor pressing "Send Request" and "Purge" at random moments

use rand::Rng;
use rand_chacha::ChaCha8Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Submit,
    Purge,
}

pub struct TrafficGenerator {
    rng: ChaCha8Rng,
    pub clicks: u32,
    pub purges: u32,
}

impl TrafficGenerator {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng, clicks: 0, purges: 0 }
    }

    /// Actions the visitor takes during one `step_ms` slice, in the order
    /// they happen. Rates are per simulated second.
    pub fn generate_step(&mut self, step_ms: u64, clicks_per_sec: f64, purges_per_sec: f64) -> Vec<UserAction> {
        let scale = step_ms as f64 / 1000.0;
        let n_clicks = poisson_sample(&mut self.rng, clicks_per_sec * scale);
        let n_purges = poisson_sample(&mut self.rng, purges_per_sec * scale);

        let mut actions = Vec::with_capacity((n_clicks + n_purges) as usize);
        actions.extend(std::iter::repeat(UserAction::Submit).take(n_clicks as usize));
        actions.extend(std::iter::repeat(UserAction::Purge).take(n_purges as usize));

        // Fisher–Yates so purges can land before or after clicks
        for i in (1..actions.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            actions.swap(i, j);
        }

        self.clicks += n_clicks;
        self.purges += n_purges;
        actions
    }
}

/// Poisson sampling via Knuth algorithm (λ is small for per-step rates).
fn poisson_sample(rng: &mut ChaCha8Rng, lambda: f64) -> u32 {
    if lambda <= 0.0 {
        return 0;
    }
    let l = (-lambda).exp();
    let mut k: u32 = 0;
    let mut p: f64 = 1.0;
    loop {
        k += 1;
        p *= rng.gen::<f64>();
        if p <= l {
            return k - 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_poisson_mean() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let lambda = 2.0;
        let n = 10000;
        let sum: u64 = (0..n).map(|_| poisson_sample(&mut rng, lambda) as u64).sum();
        let mean = sum as f64 / n as f64;
        assert!((mean - lambda).abs() < 0.1, "Poisson mean {} far from λ={}", mean, lambda);
    }

    #[test]
    fn test_zero_rate_is_silent() {
        let mut traffic = TrafficGenerator::new(ChaCha8Rng::seed_from_u64(7));
        for _ in 0..100 {
            assert!(traffic.generate_step(100, 0.0, 0.0).is_empty());
        }
        assert_eq!(traffic.clicks, 0);
    }

    #[test]
    fn test_same_seed_same_actions() {
        let mut a = TrafficGenerator::new(ChaCha8Rng::seed_from_u64(3));
        let mut b = TrafficGenerator::new(ChaCha8Rng::seed_from_u64(3));
        for _ in 0..50 {
            assert_eq!(a.generate_step(100, 1.5, 0.4), b.generate_step(100, 1.5, 0.4));
        }
    }
}
