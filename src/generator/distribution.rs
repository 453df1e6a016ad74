//! Statistical distributions: weighted, normal, Poisson and Zipf.

use super::weighted::WeightedGenerator;
use super::Generator;
use crate::context::GenerationContext;
use crate::error::{ConfigError, GenerationError};
use crate::value::Value;
use rand::Rng;
use std::f64::consts::PI;

/// Largest accepted Poisson mean; `e^-λ` underflows beyond roughly 745.
const MAX_POISSON_LAMBDA: f64 = 700.0;

/// Rejection-inversion Zipf sampler over `0..=imax` with
/// `P(k) ∝ (v + k)^-s` (Hörmann and Derflinger).
#[derive(Debug, Clone, Copy)]
pub struct ZipfSampler {
    imax: f64,
    v: f64,
    q: f64,
    s: f64,
    one_minus_q: f64,
    one_minus_q_inv: f64,
    hxm: f64,
    hx0_minus_hxm: f64,
}

impl ZipfSampler {
    /// Requires `s > 1` and `v >= 1`.
    pub fn new(s: f64, v: f64, imax: u64) -> Option<Self> {
        if !(s > 1.0) || !(v >= 1.0) {
            return None;
        }
        let mut z = Self {
            imax: imax as f64,
            v,
            q: s,
            s: 0.0,
            one_minus_q: 1.0 - s,
            one_minus_q_inv: 1.0 / (1.0 - s),
            hxm: 0.0,
            hx0_minus_hxm: 0.0,
        };
        z.hxm = z.h(z.imax + 0.5);
        z.hx0_minus_hxm = z.h(0.5) - (v.ln() * -z.q).exp() - z.hxm;
        z.s = 1.0 - z.hinv(z.h(1.5) - (-z.q * (z.v + 1.0).ln()).exp());
        Some(z)
    }

    fn h(&self, x: f64) -> f64 {
        (self.one_minus_q * (self.v + x).ln()).exp() * self.one_minus_q_inv
    }

    fn hinv(&self, x: f64) -> f64 {
        (self.one_minus_q_inv * (self.one_minus_q * x).ln()).exp() - self.v
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u64 {
        loop {
            let r: f64 = rng.random();
            let ur = self.hxm + r * self.hx0_minus_hxm;
            let x = self.hinv(ur);
            let k = (x + 0.5).floor();
            if k - x <= self.s {
                return k.clamp(0.0, self.imax) as u64;
            }
            if ur >= self.h(k + 0.5) - (-(k + self.v).ln() * self.q).exp() {
                return k.clamp(0.0, self.imax) as u64;
            }
        }
    }
}

/// A configured distribution
#[derive(Debug, Clone)]
pub enum Distribution {
    Weighted(WeightedGenerator),
    Normal {
        mean: f64,
        std_dev: f64,
        min: Option<f64>,
        max: Option<f64>,
        integer: bool,
    },
    Poisson {
        lambda: f64,
    },
    Zipf {
        min: i64,
        sampler: ZipfSampler,
    },
}

impl Distribution {
    pub fn normal(mean: f64, std_dev: f64) -> Result<Self, ConfigError> {
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(ConfigError::InvalidValue {
                generator: "normal",
                key: "std_dev",
                message: "must be a non-negative number".to_string(),
            });
        }
        Ok(Distribution::Normal {
            mean,
            std_dev,
            min: None,
            max: None,
            integer: false,
        })
    }

    /// Clamp bounds and integer rounding for a normal distribution;
    /// other distributions are returned unchanged.
    pub fn bounded(self, lo: Option<f64>, hi: Option<f64>, as_integer: bool) -> Self {
        match self {
            Distribution::Normal { mean, std_dev, .. } => Distribution::Normal {
                mean,
                std_dev,
                min: lo,
                max: hi,
                integer: as_integer,
            },
            other => other,
        }
    }

    pub fn poisson(lambda: f64) -> Result<Self, ConfigError> {
        if !(lambda > 0.0 && lambda <= MAX_POISSON_LAMBDA) {
            return Err(ConfigError::InvalidValue {
                generator: "poisson",
                key: "lambda",
                message: format!("must be in (0, {}]", MAX_POISSON_LAMBDA),
            });
        }
        Ok(Distribution::Poisson { lambda })
    }

    pub fn zipf(alpha: f64, min: i64, max: i64) -> Result<Self, ConfigError> {
        if min > max {
            return Err(ConfigError::InvalidValue {
                generator: "zipf",
                key: "max",
                message: format!("max ({}) is less than min ({})", max, min),
            });
        }
        let sampler = ZipfSampler::new(alpha, 1.0, max.abs_diff(min)).ok_or_else(|| {
            ConfigError::InvalidValue {
                generator: "zipf",
                key: "alpha",
                message: "must be greater than 1".to_string(),
            }
        })?;
        Ok(Distribution::Zipf { min, sampler })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Distribution::Weighted(_) => "weighted",
            Distribution::Normal { .. } => "normal",
            Distribution::Poisson { .. } => "poisson",
            Distribution::Zipf { .. } => "zipf",
        }
    }
}

/// Standard normal draw (Box-Muller)
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // 1 - [0, 1) keeps u1 away from zero
    let u1 = 1.0 - rng.random::<f64>();
    let u2: f64 = rng.random();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

/// Knuth's multiplication method
fn poisson<R: Rng + ?Sized>(rng: &mut R, lambda: f64) -> i64 {
    let limit = (-lambda).exp();
    let mut product = 1.0;
    let mut count = 0i64;
    loop {
        count += 1;
        product *= rng.random::<f64>();
        if product < limit {
            return count - 1;
        }
    }
}

#[derive(Debug, Clone)]
pub struct DistributionGenerator {
    distribution: Distribution,
}

impl DistributionGenerator {
    pub fn new(distribution: Distribution) -> Self {
        Self { distribution }
    }

    pub fn distribution(&self) -> &Distribution {
        &self.distribution
    }
}

impl Generator for DistributionGenerator {
    fn generate(&self, ctx: &mut GenerationContext) -> Result<Value, GenerationError> {
        let value = match &self.distribution {
            Distribution::Weighted(weighted) => return weighted.generate(ctx),
            Distribution::Normal {
                mean,
                std_dev,
                min,
                max,
                integer,
            } => {
                let mut x = mean + standard_normal(ctx.rng()) * std_dev;
                if let Some(min) = min {
                    x = x.max(*min);
                }
                if let Some(max) = max {
                    x = x.min(*max);
                }
                if *integer {
                    Value::Int(x.round() as i64)
                } else {
                    Value::Float((x * 100.0).round() / 100.0)
                }
            }
            Distribution::Poisson { lambda } => Value::Int(poisson(ctx.rng(), *lambda)),
            Distribution::Zipf { min, sampler } => {
                Value::Int(min.saturating_add_unsigned(sampler.sample(ctx.rng())))
            }
        };
        Ok(value)
    }

    fn name(&self) -> &str {
        self.distribution.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draws(dist: Distribution, n: usize) -> Vec<Value> {
        let gen = DistributionGenerator::new(dist);
        let mut ctx = GenerationContext::for_table(42, "stats");
        (0..n).map(|_| gen.generate(&mut ctx).unwrap()).collect()
    }

    fn as_f64(v: &Value) -> f64 {
        match v {
            Value::Int(n) => *n as f64,
            Value::Float(f) => *f,
            other => panic!("expected number, got {:?}", other),
        }
    }

    #[test]
    fn test_normal_mean_and_spread() {
        let values = draws(Distribution::normal(100.0, 15.0).unwrap(), 2000);
        let xs: Vec<f64> = values.iter().map(as_f64).collect();
        let mean = xs.iter().sum::<f64>() / xs.len() as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / xs.len() as f64;
        assert!((mean - 100.0).abs() < 2.0, "mean {}", mean);
        assert!((var.sqrt() - 15.0).abs() < 2.0, "std dev {}", var.sqrt());
    }

    #[test]
    fn test_normal_clamped_and_integer() {
        let dist = Distribution::Normal {
            mean: 0.0,
            std_dev: 50.0,
            min: Some(-10.0),
            max: Some(10.0),
            integer: true,
        };
        for v in draws(dist, 500) {
            let n = v.as_i64().expect("integer draw");
            assert!((-10..=10).contains(&n));
        }
    }

    #[test]
    fn test_normal_float_rounded_to_cents() {
        for v in draws(Distribution::normal(50.0, 5.0).unwrap(), 100) {
            let x = as_f64(&v);
            assert!(((x * 100.0).round() - x * 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_poisson_mean() {
        let values = draws(Distribution::poisson(4.0).unwrap(), 2000);
        let mean = values.iter().map(as_f64).sum::<f64>() / values.len() as f64;
        assert!((mean - 4.0).abs() < 0.3, "mean {}", mean);
        assert!(values.iter().all(|v| v.as_i64().unwrap() >= 0));
    }

    #[test]
    fn test_poisson_rejects_bad_lambda() {
        assert!(Distribution::poisson(0.0).is_err());
        assert!(Distribution::poisson(-1.0).is_err());
        assert!(Distribution::poisson(1000.0).is_err());
    }

    #[test]
    fn test_zipf_range_and_skew() {
        let values = draws(Distribution::zipf(2.0, 1, 100).unwrap(), 2000);
        let ns: Vec<i64> = values.iter().map(|v| v.as_i64().unwrap()).collect();
        assert!(ns.iter().all(|n| (1..=100).contains(n)));
        let ones = ns.iter().filter(|&&n| n == 1).count();
        let fifties = ns.iter().filter(|&&n| n == 50).count();
        assert!(ones > 800, "ones {}", ones);
        assert!(ones > fifties * 10);
    }

    #[test]
    fn test_zipf_rejects_flat_alpha() {
        assert!(Distribution::zipf(1.0, 1, 10).is_err());
        assert!(Distribution::zipf(2.0, 10, 1).is_err());
    }

    #[test]
    fn test_zipf_single_value() {
        for v in draws(Distribution::zipf(1.5, 5, 5).unwrap(), 20) {
            assert_eq!(v, Value::Int(5));
        }
    }
}
