/* ------------------------------------------------------------------ */
/* Hyperparameters and fixed numeric constants                        */
/* ------------------------------------------------------------------ */

use crate::error::{Error, Result};

// Elementwise gradient clamp bound — every gradient entry is forced
// into [-GRAD_CLIP, GRAD_CLIP] before the optimizer sees it.
pub const GRAD_CLIP: f64 = 5.0;

// AdaGrad denominator guard: param -= lr * g / sqrt(mem + ADAGRAD_EPS)
pub const ADAGRAD_EPS: f64 = 1e-8;

// Smoothed-loss EMA: smooth = smooth * SMOOTHING + loss * (1 - SMOOTHING)
pub const SMOOTHING: f64 = 0.999;

// Sampling refuses probability vectors whose mass strays further than
// this from 1 — a downstream symptom of numeric instability.
pub const PROB_SUM_TOL: f64 = 1e-6;

/// Runtime hyperparameters. Everything the training run needs beyond
/// the corpus itself; validated once at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub hidden_size: usize,
    pub seq_length: usize,
    pub learning_rate: f64,
    /// Stopping bound for the otherwise unbounded training loop.
    pub max_iters: usize,
    /// Emit a generated preview every this many iterations.
    pub sample_interval: usize,
    /// Characters per generated preview.
    pub sample_len: usize,
    pub seed: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hidden_size: 100,
            seq_length: 25,
            learning_rate: 1e-1,
            max_iters: 100_000,
            sample_interval: 500,
            sample_len: 200,
            seed: 1337,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.hidden_size == 0 {
            return Err(Error::config("hidden_size must be > 0"));
        }
        if self.seq_length == 0 {
            return Err(Error::config("seq_length must be > 0"));
        }
        if !(self.learning_rate > 0.0) {
            return Err(Error::config(format!(
                "learning_rate must be > 0, got {}",
                self.learning_rate
            )));
        }
        if self.sample_interval == 0 {
            return Err(Error::config("sample_interval must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn rejects_zero_hidden_size() {
        let cfg = Config { hidden_size: 0, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_zero_seq_length() {
        let cfg = Config { seq_length: 0, ..Config::default() };
        assert!(matches!(cfg.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn rejects_non_positive_learning_rate() {
        let cfg = Config { learning_rate: 0.0, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { learning_rate: -0.1, ..Config::default() };
        assert!(cfg.validate().is_err());
        let cfg = Config { learning_rate: f64::NAN, ..Config::default() };
        assert!(cfg.validate().is_err());
    }
}
