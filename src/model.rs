/* ------------------------------------------------------------------ */
/* Model structs: weights, AdaGrad memory, gradients, trace           */
/* ------------------------------------------------------------------ */

use crate::config::GRAD_CLIP;
use crate::ops::{all_finite, clamp_gradients};
use crate::rng::Rng;

/// The five trainable matrices of the recurrent model, flat row-major,
/// paired 1:1 with their AdaGrad squared-gradient accumulators.
///
/// Shapes: wxh is hidden×vocab, whh is hidden×hidden, why is
/// vocab×hidden, bh is hidden, by is vocab.
pub struct RnnModel {
    pub hidden_size: usize,
    pub vocab_size: usize,

    pub wxh: Vec<f64>,
    pub whh: Vec<f64>,
    pub why: Vec<f64>,
    pub bh: Vec<f64>,
    pub by: Vec<f64>,

    // AdaGrad accumulators — zero at init, monotonically non-decreasing
    pub m_wxh: Vec<f64>,
    pub m_whh: Vec<f64>,
    pub m_why: Vec<f64>,
    pub m_bh: Vec<f64>,
    pub m_by: Vec<f64>,
}

impl RnnModel {
    pub fn new(hidden_size: usize, vocab_size: usize, rng: &mut Rng) -> Self {
        // Small-magnitude init keeps tanh out of saturation at step 0;
        // biases start at zero.
        let mut small = |sz: usize| -> Vec<f64> {
            (0..sz).map(|_| rng.uniform_signed(0.01)).collect()
        };
        let zeros = |sz: usize| -> Vec<f64> { vec![0.0; sz] };

        Self {
            hidden_size,
            vocab_size,
            wxh: small(hidden_size * vocab_size),
            whh: small(hidden_size * hidden_size),
            why: small(vocab_size * hidden_size),
            bh: zeros(hidden_size),
            by: zeros(vocab_size),
            m_wxh: zeros(hidden_size * vocab_size),
            m_whh: zeros(hidden_size * hidden_size),
            m_why: zeros(vocab_size * hidden_size),
            m_bh: zeros(hidden_size),
            m_by: zeros(vocab_size),
        }
    }

    pub fn num_params(&self) -> usize {
        self.wxh.len() + self.whh.len() + self.why.len() + self.bh.len() + self.by.len()
    }

    pub fn zero_hidden(&self) -> Vec<f64> {
        vec![0.0; self.hidden_size]
    }
}

/// Shared gradient accumulators for one backward pass. All time steps
/// of a window accumulate into these buffers — one per parameter
/// matrix, never per-step copies.
pub struct Gradients {
    pub d_wxh: Vec<f64>,
    pub d_whh: Vec<f64>,
    pub d_why: Vec<f64>,
    pub d_bh: Vec<f64>,
    pub d_by: Vec<f64>,
}

impl Gradients {
    pub fn zeros(hidden_size: usize, vocab_size: usize) -> Self {
        Self {
            d_wxh: vec![0.0; hidden_size * vocab_size],
            d_whh: vec![0.0; hidden_size * hidden_size],
            d_why: vec![0.0; vocab_size * hidden_size],
            d_bh: vec![0.0; hidden_size],
            d_by: vec![0.0; vocab_size],
        }
    }

    /// Clamp every element of every buffer into [-GRAD_CLIP, GRAD_CLIP].
    pub fn clip(&mut self) {
        clamp_gradients(&mut self.d_wxh, GRAD_CLIP);
        clamp_gradients(&mut self.d_whh, GRAD_CLIP);
        clamp_gradients(&mut self.d_why, GRAD_CLIP);
        clamp_gradients(&mut self.d_bh, GRAD_CLIP);
        clamp_gradients(&mut self.d_by, GRAD_CLIP);
    }

    pub fn is_finite(&self) -> bool {
        all_finite(&self.d_wxh)
            && all_finite(&self.d_whh)
            && all_finite(&self.d_why)
            && all_finite(&self.d_bh)
            && all_finite(&self.d_by)
    }
}

/// Per-window activation trace recorded by the forward pass and
/// consumed by backward. Hidden states are a zero-based array of
/// length T+1: hs[0] is the carried-in state, hs[t+1] the state after
/// step t. Inputs are kept as indices — each stands for a one-hot
/// column of the vocabulary.
pub struct ForwardTrace {
    pub inputs: Vec<usize>,
    pub hs: Vec<Vec<f64>>,
    pub ps: Vec<Vec<f64>>,
}

impl ForwardTrace {
    /// Number of time steps in the window.
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Hidden state after the final step — carried into the next window.
    pub fn last_hidden(&self) -> &[f64] {
        &self.hs[self.hs.len() - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_shapes_and_magnitudes() {
        let mut rng = Rng::new(3);
        let model = RnnModel::new(16, 9, &mut rng);
        assert_eq!(model.wxh.len(), 16 * 9);
        assert_eq!(model.whh.len(), 16 * 16);
        assert_eq!(model.why.len(), 9 * 16);
        assert_eq!(model.num_params(), 16 * 9 + 16 * 16 + 9 * 16 + 16 + 9);
        assert!(model.wxh.iter().all(|&w| w.abs() <= 0.01));
        assert!(model.bh.iter().all(|&b| b == 0.0));
        assert!(model.by.iter().all(|&b| b == 0.0));
        assert!(model.m_wxh.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn clip_clamps_synthetic_gradients() {
        let mut grads = Gradients::zeros(2, 3);
        grads.d_wxh[0] = 40.0;
        grads.d_whh[3] = -40.0;
        grads.d_why[1] = 4.5;
        grads.clip();
        assert_eq!(grads.d_wxh[0], 5.0);
        assert_eq!(grads.d_whh[3], -5.0);
        assert_eq!(grads.d_why[1], 4.5);
    }

    #[test]
    fn finite_check_flags_nan() {
        let mut grads = Gradients::zeros(2, 2);
        assert!(grads.is_finite());
        grads.d_bh[1] = f64::NAN;
        assert!(!grads.is_finite());
    }
}
