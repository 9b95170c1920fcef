/* ------------------------------------------------------------------ */
/* Math primitives: linear layers, softmax, loss, clipping            */
/* ------------------------------------------------------------------ */

// Linear forward: out[nout] = W[nout×nin] · x[nin]
pub fn linear_fwd(x: &[f64], w: &[f64], nout: usize, nin: usize, out: &mut [f64]) {
    for r in 0..nout {
        // zip-based dot product — LLVM can auto-vectorize with SIMD
        out[r] = w[r * nin..(r + 1) * nin]
            .iter()
            .zip(x.iter())
            .map(|(wi, xi)| wi * xi)
            .sum();
    }
}

// Linear backward:
//   d_w[r,c] += d_out[r] * x[c]
//   d_x[c]    = sum_r d_out[r] * w[r,c]   (d_x is overwritten, d_w accumulates)
pub fn linear_bwd(
    d_out: &[f64],
    x: &[f64],
    w: &[f64],
    nout: usize,
    nin: usize,
    d_x: &mut [f64],
    d_w: &mut [f64],
) {
    d_x[..nin].fill(0.0);
    for r in 0..nout {
        for c in 0..nin {
            d_w[r * nin + c] += d_out[r] * x[c];
            d_x[c] += d_out[r] * w[r * nin + c];
        }
    }
}

// Numerically stable softmax: subtract the max logit before
// exponentiating so large logits cannot overflow the exponential.
pub fn softmax(logits: &[f64], probs: &mut [f64]) {
    let n = logits.len();
    let mx = logits.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for i in 0..n {
        probs[i] = (logits[i] - mx).exp();
        sum += probs[i];
    }
    let inv = 1.0 / sum;
    for p in probs[..n].iter_mut() {
        *p *= inv;
    }
}

// Negative log probability of the true next character. Deliberately
// unclamped: a zero or NaN probability must surface as a non-finite
// loss so the instability check can catch it.
pub fn cross_entropy(probs: &[f64], target: usize) -> f64 {
    -probs[target].ln()
}

// Elementwise gradient clamp to [-bound, bound]. Applied uniformly and
// unconditionally after backward — exploding-gradient mitigation.
pub fn clamp_gradients(grads: &mut [f64], bound: f64) {
    for g in grads.iter_mut() {
        *g = g.clamp(-bound, bound);
    }
}

pub fn all_finite(xs: &[f64]) -> bool {
    xs.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one_and_is_non_negative() {
        let logits = vec![0.3, -1.2, 2.5, 0.0, -0.7];
        let mut probs = vec![0.0; logits.len()];
        softmax(&logits, &mut probs);
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6, "sum = {sum}");
        assert!(probs.iter().all(|&p| p >= 0.0));
    }

    #[test]
    fn softmax_survives_large_logits() {
        // exp(1000) overflows f64; max subtraction must prevent that
        let logits = vec![1000.0, 999.0, 0.0];
        let mut probs = vec![0.0; 3];
        softmax(&logits, &mut probs);
        assert!(all_finite(&probs));
        let sum: f64 = probs.iter().sum();
        assert!((sum - 1.0).abs() < 1e-6);
        assert!(probs[0] > probs[1] && probs[1] > probs[2]);
    }

    #[test]
    fn linear_fwd_matches_manual_dot() {
        // W = [[1, 2], [3, 4], [5, 6]], x = [10, 100]
        let w = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let x = vec![10.0, 100.0];
        let mut out = vec![0.0; 3];
        linear_fwd(&x, &w, 3, 2, &mut out);
        assert_eq!(out, vec![210.0, 430.0, 650.0]);
    }

    #[test]
    fn linear_bwd_accumulates_weight_grads_and_overwrites_input_grads() {
        let w = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0, 6.0];
        let d_out = vec![1.0, -1.0];
        let mut d_x = vec![99.0, 99.0];
        let mut d_w = vec![1.0; 4];
        linear_bwd(&d_out, &x, &w, 2, 2, &mut d_x, &mut d_w);
        // d_x = W^T · d_out = [1-3, 2-4]
        assert_eq!(d_x, vec![-2.0, -2.0]);
        // d_w += d_out ⊗ x on top of the existing ones
        assert_eq!(d_w, vec![6.0, 7.0, -4.0, -5.0]);
    }

    #[test]
    fn clamp_bounds_outliers_and_preserves_in_range_values() {
        let mut grads = vec![-12.0, -5.0, -4.9, 0.0, 3.2, 5.0, 17.5];
        clamp_gradients(&mut grads, 5.0);
        assert_eq!(grads, vec![-5.0, -5.0, -4.9, 0.0, 3.2, 5.0, 5.0]);
        assert!(grads.iter().all(|&g| (-5.0..=5.0).contains(&g)));
    }

    #[test]
    fn cross_entropy_is_positive_for_imperfect_predictions() {
        let probs = vec![0.25, 0.25, 0.5];
        assert!((cross_entropy(&probs, 2) - 0.5f64.recip().ln()).abs() < 1e-12);
        assert!(cross_entropy(&probs, 0) > cross_entropy(&probs, 2));
    }
}
