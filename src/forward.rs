/* ------------------------------------------------------------------ */
/* Forward propagation: recurrent unroll over one window              */
/* ------------------------------------------------------------------ */

use crate::model::{ForwardTrace, RnnModel};
use crate::ops::{linear_fwd, softmax};

/// One recurrent step shared by training forward and sampling:
///
///   h = tanh(Wxh·onehot(input) + Whh·h_prev + bh)
///   p = softmax(Why·h + by)
///
/// Writes the new hidden state into `h_out` and the distribution over
/// the next character into `probs`.
pub fn rnn_step(
    model: &RnnModel,
    input: usize,
    h_prev: &[f64],
    h_out: &mut [f64],
    probs: &mut [f64],
) {
    let hs = model.hidden_size;
    let vs = model.vocab_size;

    // Wxh·onehot(input) selects column `input`; no dense matvec needed.
    for i in 0..hs {
        let recur: f64 = model.whh[i * hs..(i + 1) * hs]
            .iter()
            .zip(h_prev.iter())
            .map(|(w, h)| w * h)
            .sum();
        h_out[i] = (model.wxh[i * vs + input] + recur + model.bh[i]).tanh();
    }

    let mut logits = vec![0.0; vs];
    linear_fwd(h_out, &model.why, vs, hs, &mut logits);
    for (l, b) in logits.iter_mut().zip(model.by.iter()) {
        *l += b;
    }
    softmax(&logits, probs);
}

/// Unroll the recurrence over a full window. Pure computation: no
/// parameter mutation, no randomness. The returned trace holds
/// everything backward needs — input indices, T+1 hidden states
/// (slot 0 is `prev_hidden`), and T probability vectors.
pub fn forward(model: &RnnModel, inputs: &[usize], prev_hidden: &[f64]) -> ForwardTrace {
    let t_len = inputs.len();
    let mut hs = Vec::with_capacity(t_len + 1);
    let mut ps = Vec::with_capacity(t_len);
    hs.push(prev_hidden.to_vec());

    for (t, &input) in inputs.iter().enumerate() {
        let mut h = vec![0.0; model.hidden_size];
        let mut p = vec![0.0; model.vocab_size];
        rnn_step(model, input, &hs[t], &mut h, &mut p);
        hs.push(h);
        ps.push(p);
    }

    ForwardTrace { inputs: inputs.to_vec(), hs, ps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::Rng;

    fn tiny_model() -> RnnModel {
        let mut rng = Rng::new(99);
        RnnModel::new(6, 4, &mut rng)
    }

    #[test]
    fn trace_has_expected_shape() {
        let model = tiny_model();
        let inputs = vec![0, 2, 3, 1, 1];
        let trace = forward(&model, &inputs, &model.zero_hidden());
        assert_eq!(trace.len(), 5);
        assert_eq!(trace.hs.len(), 6);
        assert_eq!(trace.ps.len(), 5);
        assert_eq!(trace.hs[0], model.zero_hidden());
        assert_eq!(trace.last_hidden().len(), 6);
    }

    #[test]
    fn probabilities_are_valid_distributions() {
        let model = tiny_model();
        let trace = forward(&model, &[1, 0, 3], &model.zero_hidden());
        for p in &trace.ps {
            let sum: f64 = p.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6);
            assert!(p.iter().all(|&v| v >= 0.0));
        }
    }

    #[test]
    fn hidden_states_stay_in_tanh_range() {
        let model = tiny_model();
        let trace = forward(&model, &[0, 1, 2, 3], &model.zero_hidden());
        for h in &trace.hs[1..] {
            assert!(h.iter().all(|&v| (-1.0..=1.0).contains(&v)));
        }
    }

    #[test]
    fn carried_hidden_state_changes_the_outcome() {
        let model = tiny_model();
        let zero = forward(&model, &[2, 2], &model.zero_hidden());
        let carried = forward(&model, &[2, 2], &[0.5, -0.5, 0.25, 0.0, 0.1, -0.9]);
        assert_ne!(zero.ps[0], carried.ps[0]);
        // with an identical incoming state the computation is reproducible
        let again = forward(&model, &[2, 2], &model.zero_hidden());
        assert_eq!(zero.ps, again.ps);
    }
}
