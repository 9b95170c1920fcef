/* ------------------------------------------------------------------ */
/* BPTT backward pass, loss, sampling, and the training loop          */
/* ------------------------------------------------------------------ */

use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{Config, PROB_SUM_TOL, SMOOTHING};
use crate::data::CorpusReader;
use crate::error::{Error, Result};
use crate::forward::{forward, rnn_step};
use crate::model::{ForwardTrace, Gradients, RnnModel};
use crate::ops::{cross_entropy, linear_bwd};
use crate::optimizer::adagrad_update;
use crate::rng::Rng;
use crate::vocab::Vocab;

/* ------------------------------------------------------------------ */
/* Backward propagation through time                                  */
/* ------------------------------------------------------------------ */

/// Walk the activation trace in reverse time order and accumulate
/// gradients for all five parameter matrices into shared buffers.
/// Every returned element is clamped to the fixed clip interval.
pub fn backward(model: &RnnModel, trace: &ForwardTrace, targets: &[usize]) -> Gradients {
    let hn = model.hidden_size;
    let vn = model.vocab_size;
    let mut grads = Gradients::zeros(hn, vn);

    // Gradient flowing backward from the future time step.
    let mut dh_next = vec![0.0; hn];
    // Scratch buffers hoisted out of the per-step loop.
    let mut dh = vec![0.0; hn];
    let mut dh_raw = vec![0.0; hn];

    for t in (0..trace.len()).rev() {
        // Fused softmax-cross-entropy gradient w.r.t. the logits:
        // dy = p - onehot(target). The softmax and log derivatives
        // cancel into this closed form; nothing else to derive here.
        let mut dy = trace.ps[t].clone();
        dy[targets[t]] -= 1.0;

        let h_t = &trace.hs[t + 1];
        for i in 0..vn {
            grads.d_by[i] += dy[i];
        }
        // dWhy += dy ⊗ h_t, dh = Why^T · dy
        linear_bwd(&dy, h_t, &model.why, vn, hn, &mut dh, &mut grads.d_why);

        // Add the gradient arriving from the next time step, then push
        // through tanh: d/dz tanh(z) = 1 - tanh²(z).
        for i in 0..hn {
            dh_raw[i] = (1.0 - h_t[i] * h_t[i]) * (dh[i] + dh_next[i]);
        }

        for i in 0..hn {
            grads.d_bh[i] += dh_raw[i];
            // x_t is one-hot, so dWxh ⊗ x_t touches a single column
            grads.d_wxh[i * vn + trace.inputs[t]] += dh_raw[i];
        }
        // dWhh += dh_raw ⊗ h_{t-1}, dh_next = Whh^T · dh_raw
        let h_prev = &trace.hs[t];
        linear_bwd(&dh_raw, h_prev, &model.whh, hn, hn, &mut dh_next, &mut grads.d_whh);
    }

    grads.clip();
    grads
}

/* ------------------------------------------------------------------ */
/* Window loss                                                        */
/* ------------------------------------------------------------------ */

/// Sum of negative log probabilities the model assigned to the true
/// next characters. Reporting only — gradients come from backward(),
/// never from differentiating this value.
pub fn window_loss(trace: &ForwardTrace, targets: &[usize]) -> f64 {
    trace
        .ps
        .iter()
        .zip(targets.iter())
        .map(|(p, &t)| cross_entropy(p, t))
        .sum()
}

/* ------------------------------------------------------------------ */
/* Autoregressive sampling                                            */
/* ------------------------------------------------------------------ */

/// Generate `length` character indices starting from `seed_hidden` and
/// `seed_index`. Each step draws from the model's distribution
/// (weighted, never argmax) and feeds the drawn index back in.
/// Read-only on the model. Fails loudly if a distribution's mass has
/// drifted from 1 — renormalizing here would mask upstream instability.
pub fn sample(
    model: &RnnModel,
    seed_hidden: &[f64],
    seed_index: usize,
    length: usize,
    rng: &mut Rng,
) -> Result<Vec<usize>> {
    let mut h = seed_hidden.to_vec();
    let mut h_next = vec![0.0; model.hidden_size];
    let mut probs = vec![0.0; model.vocab_size];
    let mut out = Vec::with_capacity(length);
    let mut input = seed_index;

    for _ in 0..length {
        rnn_step(model, input, &h, &mut h_next, &mut probs);

        let mass: f64 = probs.iter().sum();
        if !mass.is_finite() || (mass - 1.0).abs() > PROB_SUM_TOL {
            return Err(Error::instability(format!(
                "sampling distribution sums to {mass}, expected 1"
            )));
        }

        // Cumulative walk through the distribution.
        let mut r = rng.uniform();
        let mut drawn = model.vocab_size - 1;
        for (idx, &p) in probs.iter().enumerate() {
            r -= p;
            if r <= 0.0 {
                drawn = idx;
                break;
            }
        }

        out.push(drawn);
        input = drawn;
        std::mem::swap(&mut h, &mut h_next);
    }

    Ok(out)
}

/* ------------------------------------------------------------------ */
/* Training orchestrator                                              */
/* ------------------------------------------------------------------ */

/// Mutable loop state, explicit rather than ambient so a run can be
/// inspected, tested, and resumed cleanly.
pub struct TrainState {
    pub iter: usize,
    pub smooth_loss: f64,
    pub hidden: Vec<f64>,
    pub best_loss: f64,
    pub best_iter: usize,
}

impl TrainState {
    pub fn new(hidden_size: usize, vocab_size: usize, seq_length: usize) -> Self {
        // EMA starts at the loss of a uniform random predictor.
        let uniform_loss = -(1.0 / vocab_size as f64).ln() * seq_length as f64;
        Self {
            iter: 0,
            smooth_loss: uniform_loss,
            hidden: vec![0.0; hidden_size],
            best_loss: uniform_loss,
            best_iter: 0,
        }
    }
}

/// Drive the training loop for up to `cfg.max_iters` windows:
/// fetch → forward → loss → backward → update → smooth → carry hidden.
/// The `stop` flag is polled at the top of each iteration — the safe
/// resumption point, before any state for the next window exists.
pub fn train(
    model: &mut RnnModel,
    reader: &mut CorpusReader,
    vocab: &Vocab,
    cfg: &Config,
    rng: &mut Rng,
    stop: &AtomicBool,
) -> Result<TrainState> {
    let mut state = TrainState::new(model.hidden_size, model.vocab_size, cfg.seq_length);

    while state.iter < cfg.max_iters {
        if stop.load(Ordering::Relaxed) {
            log::info!("interrupted at iteration {}", state.iter);
            break;
        }

        // A fresh pass over the corpus starts with no recurrent memory.
        if reader.at_cycle_start() {
            state.hidden = model.zero_hidden();
        }
        let (inputs, targets) = reader.next_window();

        let trace = forward(model, &inputs, &state.hidden);
        let loss = window_loss(&trace, &targets);
        if !loss.is_finite() {
            return Err(Error::instability(format!(
                "non-finite loss {loss} at iteration {}",
                state.iter
            )));
        }

        let grads = backward(model, &trace, &targets);
        if !grads.is_finite() {
            return Err(Error::instability(format!(
                "non-finite gradient at iteration {}",
                state.iter
            )));
        }

        adagrad_update(model, &grads, cfg.learning_rate);

        state.smooth_loss = state.smooth_loss * SMOOTHING + loss * (1.0 - SMOOTHING);
        state.hidden = trace.last_hidden().to_vec();
        if state.smooth_loss < state.best_loss {
            state.best_loss = state.smooth_loss;
            state.best_iter = state.iter;
        }

        if state.iter % cfg.sample_interval == 0 {
            let preview = sample(model, &state.hidden, inputs[0], cfg.sample_len, rng)?;
            println!("----\n{}\n----", vocab.decode(&preview));
            log::info!(
                "iter {:6} | smooth loss {:.4}",
                state.iter,
                state.smooth_loss
            );
        }

        state.iter += 1;
    }

    Ok(state)
}
