/* ------------------------------------------------------------------ */
/* AdaGrad parameter update                                           */
/* ------------------------------------------------------------------ */

use crate::config::ADAGRAD_EPS;
use crate::model::{Gradients, RnnModel};

// AdaGrad step: per-parameter adaptive step size. The accumulator only
// grows, so the effective learning rate shrinks per-element over the
// run — intentional, not a defect.
pub fn adagrad_step(params: &mut [f64], grads: &[f64], mem: &mut [f64], lr: f64) {
    for i in 0..params.len() {
        mem[i] += grads[i] * grads[i];
        params[i] -= lr * grads[i] / (mem[i] + ADAGRAD_EPS).sqrt();
    }
}

/// Apply one update to all five (parameter, gradient, accumulator) triples.
pub fn adagrad_update(model: &mut RnnModel, grads: &Gradients, lr: f64) {
    adagrad_step(&mut model.wxh, &grads.d_wxh, &mut model.m_wxh, lr);
    adagrad_step(&mut model.whh, &grads.d_whh, &mut model.m_whh, lr);
    adagrad_step(&mut model.why, &grads.d_why, &mut model.m_why, lr);
    adagrad_step(&mut model.bh, &grads.d_bh, &mut model.m_bh, lr);
    adagrad_step(&mut model.by, &grads.d_by, &mut model.m_by, lr);
}
