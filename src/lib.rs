//! Character-level recurrent language model trained by explicit
//! backpropagation-through-time — no autodiff, every gradient is
//! derived and accumulated by hand.
//!
//! The pieces compose leaf-first: [`data::CorpusReader`] streams cyclic
//! training windows over the corpus, [`forward::forward`] unrolls the
//! recurrence and records an activation trace, [`train::backward`] walks
//! the trace in reverse to produce clipped gradients, and
//! [`optimizer::adagrad_update`] folds them into the parameters.
//! [`train::train`] drives the whole loop.

pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod forward;
pub mod model;
pub mod ops;
pub mod optimizer;
pub mod rng;
pub mod train;
pub mod vocab;

pub use config::Config;
pub use data::CorpusReader;
pub use error::{Error, Result};
pub use model::{ForwardTrace, Gradients, RnnModel};
pub use rng::Rng;
pub use train::{sample, train, TrainState};
pub use vocab::Vocab;
