/* ------------------------------------------------------------------ */
/* Error taxonomy                                                     */
/* ------------------------------------------------------------------ */

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// Bad hyperparameters or a corpus too small to train on.
    /// Fatal at startup; retrying with the same inputs cannot succeed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// NaN or infinity detected in probabilities, losses, or gradients.
    /// Fatal for the run — parameters must not be updated past this point.
    #[error("numeric instability: {0}")]
    NumericInstability(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn instability(msg: impl Into<String>) -> Self {
        Self::NumericInstability(msg.into())
    }
}
