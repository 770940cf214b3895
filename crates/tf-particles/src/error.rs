use thiserror::Error;

use tf_core::CoreError;

use crate::Lifecycle;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid simulation configuration: {0}")]
    InvalidConfiguration(String),

    #[error("cannot {op}: simulation is {state}")]
    InvalidState {
        op:    &'static str,
        state: Lifecycle,
    },
}

impl From<CoreError> for SimError {
    fn from(e: CoreError) -> Self {
        SimError::InvalidConfiguration(e.to_string())
    }
}

pub type SimResult<T> = Result<T, SimError>;
