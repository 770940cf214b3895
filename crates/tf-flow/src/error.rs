use thiserror::Error;

use tf_core::{CoreError, Zoom};
use tf_particles::SimError;
use tf_render::RenderError;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("no clusters recorded at zoom {0}")]
    NoClusters(Zoom),

    #[error("clusters at zoom {0} carry zero total bandwidth")]
    ZeroBandwidth(Zoom),

    #[error("zoom {zoom} is outside the index range {min}..={max}")]
    ZoomOutOfRange { zoom: Zoom, min: Zoom, max: Zoom },

    #[error("configuration error: {0}")]
    Core(#[from] CoreError),

    #[error("simulation error: {0}")]
    Simulation(#[from] SimError),

    #[error("render error: {0}")]
    Render(#[from] RenderError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FlowResult<T> = Result<T, FlowError>;
