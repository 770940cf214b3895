use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("layer is not ready: {0}")]
    NotReady(&'static str),

    #[error("invalid fill style {0:?}")]
    InvalidStyle(String),

    #[error("surface error: {0}")]
    Surface(String),
}

pub type RenderResult<T> = Result<T, RenderError>;
