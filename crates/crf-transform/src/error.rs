use crf_model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error("join key '{column}' not found in {side} table")]
    MissingJoinKey { column: String, side: &'static str },
    #[error("union requires at least one frame")]
    EmptyUnion,
    #[error("failed to load table '{name}'")]
    Load {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

pub type Result<T> = std::result::Result<T, TransformError>;
