use rowforge_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodegenError {
    /// The output artifact could not be written; generation aborts.
    #[error("Unable to write artifact: {0}")]
    Io(#[from] std::io::Error),

    /// A schema-model error surfaced during synthesis
    #[error(transparent)]
    Model(#[from] CoreError),

    /// Generator configuration could not be parsed
    #[error("Invalid generator configuration: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for generation operations
pub type Result<T> = std::result::Result<T, CodegenError>;
