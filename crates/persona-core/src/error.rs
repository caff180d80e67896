use thiserror::Error;

#[derive(Error, Debug)]
pub enum PersonaError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The entity extractor raised or returned malformed data.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The trait estimator failed or returned unparseable data.
    #[error("Estimation error: {0}")]
    Estimation(String),

    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A document id and an entity id would share one node.
    #[error("Node id conflict: {0}")]
    IdConflict(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, PersonaError>;
