use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown chunking strategy '{given}' (expected one of: {valid})")]
    UnknownStrategy { given: String, valid: String },

    #[error("{stage} failed: {source}")]
    Collaborator {
        stage: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl Error {
    pub fn collaborator(stage: &'static str, source: anyhow::Error) -> Self {
        Self::Collaborator { stage, source }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
