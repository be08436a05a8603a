use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid process id: {0}")]
    InvalidPid(String),

    #[error("unknown agent state: {0}")]
    UnknownState(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type ModelResult<T> = Result<T, ModelError>;
