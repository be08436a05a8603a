use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("invalid driver configuration: {0}")]
    InvalidDriverConfig(String),

    #[error("unknown placeholder '{{{placeholder}}}' in argument '{arg}'")]
    UnknownPlaceholder { placeholder: String, arg: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
