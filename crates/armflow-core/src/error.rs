use thiserror::Error;

#[derive(Debug, Error)]
pub enum FlowError {
    #[error("action index {index} out of range: registry holds {len} action(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("plan not found: {0}")]
    PlanNotFound(String),

    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;
