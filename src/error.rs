use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("failed to decode persisted plan: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("unknown location label '{0}'")]
    UnknownLabel(String),
    #[error("invalid packed coordinates for label '{0}'")]
    InvalidPacking(String),
    #[error("protected region cannot be separated from unsafe exits")]
    MinCutUnsolvable,
}
