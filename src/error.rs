use thiserror::Error;

/// Contract violations reported by [`TransitionController`](crate::TransitionController)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("invalid transition: {0}")]
    InvalidTransition(&'static str),

    #[error("transition is already playing")]
    AlreadyPlaying,

    #[error("transition has already completed")]
    AlreadyCompleted,

    #[error("transition is not playing")]
    NotPlaying,

    #[error("property `{name}` is not present in both states")]
    PropertyMismatch { name: String },
}

pub type Result<T> = std::result::Result<T, TransitionError>;
