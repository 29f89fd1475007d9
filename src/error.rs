use crate::types::Step;

/// Raised when the caller's cancellation signal or deadline cuts a call short.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("{step} was cancelled")]
    Cancelled { step: Step },
    #[error("{step} exceeded the deadline")]
    DeadlineExceeded { step: Step },
}

pub fn is_interrupted(err: &anyhow::Error) -> bool {
    err.downcast_ref::<Interrupted>().is_some()
}
