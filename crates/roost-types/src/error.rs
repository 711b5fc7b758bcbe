use thiserror::Error;

/// Every operation in the friend subsystem returns one of these stable
/// kinds — no error path escapes the boundary as an unhandled fault.
#[derive(Debug, Error)]
pub enum RelationError {
    /// Malformed or self-referential input. Detected before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Record or relationship absent.
    #[error("not found")]
    NotFound,

    /// The actor is not a participant of the target record.
    #[error("forbidden")]
    Forbidden,

    /// The apply record already left the `pending` state.
    #[error("apply already resolved")]
    AlreadyResolved,

    /// Lost an optimistic-concurrency race.
    #[error("conflict")]
    Conflict,

    /// The record-of-truth store is unreachable. Advisory cache and
    /// presence failures never map here — they degrade instead.
    #[error("storage unavailable: {0}")]
    Unavailable(anyhow::Error),
}

impl From<anyhow::Error> for RelationError {
    fn from(err: anyhow::Error) -> Self {
        RelationError::Unavailable(err)
    }
}

impl RelationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        RelationError::InvalidArgument(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anyhow_maps_to_unavailable() {
        let err: RelationError = anyhow::anyhow!("disk on fire").into();
        assert!(matches!(err, RelationError::Unavailable(_)));
        assert!(err.to_string().contains("disk on fire"));
    }
}
