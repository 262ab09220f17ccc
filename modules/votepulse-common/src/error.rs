use thiserror::Error;

/// Domain errors raised at the store and message boundaries. Invalid or
/// missing worker configuration is not represented here: it triggers
/// default-configuration synthesis, never an error.
#[derive(Error, Debug)]
pub enum VotePulseError {
    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variants_name_their_boundary() {
        assert_eq!(
            VotePulseError::Queue("connection reset".into()).to_string(),
            "Queue error: connection reset"
        );
        assert_eq!(
            VotePulseError::Store("pool exhausted".into()).to_string(),
            "Store error: pool exhausted"
        );
        assert_eq!(
            VotePulseError::Parse("bad payload".into()).to_string(),
            "Parse error: bad payload"
        );
    }
}
