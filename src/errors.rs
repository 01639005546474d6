use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum SpawnError {
    #[error("{stage} thread count must be greater than 0 (got {count})")]
    InvalidThreadCount { stage: &'static str, count: usize },

    #[error("batch size must be greater than 0 (got {0})")]
    InvalidBatchSize(usize),

    #[error("workload item count must be greater than 0")]
    InvalidItemCount,

    /// The target pool was shut down before the item was accepted.
    #[error("executor terminating, unable to accept work")]
    Rejected,

    #[error("task panicked: {0}")]
    Panic(String),

    #[error("completion channel closed before the task resolved")]
    ChannelClosed,

    #[error("failed to start worker thread: {0}")]
    ThreadSpawn(String),
}

impl SpawnError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SpawnError::InvalidThreadCount { .. }
                | SpawnError::InvalidBatchSize(_)
                | SpawnError::InvalidItemCount
        )
    }
}

/// Turns a `catch_unwind` payload into a readable message.
pub(crate) fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
