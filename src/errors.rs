#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Any failed round trip to the booking backend. The message is shown to
    /// the user verbatim.
    #[error("{0}")]
    Gateway(String),

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Text to put in front of the user. Gateway messages are already
    /// human-readable; the other variants keep their prefix.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Gateway(message) => message.clone(),
            other => other.to_string(),
        }
    }
}
