use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Pin not found: {0}")]
    PinNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Subscription error: {0}")]
    Subscription(String),

    #[error("Mutation rejected: {0}")]
    Rejected(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Preference store error: {0}")]
    Preferences(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
