use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("Identity file is malformed: {0}")]
    Identity(#[from] serde_json::Error),
    #[error("Could not resolve endpoint {0}")]
    UnresolvedEndpoint(String),
    #[error("Network channel closed")]
    ChannelClosed,
}
