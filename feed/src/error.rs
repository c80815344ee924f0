use thiserror::Error;

/// Error type for feed connections.
#[derive(Debug, Error)]
pub enum FeedError {
    /// The TCP connection to the simulator could not be opened.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    /// The server did not answer within the configured timeout.
    #[error("timed out waiting for the simulator")]
    Timeout,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The server sent something that is not part of the protocol.
    #[error("protocol error: {0}")]
    Protocol(String),
    /// The server closed the connection.
    #[error("the simulator closed the connection")]
    Disconnected,
    /// A tick callback is already registered on this connection.
    #[error("a tick callback is already registered")]
    AlreadySubscribed,
    /// A blocking query was issued after the connection switched to
    /// streaming mode.
    #[error("connection is in streaming mode")]
    Streaming,
}

impl From<serde_json::Error> for FeedError {
    fn from(err: serde_json::Error) -> Self {
        FeedError::Protocol(err.to_string())
    }
}
