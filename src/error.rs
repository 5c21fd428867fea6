use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Usage: eightball <session-token> (got {0} arguments)")]
    Usage(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Error contacting handshake service: {0}")]
    HandshakeTransport(#[from] reqwest::Error),

    #[error("Unable to parse handshake: {0}")]
    HandshakeParse(serde_json::Error),

    #[error("Handshake rejected: {0}")]
    HandshakeRejected(String),

    #[error("Handshake response is missing {0}")]
    HandshakeIncomplete(&'static str),

    #[error("Error establishing connection: {0}")]
    Connect(Box<tungstenite::Error>),

    #[error("Cannot encode outgoing message: {0}")]
    Encode(serde_json::Error),

    #[error("Cannot send outgoing message: {0}")]
    TransportWrite(Box<tungstenite::Error>),

    #[error("Error reading from channel: {0}")]
    Receive(Box<tungstenite::Error>),

    #[error("Channel closed")]
    ChannelClosed,
}

impl BotError {
    /// Whether the error happened before the dispatch loop could start.
    ///
    /// Startup errors terminate the process with a non-zero status; everything
    /// else is handled where it occurs.
    #[must_use]
    pub fn is_startup(&self) -> bool {
        matches!(
            self,
            BotError::Usage(_)
                | BotError::Config(_)
                | BotError::EnvVar(_)
                | BotError::InvalidUrl(_)
                | BotError::HandshakeTransport(_)
                | BotError::HandshakeParse(_)
                | BotError::HandshakeRejected(_)
                | BotError::HandshakeIncomplete(_)
                | BotError::Connect(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
