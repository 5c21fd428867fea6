//! Wire types shared by the handshake and the duplex session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag carried by chat messages, inbound and outgoing.
pub const MESSAGE_TYPE: &str = "message";

/// Body of the handshake service response.
#[derive(Debug, Clone, Deserialize)]
pub struct HandshakeResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "self", default)]
    pub identity: Option<SelfIdentity>,
}

/// The bot's own account, as reported by the handshake service.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfIdentity {
    pub id: String,
}

/// Account id of the bot on the chat service.
///
/// Never empty; the handshake refuses to produce one otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity(String);

impl BotIdentity {
    /// Returns `None` for an empty id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() { None } else { Some(Self(id)) }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `<@ID>` prefix a message must start with to address the bot.
    #[must_use]
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for BotIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An event frame received over the duplex channel.
///
/// Only `type` is required so that control and event frames decode too; they
/// are told apart by [`InboundMessage::is_message`].
#[derive(Debug, Clone, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub subtype: Option<String>,
    #[serde(default)]
    pub channel: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "ts", default)]
    pub timestamp: String,
}

impl InboundMessage {
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.kind == MESSAGE_TYPE
    }
}

/// A reply written back over the duplex channel.
#[derive(Debug, Clone, Serialize)]
pub struct OutgoingMessage<'a> {
    pub id: u64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub channel: &'a str,
    pub text: &'a str,
}

impl<'a> OutgoingMessage<'a> {
    #[must_use]
    pub fn new(id: u64, channel: &'a str, text: &'a str) -> Self {
        Self {
            id,
            kind: MESSAGE_TYPE,
            channel,
            text,
        }
    }
}
