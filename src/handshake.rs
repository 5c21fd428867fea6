//! Session bootstrap against the handshake service.

use log::{debug, info};
use url::Url;

use crate::error::{BotError, Result};
use crate::types::{BotIdentity, HandshakeResponse};

/// Outcome of a successful handshake.
#[derive(Debug, Clone)]
pub struct Handshake {
    pub endpoint: Url,
    pub identity: BotIdentity,
}

pub struct HandshakeClient {
    client: reqwest::Client,
    url: Url,
}

impl HandshakeClient {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }

    /// Exchange the session token for a streaming endpoint and bot identity.
    ///
    /// # Errors
    ///
    /// Returns a handshake error when the request fails, the body cannot be
    /// parsed, the service rejects the token or the answer lacks the endpoint
    /// or identity.
    pub async fn start(&self, token: &str) -> Result<Handshake> {
        debug!("Requesting session handshake from {}", self.url);

        let response = self
            .client
            .get(self.url.clone())
            .query(&[("token", token)])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("Handshake answered with status {status}");

        let handshake = parse_handshake(&body)?;
        info!(
            "Handshake succeeded as {}, streaming endpoint {}",
            handshake.identity,
            handshake.endpoint.host_str().unwrap_or("<none>")
        );
        Ok(handshake)
    }
}

/// Validate a handshake response body.
///
/// # Errors
///
/// See [`HandshakeClient::start`].
pub fn parse_handshake(body: &str) -> Result<Handshake> {
    let response: HandshakeResponse =
        serde_json::from_str(body).map_err(BotError::HandshakeParse)?;

    if !response.ok {
        return Err(BotError::HandshakeRejected(
            response
                .error
                .unwrap_or_else(|| "no error detail".to_string()),
        ));
    }

    let url = response
        .url
        .filter(|url| !url.is_empty())
        .ok_or(BotError::HandshakeIncomplete("streaming url"))?;
    let identity = response
        .identity
        .and_then(|identity| BotIdentity::new(identity.id))
        .ok_or(BotError::HandshakeIncomplete("bot identity"))?;

    Ok(Handshake {
        endpoint: Url::parse(&url)?,
        identity,
    })
}
