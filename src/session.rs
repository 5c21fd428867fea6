//! Duplex session over the streaming endpoint.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::error::{BotError, Result};
use crate::types::{BotIdentity, OutgoingMessage};

/// Per-run state shared by the dispatch loop and every reply task.
#[derive(Debug)]
pub struct SessionContext {
    identity: BotIdentity,
    last_id: AtomicU64,
}

impl SessionContext {
    #[must_use]
    pub fn new(identity: BotIdentity) -> Self {
        Self {
            identity,
            last_id: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn identity(&self) -> &BotIdentity {
        &self.identity
    }

    /// Allocate the id of the next outgoing message, starting at 1.
    pub fn next_message_id(&self) -> u64 {
        self.last_id.fetch_add(1, Ordering::SeqCst).wrapping_add(1)
    }
}

type Sink<T> = SplitSink<WebSocketStream<T>, Message>;

/// An open duplex channel, not yet split between reader and writers.
pub struct DuplexSession<T> {
    reader: FrameReader<T>,
    replier: Replier<T>,
}

impl DuplexSession<MaybeTlsStream<TcpStream>> {
    /// Open the streaming connection returned by the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Connect`] if the upgrade fails.
    pub async fn connect(endpoint: &Url, context: Arc<SessionContext>) -> Result<Self> {
        debug!("Opening duplex channel to {}", endpoint.host_str().unwrap_or("<none>"));

        match connect_async(endpoint.as_str()).await {
            Ok((stream, response)) => {
                debug!("Upgrade answered with status {}", response.status());
                Ok(Self::new(stream, context))
            }
            Err(e) => {
                if let tungstenite::Error::Http(response) = &e {
                    warn!("Error with the handshake:");
                    warn!("\tStatus: {}", response.status());
                    for (name, value) in response.headers() {
                        warn!("\t {name} = {value:?}");
                    }
                }
                Err(BotError::Connect(Box::new(e)))
            }
        }
    }
}

impl<T> DuplexSession<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: WebSocketStream<T>, context: Arc<SessionContext>) -> Self {
        let (sink, stream) = stream.split();
        Self {
            reader: FrameReader { stream },
            replier: Replier {
                sink: Arc::new(Mutex::new(sink)),
                context,
            },
        }
    }

    /// Split into the single reader and the cloneable writer.
    #[must_use]
    pub fn into_parts(self) -> (FrameReader<T>, Replier<T>) {
        (self.reader, self.replier)
    }
}

/// Read half of the session. There is exactly one per session.
pub struct FrameReader<T> {
    stream: SplitStream<WebSocketStream<T>>,
}

impl<T> FrameReader<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    /// Wait for the next data frame and return its payload.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::ChannelClosed`] once the peer closes the channel
    /// and [`BotError::Receive`] on transport failure.
    pub async fn receive(&mut self) -> Result<Vec<u8>> {
        loop {
            match self.stream.next().await {
                Some(Ok(msg @ (Message::Text(_) | Message::Binary(_)))) => {
                    return Ok(msg.into_data().to_vec());
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!("Peer closed the channel: {frame:?}");
                    return Err(BotError::ChannelClosed);
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(BotError::Receive(Box::new(e))),
                None => return Err(BotError::ChannelClosed),
            }
        }
    }
}

/// Write half of the session, shared by reply tasks.
pub struct Replier<T> {
    sink: Arc<Mutex<Sink<T>>>,
    context: Arc<SessionContext>,
}

impl<T> Clone for Replier<T> {
    fn clone(&self) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            context: Arc::clone(&self.context),
        }
    }
}

impl<T> Replier<T>
where
    T: AsyncRead + AsyncWrite + Unpin,
{
    #[must_use]
    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    /// Send `text` to `channel` and return the id it was sent under.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Encode`] if the message cannot be serialized and
    /// [`BotError::TransportWrite`] if the write fails.
    pub async fn send(&self, channel: &str, text: &str) -> Result<u64> {
        let id = self.context.next_message_id();
        let payload = serde_json::to_string(&OutgoingMessage::new(id, channel, text))
            .map_err(BotError::Encode)?;

        // Frames from concurrent senders must not interleave.
        let mut sink = self.sink.lock().await;
        sink.send(Message::text(payload))
            .await
            .map_err(|e| BotError::TransportWrite(Box::new(e)))?;

        debug!("Sent message {id} to channel {channel}");
        Ok(id)
    }

    /// Close the channel.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::TransportWrite`] if the close frame cannot be
    /// written, e.g. because the peer already went away.
    pub async fn close(&self) -> Result<()> {
        let mut sink = self.sink.lock().await;
        sink.close()
            .await
            .map_err(|e| BotError::TransportWrite(Box::new(e)))
    }
}
