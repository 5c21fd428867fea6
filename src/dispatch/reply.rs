//! Reply generation, run once per addressed message.

use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Semaphore;

use crate::classifier::compose_reply;
use crate::session::Replier;

/// Answer `query` on `channel` with exactly one message.
///
/// Failures are logged here and never reach the dispatch loop.
pub async fn post_reply<T>(
    replier: Replier<T>,
    query: String,
    channel: String,
    limiter: Option<Arc<Semaphore>>,
) where
    T: AsyncRead + AsyncWrite + Unpin,
{
    let _permit = match limiter {
        Some(limiter) => match limiter.acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                warn!("Dropping reply for channel {channel}: {e}");
                return;
            }
        },
        None => None,
    };

    let text = compose_reply(&query);

    match replier.send(&channel, text).await {
        Ok(id) => info!("Replied in channel {channel} (message {id}): {text}"),
        Err(e) => error!("Cannot send reply to channel {channel}: {e}"),
    }
}
