pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod handshake;
pub mod responses;
pub mod session;
pub mod types;

use std::sync::Arc;

use log::{debug, info};

use config::Config;
use dispatch::Dispatcher;
use error::Result;
use handshake::HandshakeClient;
use session::{DuplexSession, SessionContext};

/// Run the bot until the duplex channel ends or a shutdown signal arrives.
///
/// # Errors
///
/// Returns an error only for startup failures: the handshake or opening the
/// duplex channel. Once listening, channel failures end the run normally.
pub async fn run(config: Config) -> Result<()> {
    info!("Initializing bot");

    let handshake = HandshakeClient::new(config.handshake_url.clone())
        .start(&config.session_token)
        .await?;

    let context = Arc::new(SessionContext::new(handshake.identity));
    let session = DuplexSession::connect(&handshake.endpoint, context).await?;
    info!("Connected to the chat service");

    let (mut reader, replier) = session.into_parts();
    let dispatcher = Dispatcher::new(replier.clone(), config.max_reply_tasks);

    tokio::select! {
        reason = dispatcher.run(&mut reader) => {
            info!("Dispatch loop ended: {reason}");
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received, shutting down...");
        }
    }

    if let Err(e) = replier.close().await {
        debug!("Channel already closed: {e}");
    }

    Ok(())
}
