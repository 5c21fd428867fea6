//! Dispatch loop: reads frames and hands mentions off to reply tasks.

mod reply;

use std::sync::Arc;

use log::{debug, info, warn};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

use crate::error::BotError;
use crate::session::{FrameReader, Replier};
use crate::types::InboundMessage;

pub use reply::post_reply;

/// Strip the mention prefix from `text`, if the message starts with it.
#[must_use]
pub fn addressed_query<'a>(text: &'a str, mention: &str) -> Option<&'a str> {
    text.strip_prefix(mention).map(str::trim)
}

pub struct Dispatcher<T> {
    replier: Replier<T>,
    mention: String,
    limiter: Option<Arc<Semaphore>>,
}

impl<T> Dispatcher<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    /// `max_reply_tasks` bounds how many replies are generated at once; frame
    /// intake is never held up by it.
    #[must_use]
    pub fn new(replier: Replier<T>, max_reply_tasks: Option<usize>) -> Self {
        let mention = replier.context().identity().mention();
        Self {
            replier,
            mention,
            limiter: max_reply_tasks.map(|limit| Arc::new(Semaphore::new(limit))),
        }
    }

    /// Process frames until the channel fails or closes, and return why.
    pub async fn run(&self, reader: &mut FrameReader<T>) -> BotError {
        info!("Listening for messages addressed to {}", self.mention);
        loop {
            match reader.receive().await {
                Ok(frame) => {
                    // Reply tasks run detached.
                    let _ = self.dispatch(&frame);
                }
                Err(e) => {
                    warn!("Error: {e}");
                    return e;
                }
            }
        }
    }

    /// Decide what to do with one frame. Returns the spawned reply task, if
    /// any; the loop itself never waits on it.
    #[must_use]
    pub fn dispatch(&self, frame: &[u8]) -> Option<JoinHandle<()>> {
        let msg: InboundMessage = match serde_json::from_slice(frame) {
            Ok(msg) => msg,
            Err(e) => {
                debug!("Skipping undecodable frame: {e}");
                return None;
            }
        };

        if !msg.is_message() {
            debug!("Ignoring {} frame", msg.kind);
            return None;
        }

        let Some(query) = addressed_query(&msg.text, &self.mention) else {
            debug!("Message in {} is not addressed to us", msg.channel);
            return None;
        };

        info!(
            "Received message from {} in channel {}: {}",
            msg.user, msg.channel, query
        );

        Some(tokio::spawn(post_reply(
            self.replier.clone(),
            query.to_string(),
            msg.channel,
            self.limiter.clone(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::{SinkExt, StreamExt};
    use tokio_tungstenite::tungstenite::Message;

    use super::*;
    use crate::classifier::{MISSING_QUESTION_REPLY, OPEN_ENDED_REPLY};
    use crate::responses::RESPONSES;
    use crate::session::DuplexSession;
    use crate::session::tests::{context, ws_pair};

    fn message(channel: &str, text: &str) -> Message {
        Message::text(
            serde_json::json!({
                "type": "message",
                "channel": channel,
                "user": "U2",
                "text": text,
                "ts": "1355517523.000005",
            })
            .to_string(),
        )
    }

    #[test]
    fn strips_mention_and_whitespace() {
        assert_eq!(
            addressed_query("<@U123> Will it rain today?", "<@U123>"),
            Some("Will it rain today?")
        );
        assert_eq!(addressed_query("<@U123>   ok?  ", "<@U123>"), Some("ok?"));
    }

    #[test]
    fn mention_must_lead() {
        assert_eq!(addressed_query("hello <@U123> test", "<@U123>"), None);
        assert_eq!(addressed_query(" <@U123> test?", "<@U123>"), None);
    }

    #[test]
    fn mention_is_case_sensitive() {
        assert_eq!(addressed_query("<@u123> test?", "<@U123>"), None);
    }

    #[tokio::test]
    async fn ignores_frames_not_addressed_to_us() {
        let (bot, _service) = ws_pair().await;
        let (_reader, replier) = DuplexSession::new(bot, context("U123")).into_parts();
        let dispatcher = Dispatcher::new(replier, None);

        assert!(dispatcher.dispatch(b"{not json").is_none());
        assert!(dispatcher.dispatch(br#"{"type":"hello"}"#).is_none());
        assert!(
            dispatcher
                .dispatch(br#"{"type":"user_typing","text":"<@U123> hi?"}"#)
                .is_none()
        );
        assert!(
            dispatcher
                .dispatch(br#"{"type":"message","channel":"C1","text":"hello <@U123> test"}"#)
                .is_none()
        );
    }

    #[tokio::test]
    async fn mention_spawns_one_reply_on_source_channel() {
        let (bot, mut service) = ws_pair().await;
        let (_reader, replier) = DuplexSession::new(bot, context("U123")).into_parts();
        let dispatcher = Dispatcher::new(replier, Some(1));

        let task = dispatcher
            .dispatch(br#"{"type":"message","channel":"C7","text":"<@U123> hi there"}"#)
            .expect("reply task");
        task.await.unwrap();

        let Some(Ok(Message::Text(text))) = service.next().await else {
            panic!("expected a reply frame");
        };
        let frame: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(frame["channel"], "C7");
        assert_eq!(frame["text"], MISSING_QUESTION_REPLY);
        assert_eq!(frame["id"], 1);
    }

    #[tokio::test]
    async fn loop_survives_bad_frames_and_ends_on_close() {
        let (bot, mut service) = ws_pair().await;
        let (mut reader, replier) = DuplexSession::new(bot, context("U1")).into_parts();
        let dispatcher = Dispatcher::new(replier, None);
        let running = tokio::spawn(async move { dispatcher.run(&mut reader).await });

        service.send(Message::text("{malformed")).await.unwrap();
        service.send(Message::text(r#"{"type":"hello"}"#)).await.unwrap();
        service.send(message("C0", "nobody asked <@U1>?")).await.unwrap();
        service
            .send(message("C1", "<@U1> why is the sky blue?"))
            .await
            .unwrap();

        let Some(Ok(Message::Text(text))) = service.next().await else {
            panic!("expected a reply frame");
        };
        let first: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(first["channel"], "C1");
        assert_eq!(first["text"], OPEN_ENDED_REPLY);
        assert_eq!(first["id"], 1);

        service
            .send(message("C2", "<@U1> Will it rain today?"))
            .await
            .unwrap();

        let Some(Ok(Message::Text(text))) = service.next().await else {
            panic!("expected a reply frame");
        };
        let second: serde_json::Value = serde_json::from_str(text.as_str()).unwrap();
        assert_eq!(second["channel"], "C2");
        assert_eq!(second["id"], 2);
        assert!(RESPONSES.contains(&second["text"].as_str().unwrap()));

        service.close(None).await.unwrap();
        let reason = tokio::time::timeout(Duration::from_secs(5), running)
            .await
            .expect("loop terminates")
            .unwrap();
        assert!(matches!(reason, BotError::ChannelClosed));
    }
}
