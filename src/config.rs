use std::env;

use log::{debug, error, info};
use url::Url;

use crate::error::{BotError, Result};

/// Default endpoint of the session handshake service.
pub const DEFAULT_HANDSHAKE_URL: &str = "https://slack.com/api/rtm.start";

const HANDSHAKE_URL_VAR: &str = "EIGHTBALL_HANDSHAKE_URL";
const MAX_REPLY_TASKS_VAR: &str = "EIGHTBALL_MAX_REPLY_TASKS";

#[derive(Debug, Clone)]
pub struct Config {
    pub session_token: String,
    pub handshake_url: Url,
    pub max_reply_tasks: Option<usize>,
}

impl Config {
    /// Build the configuration from the process arguments (program name
    /// excluded) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`BotError::Usage`] unless exactly one argument, the session
    /// token, is given, and a configuration error if an environment override
    /// is malformed.
    pub fn from_args<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        debug!("Loading configuration from arguments and environment");
        dotenvy::dotenv().ok();

        let args: Vec<String> = args.into_iter().collect();
        let [session_token] = <[String; 1]>::try_from(args).map_err(|args| {
            error!("Expecting a session token");
            BotError::Usage(args.len())
        })?;

        let handshake_url = optional_var(HANDSHAKE_URL_VAR)?;
        let max_reply_tasks = optional_var(MAX_REPLY_TASKS_VAR)?;

        let config = Self::build(
            session_token,
            handshake_url.as_deref(),
            max_reply_tasks.as_deref(),
        )?;

        info!("Configuration loaded successfully");
        debug!(
            "Session token length: {} characters",
            config.session_token.len()
        );
        debug!("Handshake URL: {}", config.handshake_url);
        debug!("Max reply tasks: {:?}", config.max_reply_tasks);

        Ok(config)
    }

    fn build(
        session_token: String,
        handshake_url: Option<&str>,
        max_reply_tasks: Option<&str>,
    ) -> Result<Self> {
        if session_token.trim().is_empty() {
            return Err(BotError::Config("session token is empty".to_string()));
        }

        let handshake_url = Url::parse(handshake_url.unwrap_or(DEFAULT_HANDSHAKE_URL))?;

        let max_reply_tasks = max_reply_tasks
            .map(|raw| match raw.trim().parse::<usize>() {
                Ok(0) | Err(_) => Err(BotError::Config(format!(
                    "{MAX_REPLY_TASKS_VAR} must be a positive integer, got '{raw}'"
                ))),
                Ok(limit) => Ok(limit),
            })
            .transpose()?;

        Ok(Self {
            session_token,
            handshake_url,
            max_reply_tasks,
        })
    }
}

/// Read an optional override; an unset variable is fine, a non-Unicode one is not.
fn optional_var(name: &str) -> Result<Option<String>> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(e) => {
            error!("Failed to load {name} from environment: {e}");
            Err(e.into())
        }
    }
}
