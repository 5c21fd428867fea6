//! Decides what kind of answer a query deserves.

use std::sync::LazyLock;

use regex::Regex;

use crate::responses::pick_response;

pub const MISSING_QUESTION_REPLY: &str = "Where's the question?";
pub const OPEN_ENDED_REPLY: &str = "I'm not a tarot deck. Yes or no questions please.";

static OPEN_ENDED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(who|what|when|where|why|how|if)").expect("interrogative pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    /// Does not end with a question mark.
    MissingQuestionMark,
    /// Starts with an interrogative the 8-ball cannot honestly answer.
    OpenEnded,
    YesNo,
}

impl QueryKind {
    /// Reply text for this kind; yes/no questions draw a random answer.
    #[must_use]
    pub fn reply(self) -> &'static str {
        match self {
            QueryKind::MissingQuestionMark => MISSING_QUESTION_REPLY,
            QueryKind::OpenEnded => OPEN_ENDED_REPLY,
            QueryKind::YesNo => pick_response(),
        }
    }
}

#[must_use]
pub fn classify(query: &str) -> QueryKind {
    if !query.ends_with('?') {
        QueryKind::MissingQuestionMark
    } else if OPEN_ENDED.is_match(&query.to_lowercase()) {
        QueryKind::OpenEnded
    } else {
        QueryKind::YesNo
    }
}

/// Classify `query` and produce the text to send back.
#[must_use]
pub fn compose_reply(query: &str) -> &'static str {
    classify(query).reply()
}
