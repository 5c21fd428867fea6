//! Canned magic 8-ball answers.

use rand::prelude::IndexedRandom;

/// Answers for well-formed yes/no questions, in table order.
pub const RESPONSES: [&str; 20] = [
    "Signs point to no.",
    "Yes.",
    "Reply hazy, try again.",
    "Without a doubt.",
    "My sources say no.",
    "As I see it, yes.",
    "You may rely on it.",
    "Concentrate and ask again.",
    "Outlook not so good.",
    "It is decidedly so.",
    "Better not tell you now.",
    "Very doubtful.",
    "Yes - definitely.",
    "It is certain.",
    "Cannot predict now.",
    "Most likely.",
    "Ask again later.",
    "My reply is no.",
    "Outlook good.",
    "Don't count on it.",
];

/// Pick an answer uniformly at random.
#[must_use]
pub fn pick_response() -> &'static str {
    RESPONSES
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(RESPONSES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    const DRAWS: usize = 20_000;

    // Chi-square critical value for 19 degrees of freedom at p = 0.0001.
    const CHI_SQUARE_LIMIT: f64 = 54.05;

    #[test]
    fn picks_from_table() {
        for _ in 0..100 {
            assert!(RESPONSES.contains(&pick_response()));
        }
    }

    #[test]
    fn selection_is_uniform() {
        let mut counts = [0usize; RESPONSES.len()];
        for _ in 0..DRAWS {
            let answer = pick_response();
            let idx = RESPONSES
                .iter()
                .position(|r| *r == answer)
                .expect("answer comes from the table");
            counts[idx] += 1;
        }

        #[allow(clippy::cast_precision_loss)]
        let expected = DRAWS as f64 / RESPONSES.len() as f64;
        let chi_square: f64 = counts
            .iter()
            .map(|&observed| {
                #[allow(clippy::cast_precision_loss)]
                let diff = observed as f64 - expected;
                diff * diff / expected
            })
            .sum();

        assert!(
            chi_square < CHI_SQUARE_LIMIT,
            "chi-square {chi_square:.2} over {DRAWS} draws: {counts:?}"
        );
    }

    #[test]
    fn answers_are_distinct() {
        for (i, a) in RESPONSES.iter().enumerate() {
            assert!(!RESPONSES[i + 1..].contains(a), "duplicate answer {a}");
        }
    }
}
