//! Human-readable status lines shown by the display owner.

use crate::{
    error::ErrorKind,
    model::{Outcome, WeatherResult},
};

impl Outcome {
    /// Render the single status line for this outcome.
    pub fn status_line(&self) -> String {
        match self {
            Outcome::Success(result) => format!(
                "🌡️ {}°C - {}",
                degrees(result.temperature),
                capitalize_words(&result.description)
            ),
            Outcome::Failure { kind, detail } => match kind {
                ErrorKind::InvalidRequest => "Invalid URL".to_string(),
                ErrorKind::Transport => format!("Error: {detail}"),
                ErrorKind::Decode => "Failed to decode response".to_string(),
                ErrorKind::Unknown => "⚠️ Failed to fetch weather".to_string(),
            },
        }
    }
}

/// One line per forecast day; empty when no forecast was returned.
///
/// The day label comes from the entry's timestamp (UTC). The server's `date`
/// string is only used when the timestamp is out of range.
pub fn forecast_lines(result: &WeatherResult) -> Vec<String> {
    result
        .forecast
        .iter()
        .flatten()
        .map(|day| {
            let label = day
                .observed_at()
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| day.date.clone());
            format!(
                "{label}: {}°C - {}",
                degrees(day.temperature),
                capitalize_words(&day.description)
            )
        })
        .collect()
}

/// Whole values keep their fraction (`21.0`, not `21`).
fn degrees(value: f64) -> String {
    format!("{value:?}")
}

/// Upper-case the first letter of every word, lower-case the rest.
pub fn capitalize_words(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_whitespace() {
            at_word_start = true;
            out.push(c);
        } else if at_word_start {
            at_word_start = false;
            out.extend(c.to_uppercase());
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}
