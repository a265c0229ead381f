//! Line commands accepted on stdin.

use wakeboost_engine::BlankMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Deliver an early-phase display event.
    Display(BlankMode),
    /// Write the `wake_boost` parameter. The value is passed through raw so
    /// the parameter does its own validation.
    Set(String),
    Get,
    State,
}

impl Command {
    /// `None` for blank lines. Unknown words come back as `Err` with the
    /// offending input.
    pub fn parse(line: &str) -> Option<Result<Self, String>> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));

        let command = match word.to_ascii_lowercase().as_str() {
            "unblank" | "active" => Self::Display(BlankMode::Unblank),
            "blank" | "inactive" => Self::Display(BlankMode::Powerdown),
            "set" => Self::Set(rest.to_owned()),
            "get" => Self::Get,
            "state" => Self::State,
            _ => return Some(Err(line.to_owned())),
        };
        Some(Ok(command))
    }
}
