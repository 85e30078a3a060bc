//! Parser for scripted action sequences.
//!
//! A script is a list of tokens separated by whitespace or commas:
//!
//! | Token | Action |
//! |---|---|
//! | `r` `u` `l` `d` | crawl one cell |
//! | `gr` `gu` `gl` `gd` | grow or shrink toward a direction |
//! | `fr` `fu` `fl` `fd` | fire a shot from the head |
//! | `z` | undo the last action |
//! | `fly` / `land` | toggle fly mode |
//!
//! Tokens are case-insensitive.

use std::fmt;

use burrow_core::Direction;
use thiserror::Error;

/// One player action read from a script.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Action {
    Crawl(Direction),
    Grow(Direction),
    Fire(Direction),
    Undo,
    Fly(bool),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Crawl(direction) => write!(f, "crawl {direction:?}"),
            Action::Grow(direction) => write!(f, "grow {direction:?}"),
            Action::Fire(direction) => write!(f, "fire {direction:?}"),
            Action::Undo => f.write_str("undo"),
            Action::Fly(true) => f.write_str("fly"),
            Action::Fly(false) => f.write_str("land"),
        }
    }
}

/// Script parsing failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum ScriptError {
    #[error("unknown token `{token}` at position {position}")]
    UnknownToken { token: String, position: usize },
}

/// Parses a whole script into actions.
pub(crate) fn parse(script: &str) -> Result<Vec<Action>, ScriptError> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .enumerate()
        .map(|(position, token)| {
            parse_token(&token.to_ascii_lowercase()).ok_or_else(|| ScriptError::UnknownToken {
                token: token.to_owned(),
                position: position + 1,
            })
        })
        .collect()
}

fn parse_token(token: &str) -> Option<Action> {
    match token {
        "z" => return Some(Action::Undo),
        "fly" => return Some(Action::Fly(true)),
        "land" => return Some(Action::Fly(false)),
        _ => {}
    }

    let mut chars = token.chars();
    let last = chars.next_back()?;
    let direction = direction(last)?;
    match chars.as_str() {
        "" => Some(Action::Crawl(direction)),
        "g" => Some(Action::Grow(direction)),
        "f" => Some(Action::Fire(direction)),
        _ => None,
    }
}

fn direction(letter: char) -> Option<Direction> {
    match letter {
        'r' => Some(Direction::Right),
        'u' => Some(Direction::Up),
        'l' => Some(Direction::Left),
        'd' => Some(Direction::Down),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{parse, Action, ScriptError};
    use burrow_core::Direction;

    #[test]
    fn parses_every_token_shape() {
        let actions = parse("r U, gl fd z fly land").expect("script parses");

        assert_eq!(
            actions,
            vec![
                Action::Crawl(Direction::Right),
                Action::Crawl(Direction::Up),
                Action::Grow(Direction::Left),
                Action::Fire(Direction::Down),
                Action::Undo,
                Action::Fly(true),
                Action::Fly(false),
            ]
        );
    }

    #[test]
    fn blank_scripts_are_empty() {
        assert_eq!(parse("  ,, ").expect("script parses"), Vec::new());
    }

    #[test]
    fn reports_the_first_bad_token() {
        assert_eq!(
            parse("r r gx z"),
            Err(ScriptError::UnknownToken {
                token: "gx".to_owned(),
                position: 3,
            })
        );
        assert!(parse("fly2").is_err());
    }
}
