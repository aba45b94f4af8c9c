//! Turns plain chat text into game commands.
//!
//! All matching is case-insensitive and works on plain text (references
//! already resolved to `@name`).

use crate::blob::Direction;

/// Words that end the running game when they appear on their own.
const STOP_WORDS: [&str; 5] = ["stop", "end", "terminate", "off", "disable"];

/// A recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `pls agar me [name ...]`. Names are kept as typed, `@` included.
    Start { names: Vec<String> },
    Stop,
    Steer { direction: Direction, action: Action },
}

/// What a steering command does besides pointing a direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Change the persistent direction.
    Move,
    /// Eject food that way; direction unchanged.
    Fire,
    /// Split every heavy blob that way; direction unchanged.
    Split,
}

impl Command {
    /// Parses `text`, trying start, then stop, then steer.
    pub fn parse(text: &str) -> Option<Self> {
        if let Some(names) = parse_start(text) {
            return Some(Command::Start { names });
        }
        if is_stop(text) {
            return Some(Command::Stop);
        }
        parse_steer(text).map(|(direction, action)| Command::Steer { direction, action })
    }
}

/// Matches `pls agar me` followed by zero or more names separated by
/// whitespace or commas. A leading `@` on a name is dropped.
///
/// Returns `None` unless the whole text is such a command.
pub fn parse_start(text: &str) -> Option<Vec<String>> {
    let mut words = text.split_whitespace();
    for keyword in ["pls", "agar", "me"] {
        if !words.next()?.eq_ignore_ascii_case(keyword) {
            return None;
        }
    }

    let mut names = Vec::new();
    for word in words.flat_map(|w| w.split(',')).filter(|w| !w.is_empty()) {
        let name = word.strip_prefix('@').unwrap_or(word);
        if name.is_empty() || !name.chars().all(is_word_char) {
            return None;
        }
        names.push(word.to_owned());
    }
    Some(names)
}

/// Any stop word appears as a whole word.
pub fn is_stop(text: &str) -> bool {
    text.split(|c: char| !is_word_char(c))
        .any(|word| STOP_WORDS.iter().any(|stop| word.eq_ignore_ascii_case(stop)))
}

/// Matches a lone direction glyph (`<`, `v` or `>`) optionally followed by
/// `-` (fire) or `/` (split), surrounding whitespace allowed.
pub fn parse_steer(text: &str) -> Option<(Direction, Action)> {
    let text = text.trim();
    let mut chars = text.chars();
    let direction = match chars.next()? {
        '<' => Direction::Left,
        'v' | 'V' => Direction::Stay,
        '>' => Direction::Right,
        _ => return None,
    };
    let action = match chars.as_str().trim_start() {
        "" => Action::Move,
        "-" => Action::Fire,
        "/" => Action::Split,
        _ => return None,
    };
    Some((direction, action))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
