//! Conversions between the three shapes chat text takes.
//!
//! - **Server text** is what the gateway delivers: literal `&`, `<`, `>`
//!   are escaped and references look like `<@U123>`, `<#C1|general>`,
//!   `<!here>` or `<https://example.com|label>`.
//! - **Sendable text** is server text with links unwrapped to their
//!   target, so it can be posted back unchanged.
//! - **Plain text** is what plugins match commands against: references
//!   resolved to `@name` / `#name` and entities unescaped.

use crate::{ChannelId, ProtocolError, UserId};

/// Zero-width word joiner. Splitting a name with it keeps the name readable
/// while stopping the platform from treating it as a mention.
const WORD_JOINER: char = '\u{2060}';

/// Converts server text into sendable text.
///
/// Channel, user and special references are kept as-is; links lose their
/// angle brackets and label so the platform re-linkifies them.
///
/// # Errors
/// Returns [`ProtocolError::MalformedText`] if the text contains an angle
/// bracket that is not part of a `<...>` reference.
pub fn server_text_to_sendable_text(server_text: &str) -> Result<String, ProtocolError> {
    let mut out = String::with_capacity(server_text.len());
    for_each_reference(server_text, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Reference(body) => {
            if body.starts_with("#C") || body.starts_with("@U") || body.starts_with('!') {
                out.push('<');
                out.push_str(body);
                out.push('>');
            } else {
                out.push_str(reference_target(body));
            }
        }
    })?;
    Ok(out)
}

/// Converts sendable text into plain text.
///
/// `user_name` and `channel_name` resolve ids to display names; when they
/// return `None` the reference's own label is used, then the raw id.
/// Malformed input degrades to returning the text with entities unescaped.
pub fn sendable_text_to_text<U, C>(text: &str, user_name: U, channel_name: C) -> String
where
    U: Fn(&UserId) -> Option<String>,
    C: Fn(&ChannelId) -> Option<String>,
{
    let mut out = String::with_capacity(text.len());
    let result = for_each_reference(text, |piece| match piece {
        Piece::Text(text) => out.push_str(text),
        Piece::Reference(body) => {
            let (target, label) = split_label(body);
            if let Some(id) = target.strip_prefix('@') {
                let name = user_name(&UserId::new(id))
                    .or_else(|| label.map(str::to_owned))
                    .unwrap_or_else(|| id.to_owned());
                out.push('@');
                out.push_str(&name);
            } else if let Some(id) = target.strip_prefix('#') {
                let name = channel_name(&ChannelId::new(id))
                    .or_else(|| label.map(str::to_owned))
                    .unwrap_or_else(|| id.to_owned());
                out.push('#');
                out.push_str(&name);
            } else if let Some(command) = target.strip_prefix('!') {
                match label {
                    Some(label) => out.push_str(label),
                    None => {
                        out.push('@');
                        out.push_str(command);
                    }
                }
            } else {
                out.push_str(label.unwrap_or(target));
            }
        }
    });
    match result {
        Ok(()) => unescape(&out),
        Err(_) => unescape(text),
    }
}

/// Escapes plain text so it is posted literally.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Makes `word` render identically without mentioning whoever it names.
pub fn untag_word(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => {
            let mut out = String::with_capacity(word.len() + WORD_JOINER.len_utf8());
            out.push(first);
            out.push(WORD_JOINER);
            out.extend(chars);
            out
        }
        None => String::new(),
    }
}

// ---------------------------------------------------------------------------
// Scanning helpers
// ---------------------------------------------------------------------------

enum Piece<'a> {
    Text(&'a str),
    Reference(&'a str),
}

/// Walks `text`, yielding literal runs and the bodies of `<...>` references.
fn for_each_reference<'a>(
    text: &'a str,
    mut visit: impl FnMut(Piece<'a>),
) -> Result<(), ProtocolError> {
    let mut rest = text;
    while let Some(start) = rest.find(['<', '>']) {
        if rest[start..].starts_with('>') {
            return Err(ProtocolError::MalformedText(text.to_owned()));
        }
        if start > 0 {
            visit(Piece::Text(&rest[..start]));
        }
        let after = &rest[start + 1..];
        let end = match after.find(['<', '>']) {
            Some(end) if after[end..].starts_with('>') => end,
            _ => return Err(ProtocolError::MalformedText(text.to_owned())),
        };
        visit(Piece::Reference(&after[..end]));
        rest = &after[end + 1..];
    }
    if !rest.is_empty() {
        visit(Piece::Text(rest));
    }
    Ok(())
}

fn split_label(body: &str) -> (&str, Option<&str>) {
    match body.split_once('|') {
        Some((target, label)) => (target, Some(label)),
        None => (body, None),
    }
}

fn reference_target(body: &str) -> &str {
    split_label(body).0
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(id: &UserId) -> Option<String> {
        (id.as_str() == "U1").then(|| "alice".to_owned())
    }

    fn channels(id: &ChannelId) -> Option<String> {
        (id.as_str() == "C1").then(|| "general".to_owned())
    }

    #[test]
    fn test_server_text_keeps_references_and_unwraps_links() {
        let text = "hi <@U1> in <#C1|general>, see <https://example.com|site> <!here>";

        let sendable = server_text_to_sendable_text(text).unwrap();

        assert_eq!(
            sendable,
            "hi <@U1> in <#C1|general>, see https://example.com <!here>"
        );
    }

    #[test]
    fn test_server_text_rejects_stray_brackets() {
        assert!(server_text_to_sendable_text("a > b").is_err());
        assert!(server_text_to_sendable_text("a < b").is_err());
        assert!(server_text_to_sendable_text("<<@U1>").is_err());
    }

    #[test]
    fn test_plain_text_resolves_mentions() {
        let text = "pls agar me <@U1> <@U9|bob> <#C1>";

        let plain = sendable_text_to_text(text, names, channels);

        assert_eq!(plain, "pls agar me @alice @bob #general");
    }

    #[test]
    fn test_plain_text_unescapes_entities() {
        let plain = sendable_text_to_text("&lt; &amp;gt; &gt;", names, channels);

        // `&amp;gt;` must stay a literal "&gt;" rather than becoming ">".
        assert_eq!(plain, "< &gt; >");
    }

    #[test]
    fn test_plain_text_special_commands() {
        assert_eq!(sendable_text_to_text("<!here>", names, channels), "@here");
        assert_eq!(
            sendable_text_to_text("<!subteam^S1|@devs>", names, channels),
            "@devs"
        );
    }

    #[test]
    fn test_escape_text_round_trips_through_plain_text() {
        let escaped = escape_text("a<b & c>d");

        assert_eq!(escaped, "a&lt;b &amp; c&gt;d");
        assert_eq!(sendable_text_to_text(&escaped, names, channels), "a<b & c>d");
    }

    #[test]
    fn test_untag_word_inserts_joiner_after_first_char() {
        let untagged = untag_word("alice");

        assert_eq!(untagged, "a\u{2060}lice");
        assert_eq!(untagged.replace('\u{2060}', ""), "alice");
        assert_eq!(untag_word(""), "");
        assert_eq!(untag_word("é"), "é\u{2060}");
    }
}
