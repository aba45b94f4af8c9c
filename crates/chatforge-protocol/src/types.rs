//! Core protocol types for Chatforge's gateway format.
//!
//! Everything in this module is serialized "on the wire": the gateway
//! pushes [`ChatEvent`]s to the bot, and the bot pushes
//! [`OutboundEvent`]s back.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A chat platform user identifier (e.g. `"U024BE7LH"`).
///
/// Newtype over `String` so a user id can't be passed where a channel id
/// is expected. `#[serde(transparent)]` keeps the JSON form a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Creates a user id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A chat platform channel identifier (e.g. `"C2147483705"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl ChannelId {
    /// Creates a channel id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Directory records
// ---------------------------------------------------------------------------

/// A user as described by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    /// Stable platform id.
    pub id: UserId,
    /// Display name (unique per workspace, may change over time).
    pub name: String,
    /// Whether the account belongs to a bot. Messages from bots are ignored.
    #[serde(default)]
    pub is_bot: bool,
}

/// A channel as described by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Stable platform id.
    pub id: ChannelId,
    /// Channel name without the leading `#`.
    pub name: String,
}

// ---------------------------------------------------------------------------
// Inbound events
// ---------------------------------------------------------------------------

/// The replacement body carried by an edited message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditedMessage {
    /// Author of the edited message.
    #[serde(default)]
    pub user: Option<UserId>,
    /// New text of the message, in gateway (escaped) format.
    #[serde(default)]
    pub text: Option<String>,
}

/// An event pushed by the chat gateway.
///
/// Internally tagged by `"type"`:
///
/// ```json
/// { "type": "message", "channel": "C1", "user": "U1", "text": "hi", "ts": "1.0" }
/// ```
///
/// Event types the bot does not understand decode to [`ChatEvent::Other`]
/// instead of failing, so a gateway upgrade never takes the bot down.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// Sent once after connecting: the initial user and channel roster.
    Hello {
        #[serde(default)]
        users: Vec<UserInfo>,
        #[serde(default)]
        channels: Vec<ChannelInfo>,
    },

    /// A chat message, or an edit of one (`subtype = "message_changed"`).
    Message {
        #[serde(default)]
        channel: Option<ChannelId>,
        #[serde(default)]
        user: Option<UserId>,
        #[serde(default)]
        text: Option<String>,
        #[serde(default)]
        ts: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        subtype: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<EditedMessage>,
    },

    /// A user joined or changed their profile.
    UserChange { user: UserInfo },

    /// A channel was created or renamed.
    ChannelCreated { channel: ChannelInfo },

    /// Anything else (pings, presence changes, typing indicators, ...).
    #[serde(other)]
    Other,
}

/// Subtype the gateway uses for edited messages.
const MESSAGE_CHANGED: &str = "message_changed";

impl ChatEvent {
    /// Builds a plain message event. Mostly useful for tests and the
    /// console transport.
    pub fn message(
        channel: ChannelId,
        user: UserId,
        text: impl Into<String>,
        ts: impl Into<String>,
    ) -> Self {
        Self::Message {
            channel: Some(channel),
            user: Some(user),
            text: Some(text.into()),
            ts: Some(ts.into()),
            subtype: None,
            message: None,
        }
    }

    fn is_edit(subtype: &Option<String>) -> bool {
        subtype.as_deref() == Some(MESSAGE_CHANGED)
    }

    /// Returns the text of a valid text message (plain or edited), in
    /// gateway format, or `None` for anything else.
    ///
    /// A message counts as valid only when it carries a timestamp and an
    /// author alongside its text.
    pub fn text(&self) -> Option<&str> {
        let Self::Message {
            user,
            text,
            ts,
            subtype,
            message,
            ..
        } = self
        else {
            return None;
        };
        ts.as_ref()?;
        if let (Some(text), Some(_)) = (text, user) {
            return Some(text);
        }
        if Self::is_edit(subtype) {
            let edited = message.as_ref()?;
            edited.user.as_ref()?;
            return edited.text.as_deref();
        }
        None
    }

    /// Returns the author of a message (the editor for edits).
    pub fn sender(&self) -> Option<&UserId> {
        let Self::Message {
            user,
            subtype,
            message,
            ..
        } = self
        else {
            return None;
        };
        if let Some(user) = user {
            return Some(user);
        }
        if Self::is_edit(subtype) {
            return message.as_ref()?.user.as_ref();
        }
        None
    }

    /// Returns the channel a message was posted in.
    pub fn channel(&self) -> Option<&ChannelId> {
        match self {
            Self::Message { channel, .. } => channel.as_ref(),
            _ => None,
        }
    }

    /// Returns the gateway timestamp of a message.
    pub fn timestamp(&self) -> Option<&str> {
        match self {
            Self::Message { ts, .. } => ts.as_deref(),
            _ => None,
        }
    }

    /// Events that carry no conversational content and are not worth
    /// keeping in the recent-events history.
    pub fn is_ephemeral(&self) -> bool {
        matches!(self, Self::Other)
    }
}

// ---------------------------------------------------------------------------
// Outbound events
// ---------------------------------------------------------------------------

/// An event the bot sends to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    /// Post `text` (gateway format) to `channel`.
    Message { channel: ChannelId, text: String },
}

impl OutboundEvent {
    /// Shorthand for [`OutboundEvent::Message`].
    pub fn message(channel: ChannelId, text: impl Into<String>) -> Self {
        Self::Message {
            channel,
            text: text.into(),
        }
    }

    /// The channel this event is addressed to.
    pub fn channel(&self) -> &ChannelId {
        match self {
            Self::Message { channel, .. } => channel,
        }
    }

    /// The text this event carries.
    pub fn text(&self) -> &str {
        match self {
            Self::Message { text, .. } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> ChatEvent {
        serde_json::from_str(json).expect("valid event json")
    }

    #[test]
    fn test_plain_message_accessors() {
        let event = parse(
            r#"{"type":"message","channel":"C1","user":"U1","text":"hello","ts":"100.1"}"#,
        );

        assert_eq!(event.text(), Some("hello"));
        assert_eq!(event.sender(), Some(&UserId::new("U1")));
        assert_eq!(event.channel(), Some(&ChannelId::new("C1")));
        assert_eq!(event.timestamp(), Some("100.1"));
    }

    #[test]
    fn test_edited_message_uses_new_body() {
        let event = parse(
            r#"{"type":"message","channel":"C1","ts":"100.2","subtype":"message_changed",
                "message":{"user":"U2","text":"edited"}}"#,
        );

        assert_eq!(event.text(), Some("edited"));
        assert_eq!(event.sender(), Some(&UserId::new("U2")));
    }

    #[test]
    fn test_message_without_timestamp_has_no_text() {
        let event = parse(r#"{"type":"message","channel":"C1","user":"U1","text":"hi"}"#);

        assert_eq!(event.text(), None);
        // The sender is still known even though the text is not usable.
        assert_eq!(event.sender(), Some(&UserId::new("U1")));
    }

    #[test]
    fn test_unknown_event_type_decodes_to_other() {
        let event = parse(r#"{"type":"user_typing","channel":"C1","user":"U1"}"#);

        assert_eq!(event, ChatEvent::Other);
        assert!(event.is_ephemeral());
        assert_eq!(event.text(), None);
        assert_eq!(event.channel(), None);
    }

    #[test]
    fn test_hello_carries_directory() {
        let event = parse(
            r#"{"type":"hello","users":[{"id":"U1","name":"alice"},{"id":"B1","name":"helper","is_bot":true}],
                "channels":[{"id":"C1","name":"general"}]}"#,
        );

        let ChatEvent::Hello { users, channels } = event else {
            panic!("expected hello");
        };
        assert_eq!(users.len(), 2);
        assert!(!users[0].is_bot);
        assert!(users[1].is_bot);
        assert_eq!(channels[0].name, "general");
    }

    #[test]
    fn test_outbound_message_json_shape() {
        let event = OutboundEvent::message(ChannelId::new("C9"), "`map`");

        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "message");
        assert_eq!(json["channel"], "C9");
        assert_eq!(json["text"], "`map`");
        assert_eq!(event.text(), "`map`");
    }

    #[test]
    fn test_ids_display_as_raw_string() {
        assert_eq!(UserId::new("U7").to_string(), "U7");
        assert_eq!(ChannelId::new("C7").to_string(), "C7");
    }
}
