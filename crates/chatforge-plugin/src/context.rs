//! What a plugin can see and do while handling one step.
//!
//! Plugins never touch the connection. Everything they want to say is
//! queued in an [`Outbox`] that the bot flushes once the step completes,
//! which keeps plugin hooks synchronous and free of await points.

use chatforge_directory::Directory;
use chatforge_protocol::text::{sendable_text_to_text, server_text_to_sendable_text};
use chatforge_protocol::{ChannelId, ChatEvent, OutboundEvent, UserId};

/// Outbound messages queued during a step.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: Vec<OutboundEvent>,
}

impl Outbox {
    /// Creates an empty outbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues an event.
    pub fn push(&mut self, event: OutboundEvent) {
        self.pending.push(event);
    }

    /// Removes and returns everything queued so far, oldest first.
    pub fn drain(&mut self) -> Vec<OutboundEvent> {
        std::mem::take(&mut self.pending)
    }

    /// Looks at the queue without draining it.
    pub fn pending(&self) -> &[OutboundEvent] {
        &self.pending
    }

    /// Number of queued events.
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` if nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// The services the bot lends to a plugin for the duration of one hook.
///
/// This is the plugin-facing side of the chat platform: name resolution
/// through the [`Directory`], and `say` / `respond` through the [`Outbox`].
pub struct BotContext<'a> {
    directory: &'a Directory,
    outbox: &'a mut Outbox,
    current_channel: Option<ChannelId>,
}

impl<'a> BotContext<'a> {
    /// Creates a context with no current channel (periodic hooks).
    pub fn new(directory: &'a Directory, outbox: &'a mut Outbox) -> Self {
        Self {
            directory,
            outbox,
            current_channel: None,
        }
    }

    /// Sets the channel `respond` replies to.
    pub fn with_channel(mut self, channel: Option<ChannelId>) -> Self {
        self.current_channel = channel;
        self
    }

    /// The channel of the event being handled, if any.
    pub fn current_channel(&self) -> Option<&ChannelId> {
        self.current_channel.as_ref()
    }

    /// Read access to the directory.
    pub fn directory(&self) -> &Directory {
        self.directory
    }

    /// Resolves a display name to a user id.
    pub fn user_id_by_name(&self, name: &str) -> Option<UserId> {
        self.directory.user_id_by_name(name).cloned()
    }

    /// Resolves a user id to its display name.
    pub fn user_name_by_id(&self, id: &UserId) -> Option<String> {
        self.directory.user_name_by_id(id).map(str::to_owned)
    }

    /// Queues `text` (sendable format) for `channel`.
    pub fn say(&mut self, channel: &ChannelId, text: impl Into<String>) {
        self.outbox
            .push(OutboundEvent::message(channel.clone(), text));
    }

    /// Queues `text` for the channel of the event being handled.
    ///
    /// Returns `false` (and drops the text) when there is no such channel.
    pub fn respond(&mut self, text: impl Into<String>) -> bool {
        match self.current_channel.clone() {
            Some(channel) => {
                self.say(&channel, text);
                true
            }
            None => {
                tracing::debug!("respond called outside of a message, dropping");
                false
            }
        }
    }

    /// Returns the event's text as plain text: references resolved to
    /// names, entities unescaped. `None` for non-text events or text the
    /// gateway should never have produced.
    pub fn plain_text(&self, event: &ChatEvent) -> Option<String> {
        let server_text = event.text()?;
        let sendable = match server_text_to_sendable_text(server_text) {
            Ok(sendable) => sendable,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring malformed message text");
                return None;
            }
        };
        Some(sendable_text_to_text(
            &sendable,
            |id| self.directory.user_name_by_id(id).map(str::to_owned),
            |id| self.directory.channel_name_by_id(id).map(str::to_owned),
        ))
    }
}
