//! The bot's single cooperative loop.
//!
//! One task owns everything: the connection, the directory and every
//! plugin. Each inbound event and each periodic poll is handled to
//! completion before the next one starts, and whatever the plugins queued
//! is flushed afterwards. Plugin state therefore needs no locking.

use std::collections::VecDeque;
use std::time::Duration;

use chatforge_directory::Directory;
use chatforge_plugin::{BotContext, Outbox, Plugin, PluginChain};
use chatforge_protocol::{ChannelId, ChatEvent, Codec};
use chatforge_transport::Connection;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::{BotConfig, BotError};

/// A bot bound to one connection.
pub struct Bot<T, C, P> {
    conn: T,
    codec: C,
    directory: Directory,
    plugins: PluginChain<P>,
    outbox: Outbox,
    recent_events: VecDeque<ChatEvent>,
    recent_capacity: usize,
    last_channel: Option<ChannelId>,
    last_timestamp: Option<String>,
    poll_interval: Duration,
}

impl<T, C, P> Bot<T, C, P>
where
    T: Connection,
    C: Codec,
    P: Plugin,
{
    pub fn new(conn: T, codec: C, plugins: PluginChain<P>, config: &BotConfig) -> Self {
        Self {
            conn,
            codec,
            directory: Directory::new(),
            plugins,
            outbox: Outbox::new(),
            recent_events: VecDeque::with_capacity(config.recent_events.min(4096)),
            recent_capacity: config.recent_events,
            last_channel: None,
            last_timestamp: None,
            poll_interval: config.poll_interval,
        }
    }

    pub fn directory(&self) -> &Directory {
        &self.directory
    }

    pub fn plugins(&self) -> &PluginChain<P> {
        &self.plugins
    }

    pub fn plugins_mut(&mut self) -> &mut PluginChain<P> {
        &mut self.plugins
    }

    /// The most recent non-ephemeral events, oldest first.
    pub fn recent_events(&self) -> &VecDeque<ChatEvent> {
        &self.recent_events
    }

    /// Channel of the most recent event that had one.
    pub fn last_channel(&self) -> Option<&ChannelId> {
        self.last_channel.as_ref()
    }

    /// Timestamp of the most recent event that had one.
    pub fn last_timestamp(&self) -> Option<&str> {
        self.last_timestamp.as_deref()
    }

    /// Runs until the connection closes.
    ///
    /// # Errors
    ///
    /// Fails on the first connection error or outbound encode error.
    /// Undecodable inbound frames are logged and skipped.
    pub async fn run(&mut self) -> Result<(), BotError> {
        info!(conn = %self.conn.id(), plugins = ?self.plugins.names(), "bot running");

        let mut poll = tokio::time::interval(self.poll_interval);
        poll.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                received = self.conn.recv() => {
                    match received.map_err(|e| BotError::Connection(e.to_string()))? {
                        Some(data) => self.handle_frame(&data),
                        None => {
                            info!(conn = %self.conn.id(), "connection closed");
                            break;
                        }
                    }
                }
                _ = poll.tick() => {
                    self.poll_plugins();
                }
            }
            self.flush().await?;
        }
        Ok(())
    }

    /// Decodes one inbound frame and handles it.
    pub fn handle_frame(&mut self, data: &[u8]) {
        match self.codec.decode::<ChatEvent>(data) {
            Ok(event) => {
                self.handle_event(event);
            }
            Err(e) => warn!(error = %e, "failed to decode inbound event"),
        }
    }

    /// Handles one inbound event: bookkeeping, then plugin dispatch.
    ///
    /// Returns the name of the plugin that consumed it, if any.
    pub fn handle_event(&mut self, event: ChatEvent) -> Option<&'static str> {
        if let Some(ts) = event.timestamp() {
            self.last_timestamp = Some(ts.to_owned());
        }
        if let Some(channel) = event.channel() {
            self.last_channel = Some(channel.clone());
        }
        if self.directory.apply(&event) {
            debug!(
                users = self.directory.user_count(),
                channels = self.directory.channel_count(),
                "directory updated"
            );
        }

        if let Some(sender) = event.sender() {
            if self.directory.is_bot(sender) {
                debug!(%sender, "ignoring bot message");
                return None;
            }
        }

        if !event.is_ephemeral() && self.recent_capacity > 0 {
            if self.recent_events.len() == self.recent_capacity {
                self.recent_events.pop_front();
            }
            self.recent_events.push_back(event.clone());
        }

        let mut ctx = BotContext::new(&self.directory, &mut self.outbox)
            .with_channel(event.channel().cloned());
        let handled = self.plugins.dispatch_message(&mut ctx, &event);
        if let Some(plugin) = handled {
            info!(plugin, ts = event.timestamp(), "message handled");
        }
        handled
    }

    /// Runs the periodic hooks once. `respond` from a hook targets the
    /// channel that most recently received a message.
    pub fn poll_plugins(&mut self) -> Option<&'static str> {
        let mut ctx = BotContext::new(&self.directory, &mut self.outbox)
            .with_channel(self.last_channel.clone());
        self.plugins.dispatch_tick(&mut ctx)
    }

    /// Sends everything the plugins queued, in order.
    ///
    /// # Errors
    ///
    /// Stops at the first encode or send failure.
    pub async fn flush(&mut self) -> Result<(), BotError> {
        for event in self.outbox.drain() {
            let data = self.codec.encode(&event)?;
            self.conn
                .send(&data)
                .await
                .map_err(|e| BotError::Connection(e.to_string()))?;
        }
        Ok(())
    }

    /// Closes the connection.
    pub async fn shutdown(self) {
        if let Err(e) = self.conn.close().await {
            debug!(error = %e, "error while closing connection");
        }
    }
}
