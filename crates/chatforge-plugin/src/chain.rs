//! Ordered, short-circuiting plugin dispatch.

use chatforge_protocol::ChatEvent;
use tracing::{debug, info};

use crate::{BotContext, Plugin, PluginError};

/// The bot's plugins, in registration order.
///
/// Generic over the plugin type so the bot can hold a closed set of
/// plugins in an enum and dispatch without boxing.
#[derive(Debug)]
pub struct PluginChain<P> {
    plugins: Vec<P>,
}

impl<P> Default for PluginChain<P> {
    fn default() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }
}

impl<P: Plugin> PluginChain<P> {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin to the end of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Duplicate`] if a plugin with the same name is
    /// already registered.
    pub fn register(&mut self, plugin: P) -> Result<(), PluginError> {
        let name = plugin.name();
        if self.plugins.iter().any(|p| p.name() == name) {
            return Err(PluginError::Duplicate(name));
        }
        info!(plugin = name, position = self.plugins.len(), "plugin registered");
        self.plugins.push(plugin);
        Ok(())
    }

    /// Offers `event` to each plugin in order until one consumes it.
    ///
    /// Returns the name of the consuming plugin, if any.
    pub fn dispatch_message(
        &mut self,
        ctx: &mut BotContext<'_>,
        event: &ChatEvent,
    ) -> Option<&'static str> {
        for plugin in &mut self.plugins {
            if plugin.on_message(ctx, event) {
                return Some(plugin.name());
            }
        }
        None
    }

    /// Runs each plugin's periodic hook in order until one reports work.
    pub fn dispatch_tick(&mut self, ctx: &mut BotContext<'_>) -> Option<&'static str> {
        for plugin in &mut self.plugins {
            if plugin.on_tick(ctx) {
                debug!(plugin = plugin.name(), "periodic work done");
                return Some(plugin.name());
            }
        }
        None
    }

    /// Names of registered plugins, in dispatch order.
    pub fn names(&self) -> Vec<&'static str> {
        self.plugins.iter().map(Plugin::name).collect()
    }

    /// Mutable access to a plugin by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut P> {
        self.plugins.iter_mut().find(|p| p.name() == name)
    }

    /// Number of registered plugins.
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if no plugins are registered.
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
