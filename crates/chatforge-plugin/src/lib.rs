//! Plugin dispatch for Chatforge.
//!
//! Every feature of the bot is a plugin. The bot owns one ordered
//! [`PluginChain`] and offers each inbound event (and each poll of the
//! periodic hook) to its plugins in registration order; the first plugin
//! that reports "handled" stops the walk.
//!
//! # Key types
//!
//! - [`Plugin`]: the capability trait plugins implement
//! - [`PluginChain`]: ordered, short-circuiting dispatch
//! - [`BotContext`]: what a plugin may do while handling one step
//! - [`Outbox`]: messages queued during a step, flushed by the bot

mod chain;
mod context;
mod error;
mod plugin;

pub use chain::PluginChain;
pub use context::{BotContext, Outbox};
pub use error::PluginError;
pub use plugin::Plugin;
