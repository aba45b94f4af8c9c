//! The `Plugin` trait, the main extension point of the bot.
//!
//! The framework calls these methods at the right time; the plugin just
//! decides whether the event is for it.

use chatforge_protocol::ChatEvent;

use crate::BotContext;

/// The capability every plugin provides.
///
/// Both hooks are synchronous and run to completion: a plugin never yields
/// in the middle of mutating its own state, so plugin state needs no
/// locking even though the bot itself is async.
pub trait Plugin {
    /// Stable name used for logging and duplicate detection.
    fn name(&self) -> &'static str;

    /// Offers an inbound event to the plugin.
    ///
    /// Returns `true` if the plugin consumed the event; later plugins in
    /// the chain will not see it.
    fn on_message(&mut self, ctx: &mut BotContext<'_>, event: &ChatEvent) -> bool;

    /// Periodic hook, called on every poll of the bot loop.
    ///
    /// Returns `true` if the plugin did periodic work this poll, which
    /// short-circuits the remaining periodic hooks. Default: no-op.
    fn on_tick(&mut self, _ctx: &mut BotContext<'_>) -> bool {
        false
    }
}
