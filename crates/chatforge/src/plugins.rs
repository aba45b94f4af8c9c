//! The plugins this bot ships with.

use chatforge_agario::{AgarioConfig, AgarioPlugin};
use chatforge_plugin::{BotContext, Plugin, PluginChain, PluginError};
use chatforge_protocol::ChatEvent;

/// Traces every message in a readable form. Never consumes anything, so it
/// sits first in the chain and sees all traffic.
#[derive(Debug, Default)]
pub struct EventLogPlugin {
    seen: u64,
}

impl EventLogPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of messages seen so far.
    pub fn seen(&self) -> u64 {
        self.seen
    }
}

impl Plugin for EventLogPlugin {
    fn name(&self) -> &'static str {
        "event_log"
    }

    fn on_message(&mut self, ctx: &mut BotContext<'_>, event: &ChatEvent) -> bool {
        let Some(text) = ctx.plain_text(event) else {
            return false;
        };
        self.seen += 1;
        let directory = ctx.directory();
        let channel = event
            .channel()
            .and_then(|id| directory.channel_name_by_id(id))
            .unwrap_or("?");
        let user = event
            .sender()
            .and_then(|id| directory.user_name_by_id(id))
            .unwrap_or("?");
        tracing::debug!(ts = event.timestamp(), "#{channel} | @{user}: {text}");
        false
    }
}

/// Every plugin the bot can run. A closed set, so the chain dispatches
/// without boxing.
#[derive(Debug)]
pub enum BuiltinPlugin {
    EventLog(EventLogPlugin),
    Agario(Box<AgarioPlugin>),
}

impl Plugin for BuiltinPlugin {
    fn name(&self) -> &'static str {
        match self {
            Self::EventLog(p) => p.name(),
            Self::Agario(p) => p.name(),
        }
    }

    fn on_message(&mut self, ctx: &mut BotContext<'_>, event: &ChatEvent) -> bool {
        match self {
            Self::EventLog(p) => p.on_message(ctx, event),
            Self::Agario(p) => p.on_message(ctx, event),
        }
    }

    fn on_tick(&mut self, ctx: &mut BotContext<'_>) -> bool {
        match self {
            Self::EventLog(p) => p.on_tick(ctx),
            Self::Agario(p) => p.on_tick(ctx),
        }
    }
}

/// The default chain: the event log first, then the game.
///
/// # Errors
///
/// Returns [`PluginError::Duplicate`] only if two builtins share a name.
pub fn builtin_chain(agario: AgarioConfig) -> Result<PluginChain<BuiltinPlugin>, PluginError> {
    let mut chain = PluginChain::new();
    chain.register(BuiltinPlugin::EventLog(EventLogPlugin::new()))?;
    chain.register(BuiltinPlugin::Agario(Box::new(AgarioPlugin::new(agario))))?;
    Ok(chain)
}
