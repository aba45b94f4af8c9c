//! # Chatforge
//!
//! A chat bot built from an ordered chain of plugins.
//!
//! The bot connects to a chat gateway (or, without one, to your terminal),
//! keeps a directory of users and channels, and offers every inbound event
//! to its plugins in order until one consumes it. A periodic hook lets
//! plugins act on their own, which is how the bundled agar.io game
//! advances its arena.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use chatforge::prelude::*;
//!
//! # async fn run() -> Result<(), BotError> {
//! let config = BotConfig::load_or_default();
//! let plugins = builtin_chain(config.agario.clone())?;
//! let conn = ConsoleConnection::stdio(&config.console_users, JsonCodec);
//! let mut bot = Bot::new(conn, JsonCodec, plugins, &config);
//! bot.run().await?;
//! bot.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod bot;
pub mod config;
pub mod console;
pub mod error;
pub mod plugins;

pub use bot::Bot;
pub use config::BotConfig;
pub use console::ConsoleConnection;
pub use error::BotError;
pub use plugins::{BuiltinPlugin, EventLogPlugin, builtin_chain};

pub mod prelude {
    pub use crate::{
        Bot, BotConfig, BotError, BuiltinPlugin, ConsoleConnection, EventLogPlugin, builtin_chain,
    };
    pub use chatforge_agario::{AgarioConfig, AgarioPlugin};
    pub use chatforge_directory::Directory;
    pub use chatforge_plugin::{BotContext, Outbox, Plugin, PluginChain};
    pub use chatforge_protocol::{ChannelId, ChatEvent, Codec, JsonCodec, OutboundEvent, UserId};
    pub use chatforge_transport::{Connection, WebSocketConnection};
}
