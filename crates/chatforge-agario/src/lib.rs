//! A one-dimensional mass-absorption arena game, played in a chat channel.
//!
//! Players steer blobs around a circular strip of cells by posting `<`,
//! `v` or `>`. Blobs eat food to grow, swallow much smaller blobs of other
//! players, and can fire food (`>-`) or split in two (`>/`). The last
//! player holding a blob wins; `stop` ends the game early and ranks
//! everyone by total mass.
//!
//! # Layers
//!
//! - [`GameManager`] owns at most one [`GameSession`] and its RNG.
//! - [`GameSession`] holds the roster, the blobs and the [`Arena`]; its
//!   [`step`](GameSession::step) advances the simulation.
//! - [`command`] parses chat text into [`Command`]s.
//! - [`AgarioPlugin`] wires all of it into the bot's plugin chain, with a
//!   [`TickGate`](chatforge_tick::TickGate) spacing steps out.

pub mod arena;
pub mod blob;
pub mod command;
mod config;
mod engine;
mod error;
mod manager;
mod plugin;
mod session;

pub use arena::{Arena, Cell};
pub use blob::{Blob, Direction, Player};
pub use command::{Action, Command};
pub use config::AgarioConfig;
pub use engine::StepOutcome;
pub use error::GameError;
pub use manager::GameManager;
pub use plugin::AgarioPlugin;
pub use session::{GameSession, Standing};
