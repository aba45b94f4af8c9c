//! Chat gateway protocol for Chatforge.
//!
//! This crate defines the "language" the bot speaks with its chat gateway:
//!
//! - **Types** ([`ChatEvent`], [`OutboundEvent`], [`UserId`], etc.):
//!   the events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events
//!   are converted to/from bytes.
//! - **Text** ([`text`]): conversion between the gateway's escaped
//!   markup and the plain text plugins match against.
//! - **Errors** ([`ProtocolError`]): what can go wrong on the way.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the plugin
//! layer (commands). It doesn't know about connections or games; it only
//! knows how to serialize, deserialize, and clean up chat events.
//!
//! ```text
//! Transport (bytes) → Protocol (ChatEvent) → Plugins (commands)
//! ```

mod codec;
mod error;
pub mod text;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ChannelId, ChannelInfo, ChatEvent, EditedMessage, OutboundEvent,
    UserId, UserInfo,
};
