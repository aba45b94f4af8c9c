//! User and channel directory for Chatforge.
//!
//! Plugins address people by name ("pls agar me bob"), the gateway
//! addresses them by id. This crate keeps the two in sync:
//!
//! 1. **Ingestion**: [`Directory::apply`] folds `hello`, `user_change`
//!    and `channel_created` events into the registry.
//! 2. **Resolution**: name → id and id → name lookups for users and
//!    channels, case-insensitive on names.
//! 3. **Bot detection**: the bot loop ignores messages from bot accounts.
//!
//! # How it fits in the stack
//!
//! ```text
//! Plugin Layer (above)  ← resolves participants through the directory
//!     ↕
//! Directory (this crate)  ← knows every user and channel by id and name
//!     ↕
//! Protocol Layer (below)  ← provides UserId, UserInfo, ChatEvent
//! ```

mod directory;

pub use directory::Directory;
