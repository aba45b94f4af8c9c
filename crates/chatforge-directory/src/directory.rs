//! The directory: every user and channel the bot knows about.
//!
//! # Concurrency note
//!
//! `Directory` is NOT thread-safe by itself; it uses plain `HashMap`s.
//! It is owned by the bot's single polling task and lent to plugins for
//! the duration of one event, so no locking is needed.

use std::collections::HashMap;

use chatforge_protocol::{ChannelId, ChannelInfo, ChatEvent, UserId, UserInfo};

/// Registry of users and channels with name indexes.
///
/// Each id map has a companion index from lower-cased name to id. The
/// index is kept in sync on every insert, so renames never leave a stale
/// name pointing at the renamed entry.
#[derive(Debug, Default)]
pub struct Directory {
    users: HashMap<UserId, UserInfo>,
    user_names: HashMap<String, UserId>,
    channels: HashMap<ChannelId, ChannelInfo>,
    channel_names: HashMap<String, ChannelId>,
}

impl Directory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a gateway event into the directory.
    ///
    /// Returns `true` if the event carried directory data.
    pub fn apply(&mut self, event: &ChatEvent) -> bool {
        match event {
            ChatEvent::Hello { users, channels } => {
                for user in users {
                    self.upsert_user(user.clone());
                }
                for channel in channels {
                    self.upsert_channel(channel.clone());
                }
                tracing::info!(
                    users = self.users.len(),
                    channels = self.channels.len(),
                    "directory loaded"
                );
                true
            }
            ChatEvent::UserChange { user } => {
                self.upsert_user(user.clone());
                true
            }
            ChatEvent::ChannelCreated { channel } => {
                self.upsert_channel(channel.clone());
                true
            }
            _ => false,
        }
    }

    /// Inserts or updates a user, re-indexing their name.
    ///
    /// If another user currently holds the same name, the newest holder
    /// wins the name index.
    pub fn upsert_user(&mut self, user: UserInfo) {
        let key = name_key(&user.name);
        if let Some(previous) = self.users.get(&user.id) {
            let old_key = name_key(&previous.name);
            if self.user_names.get(&old_key) == Some(&user.id) {
                self.user_names.remove(&old_key);
            }
        }
        if let Some(holder) = self.user_names.get(&key) {
            if *holder != user.id {
                tracing::warn!(
                    name = %user.name,
                    previous = %holder,
                    current = %user.id,
                    "user name reassigned"
                );
            }
        }
        self.user_names.insert(key, user.id.clone());
        self.users.insert(user.id.clone(), user);
    }

    /// Inserts or updates a channel, re-indexing its name.
    pub fn upsert_channel(&mut self, channel: ChannelInfo) {
        if let Some(previous) = self.channels.get(&channel.id) {
            let old_key = name_key(&previous.name);
            if self.channel_names.get(&old_key) == Some(&channel.id) {
                self.channel_names.remove(&old_key);
            }
        }
        self.channel_names
            .insert(name_key(&channel.name), channel.id.clone());
        self.channels.insert(channel.id.clone(), channel);
    }

    /// Resolves a user name (optionally prefixed with `@`) to an id.
    pub fn user_id_by_name(&self, name: &str) -> Option<&UserId> {
        let name = name.strip_prefix('@').unwrap_or(name);
        self.user_names.get(&name_key(name))
    }

    /// Resolves a user id to its current display name.
    pub fn user_name_by_id(&self, id: &UserId) -> Option<&str> {
        self.users.get(id).map(|user| user.name.as_str())
    }

    /// Looks up the full record for a user.
    pub fn user(&self, id: &UserId) -> Option<&UserInfo> {
        self.users.get(id)
    }

    /// Returns `true` if `id` belongs to a known bot account.
    pub fn is_bot(&self, id: &UserId) -> bool {
        self.users.get(id).is_some_and(|user| user.is_bot)
    }

    /// Resolves a channel name (optionally prefixed with `#`) to an id.
    pub fn channel_id_by_name(&self, name: &str) -> Option<&ChannelId> {
        let name = name.strip_prefix('#').unwrap_or(name);
        self.channel_names.get(&name_key(name))
    }

    /// Resolves a channel id to its current name.
    pub fn channel_name_by_id(&self, id: &ChannelId) -> Option<&str> {
        self.channels.get(id).map(|channel| channel.name.as_str())
    }

    /// Number of known users.
    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of known channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Returns `true` if nothing has been loaded yet.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.channels.is_empty()
    }
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, name: &str) -> UserInfo {
        UserInfo {
            id: UserId::new(id),
            name: name.to_owned(),
            is_bot: false,
        }
    }

    fn hello() -> ChatEvent {
        ChatEvent::Hello {
            users: vec![
                user("U1", "alice"),
                user("U2", "Bob"),
                UserInfo {
                    id: UserId::new("B1"),
                    name: "chatforge".to_owned(),
                    is_bot: true,
                },
            ],
            channels: vec![ChannelInfo {
                id: ChannelId::new("C1"),
                name: "general".to_owned(),
            }],
        }
    }

    // =====================================================================
    // apply()
    // =====================================================================

    #[test]
    fn test_apply_hello_loads_users_and_channels() {
        let mut dir = Directory::new();
        assert!(dir.is_empty());

        assert!(dir.apply(&hello()));

        assert_eq!(dir.user_count(), 3);
        assert_eq!(dir.channel_count(), 1);
        assert!(!dir.is_empty());
    }

    #[test]
    fn test_apply_ignores_messages() {
        let mut dir = Directory::new();
        let event = ChatEvent::message(ChannelId::new("C1"), UserId::new("U1"), "hi", "1");

        assert!(!dir.apply(&event));
        assert!(dir.is_empty());
    }

    #[test]
    fn test_apply_user_change_renames() {
        let mut dir = Directory::new();
        dir.apply(&hello());

        dir.apply(&ChatEvent::UserChange {
            user: user("U1", "alicia"),
        });

        assert_eq!(dir.user_name_by_id(&UserId::new("U1")), Some("alicia"));
        assert_eq!(dir.user_id_by_name("alicia"), Some(&UserId::new("U1")));
        assert!(dir.user_id_by_name("alice").is_none(), "old name must be unindexed");
    }

    // =====================================================================
    // resolution
    // =====================================================================

    #[test]
    fn test_user_lookup_is_case_insensitive_and_accepts_at_prefix() {
        let mut dir = Directory::new();
        dir.apply(&hello());

        assert_eq!(dir.user_id_by_name("bob"), Some(&UserId::new("U2")));
        assert_eq!(dir.user_id_by_name("@BOB"), Some(&UserId::new("U2")));
        assert_eq!(dir.user_name_by_id(&UserId::new("U2")), Some("Bob"));
        assert!(dir.user_id_by_name("carol").is_none());
    }

    #[test]
    fn test_channel_lookup() {
        let mut dir = Directory::new();
        dir.apply(&hello());

        assert_eq!(dir.channel_id_by_name("#general"), Some(&ChannelId::new("C1")));
        assert_eq!(dir.channel_name_by_id(&ChannelId::new("C1")), Some("general"));
        assert!(dir.channel_name_by_id(&ChannelId::new("C9")).is_none());
    }

    #[test]
    fn test_is_bot() {
        let mut dir = Directory::new();
        dir.apply(&hello());

        assert!(dir.is_bot(&UserId::new("B1")));
        assert!(!dir.is_bot(&UserId::new("U1")));
        assert!(!dir.is_bot(&UserId::new("unknown")));
    }

    #[test]
    fn test_name_reassignment_newest_holder_wins() {
        let mut dir = Directory::new();
        dir.upsert_user(user("U1", "sam"));
        dir.upsert_user(user("U2", "sam"));

        assert_eq!(dir.user_id_by_name("sam"), Some(&UserId::new("U2")));
        // Both records still exist.
        assert_eq!(dir.user_count(), 2);
        assert_eq!(dir.user(&UserId::new("U1")).map(|u| u.name.as_str()), Some("sam"));
    }
}
