//! Bot configuration, read from the environment.

use std::time::Duration;

use chatforge_agario::AgarioConfig;

/// Bot configuration
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Chat gateway WebSocket URL. `None` runs the console debug mode.
    pub gateway_url: Option<String>,
    /// Bearer token sent to the gateway
    pub token: Option<String>,
    /// How often the periodic hooks are polled
    pub poll_interval: Duration,
    /// How many recent non-ephemeral events to keep
    pub recent_events: usize,
    /// Names of the users known to the console debug mode
    pub console_users: Vec<String>,
    /// Game settings
    pub agario: AgarioConfig,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            gateway_url: None,
            token: None,
            poll_interval: Duration::from_millis(100),
            recent_events: 2000,
            console_users: vec!["console".to_owned()],
            agario: AgarioConfig::default(),
        }
    }
}

impl BotConfig {
    /// Load config from environment or use defaults
    pub fn load_or_default() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("CHATFORGE_GATEWAY_URL") {
            if url.trim().is_empty() {
                tracing::warn!("CHATFORGE_GATEWAY_URL is empty, using console mode");
            } else {
                config.gateway_url = Some(url);
            }
        }

        if let Ok(token) = std::env::var("CHATFORGE_TOKEN") {
            config.token = Some(token);
        }

        if let Ok(poll) = std::env::var("CHATFORGE_POLL_MS") {
            if let Ok(parsed) = poll.parse::<u64>() {
                if parsed > 0 {
                    config.poll_interval = Duration::from_millis(parsed);
                } else {
                    tracing::warn!("CHATFORGE_POLL_MS must be > 0, using default");
                }
            } else {
                tracing::warn!("Invalid CHATFORGE_POLL_MS '{}', using default", poll);
            }
        }

        if let Ok(recent) = std::env::var("CHATFORGE_RECENT_EVENTS") {
            if let Ok(parsed) = recent.parse::<usize>() {
                config.recent_events = parsed;
            } else {
                tracing::warn!("Invalid CHATFORGE_RECENT_EVENTS '{}', using default", recent);
            }
        }

        if let Ok(users) = std::env::var("CHATFORGE_CONSOLE_USERS") {
            let names: Vec<String> = users
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_owned)
                .collect();
            if names.is_empty() {
                tracing::warn!("CHATFORGE_CONSOLE_USERS has no names, using default");
            } else {
                config.console_users = names;
            }
        }

        if let Ok(seed) = std::env::var("CHATFORGE_SEED") {
            if let Ok(parsed) = seed.parse::<u64>() {
                config.agario.seed = Some(parsed);
            } else {
                tracing::warn!("Invalid CHATFORGE_SEED '{}', using a random seed", seed);
            }
        }

        config
    }

    /// Whether the bot talks to the console instead of a gateway.
    pub fn console_mode(&self) -> bool {
        self.gateway_url.is_none()
    }
}
