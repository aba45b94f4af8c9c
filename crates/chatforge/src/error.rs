//! Unified error type for the bot.

use chatforge_plugin::PluginError;
use chatforge_protocol::ProtocolError;
use chatforge_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// A transport-level error (connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, malformed text).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A plugin chain could not be assembled.
    #[error(transparent)]
    Plugin(#[from] PluginError),

    /// The connection failed with its own error type.
    #[error("connection error: {0}")]
    Connection(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed("gone".into());
        let bot_err: BotError = err.into();
        assert!(matches!(bot_err, BotError::Transport(_)));
        assert!(bot_err.to_string().contains("gone"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidMessage("bad".into());
        let bot_err: BotError = err.into();
        assert!(matches!(bot_err, BotError::Protocol(_)));
    }

    #[test]
    fn test_from_plugin_error() {
        let bot_err: BotError = PluginError::Duplicate("agario").into();
        assert!(matches!(bot_err, BotError::Plugin(_)));
        assert!(bot_err.to_string().contains("agario"));
    }
}
