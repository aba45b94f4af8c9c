//! Error types for the game.

use chatforge_protocol::UserId;

/// Why a game request could not be carried out.
///
/// None of these are fatal: the plugin turns them into a chat reply or
/// into "not handled" so other plugins get a look at the message.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A start command named someone the directory doesn't know.
    #[error("who's this {0} person")]
    UnknownParticipant(String),

    /// No game is running.
    #[error("no game running")]
    NoActiveGame,

    /// A game is running, but in another channel.
    #[error("the game is running in another channel")]
    WrongChannel,

    /// The sender holds no blob in the running game.
    #[error("{0} is not playing")]
    NotAParticipant(UserId),
}
