//! Owns the single game a bot can run.

use chatforge_protocol::{ChannelId, UserId};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use crate::engine::StepOutcome;
use crate::session::{GameSession, Standing};
use crate::{AgarioConfig, GameError};

/// At most one [`GameSession`] at a time, plus the RNG used to set games
/// up. The game is global to the bot, not per channel.
#[derive(Debug)]
pub struct GameManager {
    config: AgarioConfig,
    rng: StdRng,
    session: Option<GameSession>,
}

impl GameManager {
    pub fn new(config: AgarioConfig) -> Self {
        let config = config.validated();
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            config,
            rng,
            session: None,
        }
    }

    pub fn config(&self) -> &AgarioConfig {
        &self.config
    }

    pub fn session(&self) -> Option<&GameSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut GameSession> {
        self.session.as_mut()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Starts a game in `channel`. A game already running anywhere is
    /// discarded without a ranking.
    pub fn start(&mut self, channel: ChannelId, roster: Vec<(UserId, String)>) -> &GameSession {
        if let Some(old) = self.session.take() {
            warn!(
                old_channel = %old.channel(),
                new_channel = %channel,
                "replacing running game"
            );
        }
        let session = GameSession::start(channel, roster, &self.config, &mut self.rng);
        info!(
            channel = %session.channel(),
            players = ?session.roster_names(),
            "game started"
        );
        self.session.insert(session)
    }

    /// Installs a prepared session, returning the one it replaces.
    pub fn replace_session(&mut self, session: GameSession) -> Option<GameSession> {
        self.session.replace(session)
    }

    /// The running game, if it is in `channel`.
    ///
    /// # Errors
    ///
    /// [`GameError::NoActiveGame`] or [`GameError::WrongChannel`].
    pub fn session_in(&mut self, channel: &ChannelId) -> Result<&mut GameSession, GameError> {
        let session = self.session.as_mut().ok_or(GameError::NoActiveGame)?;
        if session.channel() != channel {
            return Err(GameError::WrongChannel);
        }
        Ok(session)
    }

    /// Ends the game in `channel` and returns the final standings.
    ///
    /// # Errors
    ///
    /// [`GameError::NoActiveGame`] or [`GameError::WrongChannel`]; the
    /// running game, if any, is left untouched.
    pub fn stop(&mut self, channel: &ChannelId) -> Result<Vec<Standing>, GameError> {
        let standings = self.session_in(channel)?.standings();
        self.session = None;
        info!(%channel, "game stopped");
        Ok(standings)
    }

    /// Steps the running game, if any. A finished game is dropped.
    pub fn step(&mut self) -> Option<StepOutcome> {
        let outcome = self.session.as_mut()?.step();
        if let StepOutcome::Finished { standings } = &outcome {
            info!(
                winner = standings.first().map(|s| s.name.as_str()),
                "game finished"
            );
            self.session = None;
        }
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(names: &[&str]) -> Vec<(UserId, String)> {
        names
            .iter()
            .map(|n| (UserId::new(n.to_uppercase()), n.to_string()))
            .collect()
    }

    fn manager() -> GameManager {
        GameManager::new(AgarioConfig::default().with_seed(5))
    }

    #[test]
    fn test_new_manager_is_idle() {
        let mut m = manager();
        assert!(!m.is_active());
        assert!(m.step().is_none());
        assert!(matches!(
            m.stop(&ChannelId::new("C1")),
            Err(GameError::NoActiveGame)
        ));
    }

    #[test]
    fn test_start_then_stop_ranks_players() {
        let mut m = manager();
        m.start(ChannelId::new("C1"), roster(&["alice", "bob"]));
        assert!(m.is_active());

        let standings = m.stop(&ChannelId::new("C1")).unwrap();

        assert_eq!(standings.len(), 2);
        assert!(standings[0].total_mass >= standings[1].total_mass);
        assert!(!m.is_active());
    }

    #[test]
    fn test_stop_in_wrong_channel_keeps_game() {
        let mut m = manager();
        m.start(ChannelId::new("C1"), roster(&["alice", "bob"]));

        assert!(matches!(
            m.stop(&ChannelId::new("C2")),
            Err(GameError::WrongChannel)
        ));
        assert!(m.is_active());
    }

    #[test]
    fn test_start_replaces_running_game() {
        let mut m = manager();
        m.start(ChannelId::new("C1"), roster(&["alice", "bob"]));
        m.start(ChannelId::new("C2"), roster(&["carol", "dave", "erin"]));

        let session = m.session().unwrap();
        assert_eq!(session.channel(), &ChannelId::new("C2"));
        assert_eq!(session.players().len(), 3);
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = manager();
        let mut b = manager();
        let ra = a.start(ChannelId::new("C1"), roster(&["alice", "bob", "carol"])).render();
        let rb = b.start(ChannelId::new("C1"), roster(&["alice", "bob", "carol"])).render();
        assert_eq!(ra, rb);
    }

    #[test]
    fn test_solo_game_finishes_on_first_step() {
        let mut m = manager();
        m.start(ChannelId::new("C1"), roster(&["alice"]));

        let outcome = m.step().unwrap();

        let StepOutcome::Finished { standings } = outcome else {
            panic!("a lone player cannot keep a game going");
        };
        assert_eq!(standings[0].name, "alice");
        assert!(!m.is_active());
    }
}
