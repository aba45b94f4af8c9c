//! The game as a bot plugin.

use chatforge_plugin::{BotContext, Plugin};
use chatforge_protocol::text::untag_word;
use chatforge_protocol::{ChannelId, ChatEvent, UserId};
use chatforge_tick::TickGate;
use tracing::debug;

use crate::blob::Direction;
use crate::command::{Action, Command};
use crate::engine::StepOutcome;
use crate::manager::GameManager;
use crate::session::Standing;
use crate::{AgarioConfig, GameError};

/// Plays the game in chat.
///
/// Messages are checked in this order: the start command (from anyone,
/// anywhere), then stop (from anyone in the game's channel), then steering
/// (from participants in the game's channel). Everything else falls
/// through to the next plugin.
#[derive(Debug)]
pub struct AgarioPlugin {
    manager: GameManager,
    gate: TickGate,
}

impl AgarioPlugin {
    pub fn new(config: AgarioConfig) -> Self {
        let gate = TickGate::with_interval(config.tick_interval);
        Self {
            manager: GameManager::new(config),
            gate,
        }
    }

    pub fn manager(&self) -> &GameManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut GameManager {
        &mut self.manager
    }

    fn start_game(
        &mut self,
        ctx: &mut BotContext<'_>,
        sender: &UserId,
        channel: ChannelId,
        names: Vec<String>,
    ) {
        let roster = match resolve_roster(ctx, sender, &names) {
            Ok(roster) => roster,
            Err(e) => {
                debug!(error = %e, "game not started");
                ctx.respond(e.to_string());
                return;
            }
        };

        let session = self.manager.start(channel, roster);
        let announcement = format!(
            "*AGAR.IO GAME STARTED* (players from left to right: {})\nSTARTING MAP: `{}`",
            session.roster_names().join(", "),
            session.render()
        );
        let channel = session.channel().clone();
        ctx.say(&channel, announcement);
    }

    fn steer(
        &mut self,
        channel: &ChannelId,
        sender: &UserId,
        direction: Direction,
        action: Action,
    ) -> Result<(), GameError> {
        let offset = direction.unit() * self.manager.config().action_offset;
        let session = self.manager.session_in(channel)?;
        match action {
            Action::Move => session.set_direction(sender, direction)?,
            Action::Fire => {
                let landed = session.fire(sender, offset)?;
                debug!(player = %sender, ?landed, "fire");
            }
            Action::Split => {
                let created = session.split(sender, offset)?;
                debug!(player = %sender, created, "split");
            }
        }
        Ok(())
    }
}

impl Plugin for AgarioPlugin {
    fn name(&self) -> &'static str {
        "agario"
    }

    fn on_message(&mut self, ctx: &mut BotContext<'_>, event: &ChatEvent) -> bool {
        let (Some(sender), Some(channel)) = (event.sender(), event.channel()) else {
            return false;
        };
        let Some(text) = ctx.plain_text(event) else {
            return false;
        };

        let Some(command) = Command::parse(&text) else {
            return false;
        };

        match command {
            Command::Start { names } => {
                self.start_game(ctx, sender, channel.clone(), names);
                true
            }
            Command::Stop => match self.manager.stop(channel) {
                Ok(standings) => {
                    announce_result(ctx, channel, &standings);
                    true
                }
                Err(e) => {
                    debug!(error = %e, "stop ignored");
                    false
                }
            },
            Command::Steer { direction, action } => {
                let playing = self
                    .manager
                    .session_in(channel)
                    .is_ok_and(|session| session.is_participant(sender));
                if !playing {
                    return false;
                }
                match self.steer(channel, sender, direction, action) {
                    Ok(()) => true,
                    Err(e) => {
                        debug!(error = %e, "steering ignored");
                        false
                    }
                }
            }
        }
    }

    fn on_tick(&mut self, ctx: &mut BotContext<'_>) -> bool {
        if self.gate.poll().is_none() {
            return false;
        }
        let Some(channel) = self.manager.session().map(|s| s.channel().clone()) else {
            return false;
        };
        let Some(outcome) = self.manager.step() else {
            return false;
        };
        match outcome {
            StepOutcome::Continued { map } => ctx.say(&channel, format!("`{map}`")),
            StepOutcome::Finished { standings } => announce_result(ctx, &channel, &standings),
        }
        self.gate.record_tick_end();
        true
    }
}

/// Sender first, then every named player, as `(id, display name)`.
fn resolve_roster(
    ctx: &BotContext<'_>,
    sender: &UserId,
    names: &[String],
) -> Result<Vec<(UserId, String)>, GameError> {
    let sender_name = ctx
        .user_name_by_id(sender)
        .unwrap_or_else(|| sender.to_string());
    let mut roster = vec![(sender.clone(), sender_name)];
    for name in names {
        let id = ctx
            .user_id_by_name(name)
            .ok_or_else(|| GameError::UnknownParticipant(name.clone()))?;
        let display = ctx
            .user_name_by_id(&id)
            .unwrap_or_else(|| name.trim_start_matches('@').to_owned());
        roster.push((id, display));
    }
    Ok(roster)
}

/// Posts the ranking, winner first. Names are untagged so nobody is
/// pinged.
fn announce_result(ctx: &mut BotContext<'_>, channel: &ChannelId, standings: &[Standing]) {
    let Some(winner) = standings.first() else {
        debug!("game ended with nobody left");
        return;
    };
    let mut text = format!("*{} wins!*", untag_word(&winner.name));
    for standing in standings {
        text.push_str(&format!(
            "\n> *{}* has total mass {}",
            untag_word(&standing.name),
            format_mass(standing.total_mass)
        ));
    }
    ctx.say(channel, text);
}

/// Whole masses print without a decimal (`3`), fractional ones as-is.
fn format_mass(mass: f64) -> String {
    mass.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_mass() {
        assert_eq!(format_mass(3.0), "3");
        assert_eq!(format_mass(1.0), "1");
        assert_eq!(format_mass(2.75), "2.75");
        assert_eq!(format_mass(17.5), "17.5");
    }
}
