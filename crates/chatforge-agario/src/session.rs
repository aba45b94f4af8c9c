//! One game in progress.
//!
//! A [`GameSession`] owns the roster, every blob and the arena. The
//! simulation step lives in [`crate::engine`]; this module covers setup,
//! player actions and the read-only views (standings, render).

use chatforge_protocol::{ChannelId, UserId};
use rand::Rng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::arena::{Arena, Cell};
use crate::blob::{Blob, Direction, Player};
use crate::{AgarioConfig, GameError};

/// A player's final (or current) total mass.
#[derive(Debug, Clone, PartialEq)]
pub struct Standing {
    pub id: UserId,
    pub name: String,
    pub total_mass: f64,
}

/// The full state of a running game.
#[derive(Debug, Clone)]
pub struct GameSession {
    channel: ChannelId,
    /// Surviving players, in roster order.
    players: Vec<Player>,
    arena: Arena,
    config: AgarioConfig,
}

impl GameSession {
    /// Sets up a new game in `channel`.
    ///
    /// The roster is deduplicated by id (first occurrence wins), shuffled,
    /// and laid out left to right: the first blob lands on a random cell in
    /// `spawn_offset`, each following one a random `spawn_gap` further on.
    /// Every blob starts with mass 1.
    pub fn start<R: Rng + ?Sized>(
        channel: ChannelId,
        roster: Vec<(UserId, String)>,
        config: &AgarioConfig,
        rng: &mut R,
    ) -> Self {
        let config = config.clone().validated();

        let mut roster = dedupe_roster(roster);
        roster.shuffle(rng);

        let mut position = rng.random_range(config.spawn_offset.clone());
        let mut players = Vec::with_capacity(roster.len());
        for (index, (id, name)) in roster.into_iter().enumerate() {
            players.push(Player::new(id, name, index, Blob::new(f64::from(position), 1.0)));
            position += rng.random_range(config.spawn_gap.clone());
        }

        let arena = Arena::generate(config.arena_size, config.food_probability, rng);
        debug!(
            %channel,
            players = players.len(),
            food = arena.food_count(),
            "game session created"
        );

        Self {
            channel,
            players,
            arena,
            config,
        }
    }

    /// Assembles a session from explicit state.
    pub fn from_parts(
        channel: ChannelId,
        players: Vec<Player>,
        arena: Arena,
        config: &AgarioConfig,
    ) -> Self {
        Self {
            channel,
            players,
            arena,
            config: config.clone().validated(),
        }
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Surviving players, in roster order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub(crate) fn players_mut(&mut self) -> &mut Vec<Player> {
        &mut self.players
    }

    pub fn player(&self, id: &UserId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    fn player_mut(&mut self, id: &UserId) -> Result<&mut Player, GameError> {
        self.players
            .iter_mut()
            .find(|p| &p.id == id && p.is_alive())
            .ok_or_else(|| GameError::NotAParticipant(id.clone()))
    }

    /// Holds at least one blob in this game.
    pub fn is_participant(&self, id: &UserId) -> bool {
        self.player(id).is_some_and(Player::is_alive)
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub(crate) fn split_mut(&mut self) -> (&mut Vec<Player>, &mut Arena) {
        (&mut self.players, &mut self.arena)
    }

    pub fn config(&self) -> &AgarioConfig {
        &self.config
    }

    /// Mass of every blob in the arena.
    pub fn total_mass(&self) -> f64 {
        self.players.iter().map(Player::total_mass).sum()
    }

    /// Display names in roster order.
    pub fn roster_names(&self) -> Vec<&str> {
        self.players.iter().map(|p| p.name.as_str()).collect()
    }

    /// Sets the direction applied on every following step.
    pub fn set_direction(&mut self, id: &UserId, direction: Direction) -> Result<(), GameError> {
        self.player_mut(id)?.direction = direction;
        Ok(())
    }

    /// Ejects a food pellet from the player's heaviest blob.
    ///
    /// The pellet lands `offset` away from the blob, pushed a further
    /// `mass` outwards so it clears the blob's own span. Costs the blob one
    /// food's worth of mass. Returns the cell the pellet landed on, or
    /// `None` if the blob is too light to fire.
    pub fn fire(&mut self, id: &UserId, offset: f64) -> Result<Option<usize>, GameError> {
        let min_mass = self.config.min_action_mass;
        let food_mass = self.config.food_mass;
        let (players, arena) = self.split_mut();
        let player = players
            .iter_mut()
            .find(|p| &p.id == id && p.is_alive())
            .ok_or_else(|| GameError::NotAParticipant(id.clone()))?;
        let Some(blob) = player.largest_blob_mut() else {
            return Ok(None);
        };
        if blob.mass < min_mass {
            return Ok(None);
        }

        let reach = if offset < 0.0 {
            offset - blob.mass
        } else {
            offset + blob.mass
        };
        blob.mass -= food_mass;
        Ok(Some(arena.place_food(blob.position + reach)))
    }

    /// Splits every blob of the player that is heavy enough.
    ///
    /// The source blob keeps half its mass; a new blob with half of that
    /// appears `offset` away. Lighter blobs are left alone. Returns the
    /// number of blobs created.
    pub fn split(&mut self, id: &UserId, offset: f64) -> Result<usize, GameError> {
        let min_mass = self.config.min_action_mass;
        let player = self.player_mut(id)?;

        let mut spawned = Vec::new();
        for blob in &mut player.blobs {
            if blob.mass >= min_mass {
                blob.mass /= 2.0;
                spawned.push(Blob::new(blob.position + offset, blob.mass / 2.0));
            }
        }
        let created = spawned.len();
        player.blobs.extend(spawned);
        Ok(created)
    }

    /// Players ranked by total mass, heaviest first. Equal masses keep
    /// roster order.
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .players
            .iter()
            .map(|p| Standing {
                id: p.id.clone(),
                name: p.name.clone(),
                total_mass: p.total_mass(),
            })
            .collect();
        standings.sort_by(|a, b| b.total_mass.total_cmp(&a.total_mass));
        standings
    }

    /// Draws the arena as a single line.
    ///
    /// Each blob is drawn as `(`, its player's 1-based roster number and
    /// `)` on the cells under its left edge, centre and right edge. Later
    /// blobs overwrite earlier ones.
    pub fn render(&self) -> String {
        let mut strip: Vec<String> = self
            .arena
            .cells()
            .iter()
            .map(|cell| match cell {
                Cell::Food => self.config.food_glyph.to_string(),
                Cell::Empty => self.config.empty_glyph.to_string(),
            })
            .collect();

        for player in &self.players {
            let label = (player.index + 1).to_string();
            for blob in &player.blobs {
                strip[self.arena.index_of(blob.left())] = "(".to_owned();
                strip[self.arena.index_of(blob.position)] = label.clone();
                strip[self.arena.index_of(blob.right())] = ")".to_owned();
            }
        }
        strip.concat()
    }
}

fn dedupe_roster(roster: Vec<(UserId, String)>) -> Vec<(UserId, String)> {
    let mut unique: Vec<(UserId, String)> = Vec::with_capacity(roster.len());
    for entry in roster {
        if !unique.iter().any(|(id, _)| *id == entry.0) {
            unique.push(entry);
        }
    }
    unique
}
