//! The simulation step.
//!
//! One call to [`GameSession::step`] runs, strictly in order:
//!
//! 1. movement: `position += direction / mass`
//! 2. foraging: every food cell under a blob's span is eaten
//! 3. absorption between blobs of different players
//! 4. elimination of players with no blobs, ending the game below two
//! 5. separation of overlapping blobs of the same player
//! 6. render
//!
//! Distances are measured the short way round the arena, so blobs on
//! either side of the seam touch exactly like blobs anywhere else.

use tracing::{debug, trace};

use crate::arena::Arena;
use crate::blob::{Blob, Player};
use crate::session::{GameSession, Standing};

/// What a step produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The game goes on; `map` is the freshly rendered arena.
    Continued { map: String },
    /// Fewer than two players are left. The session is over.
    Finished { standings: Vec<Standing> },
}

impl GameSession {
    /// Advances the game by one step.
    pub fn step(&mut self) -> StepOutcome {
        let food_mass = self.config().food_mass;
        let capture_ratio = self.config().capture_ratio;
        let size = self.arena().len() as f64;

        {
            let (players, arena) = self.split_mut();
            apply_movement(players);
            let eaten = forage(players, arena, food_mass);
            let absorbed = resolve_absorption(players, size, capture_ratio);
            players.retain(|p| {
                if !p.is_alive() {
                    debug!(player = %p.name, "player eliminated");
                }
                p.is_alive()
            });
            trace!(eaten, absorbed, players = players.len(), "step resolved");
        }

        if self.players().len() < 2 {
            return StepOutcome::Finished {
                standings: self.standings(),
            };
        }

        separate_own_blobs(self.players_mut(), size);
        StepOutcome::Continued { map: self.render() }
    }
}

/// Signed shortest distance from `from` to `to` on a ring of `size`.
fn circular_offset(from: f64, to: f64, size: f64) -> f64 {
    let d = (to - from).rem_euclid(size);
    if d > size / 2.0 { d - size } else { d }
}

fn apply_movement(players: &mut [Player]) {
    for player in players {
        let unit = player.direction.unit();
        if unit == 0.0 {
            continue;
        }
        for blob in &mut player.blobs {
            blob.position += unit / blob.mass;
        }
    }
}

/// Eats every food cell in `[ceil(left), floor(right)]` for each blob.
/// Returns the number of cells eaten.
fn forage(players: &mut [Player], arena: &mut Arena, food_mass: f64) -> usize {
    let mut eaten = 0;
    for player in players {
        for blob in &mut player.blobs {
            let first = blob.left().ceil() as i64;
            let last = blob.right().floor() as i64;
            for index in first..=last {
                if arena.take_food(index) {
                    blob.mass += food_mass;
                    eaten += 1;
                }
            }
        }
    }
    eaten
}

/// Either centre lies inside the other's span.
fn in_contact(a: &Blob, b: &Blob, size: f64) -> bool {
    let distance = circular_offset(a.position, b.position, size).abs();
    distance <= a.mass || distance <= b.mass
}

/// Resolves captures between blobs of different players.
///
/// Every decision uses the masses as they were when the phase began, and
/// a blob that has been captured takes no further part. Removal happens
/// only once all pairs are decided. Returns the number of blobs captured.
fn resolve_absorption(players: &mut [Player], size: f64, capture_ratio: f64) -> usize {
    let mut owners = Vec::new();
    let mut snapshot = Vec::new();
    for (p, player) in players.iter().enumerate() {
        for blob in &player.blobs {
            owners.push(p);
            snapshot.push(*blob);
        }
    }

    let count = snapshot.len();
    let mut absorbed_by: Vec<Option<usize>> = vec![None; count];
    for i in 0..count {
        for j in (i + 1)..count {
            if absorbed_by[i].is_some() {
                break;
            }
            if owners[i] == owners[j] || absorbed_by[j].is_some() {
                continue;
            }
            let (a, b) = (&snapshot[i], &snapshot[j]);
            if !in_contact(a, b, size) {
                continue;
            }
            if a.mass < b.mass * capture_ratio {
                absorbed_by[i] = Some(j);
            } else if b.mass < a.mass * capture_ratio {
                absorbed_by[j] = Some(i);
            }
        }
    }

    // A captor may itself be captured later in the pass; its catch then
    // travels with it to whoever is left standing.
    let mut gained = vec![0.0; count];
    let mut captured = 0;
    for k in 0..count {
        if absorbed_by[k].is_none() {
            continue;
        }
        let mut root = k;
        while let Some(next) = absorbed_by[root] {
            root = next;
        }
        gained[root] += snapshot[k].mass;
        captured += 1;
    }

    let mut offset = 0;
    for player in players.iter_mut() {
        let len = player.blobs.len();
        for (b, blob) in player.blobs.iter_mut().enumerate() {
            blob.mass += gained[offset + b];
        }
        let mut k = offset;
        player.blobs.retain(|_| {
            let keep = absorbed_by[k].is_none();
            k += 1;
            keep
        });
        offset += len;
    }
    captured
}

/// Nudges overlapping blobs of the same player apart.
///
/// For each ordered pair, the first blob is moved by the shift that would
/// make the two spans just touch: rightwards if it is at least as heavy,
/// leftwards otherwise. The first blob's position is read once per outer
/// pass. Three or more blobs piled together may still overlap afterwards.
fn separate_own_blobs(players: &mut [Player], size: f64) {
    for player in players {
        let n = player.blobs.len();
        for i in 0..n {
            let first = player.blobs[i];
            for j in 0..n {
                if i == j {
                    continue;
                }
                let other = player.blobs[j];
                let d = circular_offset(first.position, other.position, size);
                let reach = first.mass + other.mass;
                if d.abs() > reach {
                    continue;
                }
                let amount = (d + reach).min(reach - d);
                if first.mass >= other.mass {
                    player.blobs[i].position += amount;
                } else {
                    player.blobs[i].position -= amount;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AgarioConfig;
    use crate::arena::Cell;
    use crate::blob::Direction;
    use chatforge_protocol::{ChannelId, UserId};

    const EPS: f64 = 1e-9;

    fn player(id: &str, index: usize, blobs: &[(f64, f64)]) -> Player {
        let mut p = Player::new(
            UserId::new(id),
            id.to_lowercase(),
            index,
            Blob::new(blobs[0].0, blobs[0].1),
        );
        p.blobs
            .extend(blobs[1..].iter().map(|&(pos, mass)| Blob::new(pos, mass)));
        p
    }

    fn session(players: Vec<Player>, arena: Arena) -> GameSession {
        GameSession::from_parts(ChannelId::new("C1"), players, arena, &AgarioConfig::default())
    }

    // =====================================================================
    // Geometry
    // =====================================================================

    #[test]
    fn test_circular_offset_takes_short_way() {
        assert_eq!(circular_offset(98.0, 2.0, 100.0), 4.0);
        assert_eq!(circular_offset(2.0, 98.0, 100.0), -4.0);
        assert_eq!(circular_offset(137.0, 35.0, 100.0), -2.0);
        assert_eq!(circular_offset(5.0, 6.0, 100.0), 1.0);
    }

    // =====================================================================
    // Movement and foraging
    // =====================================================================

    #[test]
    fn test_heavier_blobs_move_slower() {
        let mut a = player("A", 0, &[(10.0, 1.0), (30.0, 4.0)]);
        a.direction = Direction::Right;
        let mut b = player("B", 1, &[(60.0, 2.0)]);
        b.direction = Direction::Left;
        let mut players = vec![a, b];

        apply_movement(&mut players);

        assert_eq!(players[0].blobs[0].position, 11.0);
        assert_eq!(players[0].blobs[1].position, 30.25);
        assert_eq!(players[1].blobs[0].position, 59.5);
    }

    #[test]
    fn test_forage_scans_wrapped_span() {
        let mut arena = Arena::from_cells(vec![Cell::Food; 100]);
        let mut players = vec![player("A", 0, &[(137.6, 3.0)])];

        let eaten = forage(&mut players, &mut arena, 0.25);

        // ceil(134.6) ..= floor(140.6)
        assert_eq!(eaten, 6);
        assert_eq!(players[0].blobs[0].mass, 4.5);
        for index in 35..=40 {
            assert_eq!(arena.cell(index), Cell::Empty, "cell {index}");
        }
        assert_eq!(arena.cell(34), Cell::Food);
        assert_eq!(arena.cell(41), Cell::Food);
    }

    #[test]
    fn test_forage_across_the_seam() {
        let mut arena = Arena::empty(100);
        arena.place_food(99.0);
        arena.place_food(0.0);
        arena.place_food(1.0);
        let mut players = vec![player("A", 0, &[(0.2, 1.0)])];

        assert_eq!(forage(&mut players, &mut arena, 0.25), 2);
        assert_eq!(arena.cell(99), Cell::Food);
    }

    // =====================================================================
    // Absorption
    // =====================================================================

    #[test]
    fn test_near_equal_contact_is_not_a_capture() {
        let mut players = vec![player("A", 0, &[(50.0, 10.0)]), player("B", 1, &[(55.0, 8.0)])];

        assert_eq!(resolve_absorption(&mut players, 100.0, 0.8), 0);
        assert_eq!(players[0].blobs[0].mass, 10.0);
        assert_eq!(players[1].blobs[0].mass, 8.0);
    }

    #[test]
    fn test_smaller_blob_is_captured_with_exact_mass() {
        let mut players = vec![player("A", 0, &[(50.0, 10.0)]), player("B", 1, &[(55.0, 7.5)])];

        assert_eq!(resolve_absorption(&mut players, 100.0, 0.8), 1);
        assert_eq!(players[0].blobs[0].mass, 17.5);
        assert!(players[1].blobs.is_empty());
    }

    #[test]
    fn test_capture_works_in_either_pair_order() {
        let mut players = vec![player("A", 0, &[(55.0, 2.0)]), player("B", 1, &[(50.0, 10.0)])];

        resolve_absorption(&mut players, 100.0, 0.8);

        assert!(players[0].blobs.is_empty());
        assert_eq!(players[1].blobs[0].mass, 12.0);
    }

    #[test]
    fn test_no_contact_when_centres_are_outside_spans() {
        let mut players = vec![player("A", 0, &[(50.0, 3.0)]), player("B", 1, &[(54.0, 1.0)])];

        assert_eq!(resolve_absorption(&mut players, 100.0, 0.8), 0);
    }

    #[test]
    fn test_contact_across_the_seam() {
        let mut players = vec![player("A", 0, &[(99.0, 3.0)]), player("B", 1, &[(1.0, 1.0)])];

        assert_eq!(resolve_absorption(&mut players, 100.0, 0.8), 1);
        assert_eq!(players[0].blobs[0].mass, 4.0);
    }

    #[test]
    fn test_same_player_blobs_never_absorb() {
        let mut players = vec![player("A", 0, &[(50.0, 10.0), (51.0, 1.0)])];

        assert_eq!(resolve_absorption(&mut players, 100.0, 0.8), 0);
        assert_eq!(players[0].blobs.len(), 2);
    }

    #[test]
    fn test_decisions_use_masses_from_phase_start() {
        // B (7) and C (5) both touch A (10). B also touches C, but B is
        // captured first and sits out the rest of the pass.
        let mut players = vec![
            player("A", 0, &[(50.0, 10.0)]),
            player("B", 1, &[(52.0, 7.0)]),
            player("C", 2, &[(54.0, 5.0)]),
        ];

        assert_eq!(resolve_absorption(&mut players, 100.0, 0.8), 2);
        assert_eq!(players[0].blobs[0].mass, 22.0);
        assert!(players[1].blobs.is_empty());
        assert!(players[2].blobs.is_empty());
    }

    #[test]
    fn test_a_captured_captor_passes_its_catch_on() {
        // B (6) captures C (1) first, then A (10) captures B. No mass is
        // lost along the way.
        let mut players = vec![
            player("B", 0, &[(40.0, 6.0)]),
            player("C", 1, &[(44.0, 1.0)]),
            player("A", 2, &[(34.0, 10.0)]),
        ];
        let before: f64 = players.iter().map(Player::total_mass).sum();

        resolve_absorption(&mut players, 100.0, 0.8);

        let after: f64 = players.iter().map(Player::total_mass).sum();
        assert!((before - after).abs() < EPS);
        assert_eq!(players[2].blobs[0].mass, 17.0);
    }

    // =====================================================================
    // Separation
    // =====================================================================

    #[test]
    fn test_separation_nudges_first_blob_of_each_pair() {
        let mut players = vec![player("A", 0, &[(5.0, 2.0), (6.0, 2.0)])];

        separate_own_blobs(&mut players, 100.0);

        assert!((players[0].blobs[0].position - 8.0).abs() < EPS);
        assert!((players[0].blobs[1].position - 8.0).abs() < EPS);
    }

    #[test]
    fn test_lighter_first_blob_moves_left() {
        let mut players = vec![player("A", 0, &[(20.0, 1.0), (21.0, 2.0)])];

        separate_own_blobs(&mut players, 100.0);

        // First pass: d = 1, reach = 3, amount = min(4, 2) = 2, leftwards.
        assert!((players[0].blobs[0].position - 18.0).abs() < EPS);
    }

    #[test]
    fn test_separation_ignores_distant_blobs() {
        let mut players = vec![player("A", 0, &[(10.0, 1.0), (40.0, 1.0)])];

        separate_own_blobs(&mut players, 100.0);

        assert_eq!(players[0].blobs[0].position, 10.0);
        assert_eq!(players[0].blobs[1].position, 40.0);
    }

    // =====================================================================
    // Full step
    // =====================================================================

    #[test]
    fn test_quiet_step_changes_nothing() {
        let mut s = session(
            vec![player("ALICE", 0, &[(2.0, 1.0)]), player("BOB", 1, &[(9.0, 1.0)])],
            Arena::empty(100),
        );

        let outcome = s.step();

        assert!(matches!(outcome, StepOutcome::Continued { .. }));
        assert_eq!(s.players()[0].blobs[0], Blob::new(2.0, 1.0));
        assert_eq!(s.players()[1].blobs[0], Blob::new(9.0, 1.0));
    }

    #[test]
    fn test_step_renders_the_map() {
        let mut s = session(
            vec![player("ALICE", 0, &[(2.0, 1.0)]), player("BOB", 1, &[(9.0, 1.0)])],
            Arena::empty(12),
        );

        let StepOutcome::Continued { map } = s.step() else {
            panic!("game should continue");
        };
        assert_eq!(map, " (1)    (2) ");
    }

    #[test]
    fn test_two_player_game_ends_when_one_is_eaten() {
        let mut s = session(
            vec![player("ALICE", 0, &[(50.0, 10.0)]), player("BOB", 1, &[(52.0, 5.0)])],
            Arena::empty(100),
        );

        let StepOutcome::Finished { standings } = s.step() else {
            panic!("game should be over");
        };

        assert_eq!(standings.len(), 1);
        assert_eq!(standings[0].name, "alice");
        assert_eq!(standings[0].total_mass, 15.0);
        assert_eq!(s.players().len(), 1);
    }

    #[test]
    fn test_eliminated_players_keep_no_entry_and_indices_stay() {
        let mut s = session(
            vec![
                player("ALICE", 0, &[(50.0, 10.0)]),
                player("BOB", 1, &[(52.0, 5.0)]),
                player("CAROL", 2, &[(80.0, 1.0)]),
            ],
            Arena::empty(100),
        );

        assert!(matches!(s.step(), StepOutcome::Continued { .. }));

        let indices: Vec<usize> = s.players().iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert!(!s.is_participant(&UserId::new("BOB")));
        assert!(s.render().contains('3'));
    }

    #[test]
    fn test_mass_only_grows_by_food_eaten() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(99);
        let roster = (0..5)
            .map(|i| (UserId::new(format!("U{i}")), format!("p{i}")))
            .collect();
        let mut s = GameSession::start(ChannelId::new("C1"), roster, &AgarioConfig::default(), &mut rng);

        for _ in 0..200 {
            let ids: Vec<UserId> = s.players().iter().map(|p| p.id.clone()).collect();
            for id in &ids {
                let direction = match rng.random_range(0..3) {
                    0 => Direction::Left,
                    1 => Direction::Stay,
                    _ => Direction::Right,
                };
                s.set_direction(id, direction).unwrap();
            }

            let mass_before = s.total_mass();
            let food_before = s.arena().food_count();
            let outcome = s.step();
            let eaten = (food_before - s.arena().food_count()) as f64;
            assert!((s.total_mass() - (mass_before + eaten * 0.25)).abs() < EPS);

            if matches!(outcome, StepOutcome::Finished { .. }) {
                break;
            }
        }
    }
}
