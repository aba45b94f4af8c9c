//! Players and the blobs they own.

use chatforge_protocol::UserId;

/// A single mass-bearing body. Its span is `[position - mass, position + mass]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub position: f64,
    pub mass: f64,
}

impl Blob {
    pub fn new(position: f64, mass: f64) -> Self {
        Self { position, mass }
    }

    /// Left edge of the span.
    pub fn left(&self) -> f64 {
        self.position - self.mass
    }

    /// Right edge of the span.
    pub fn right(&self) -> f64 {
        self.position + self.mass
    }
}

/// A player's persistent steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Left,
    #[default]
    Stay,
    Right,
}

impl Direction {
    /// Signed unit: -1, 0 or 1.
    pub fn unit(self) -> f64 {
        match self {
            Direction::Left => -1.0,
            Direction::Stay => 0.0,
            Direction::Right => 1.0,
        }
    }
}

/// One participant of a session.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: UserId,
    /// Display name, as shown in announcements.
    pub name: String,
    /// 0-based roster position, fixed for the whole session.
    pub index: usize,
    pub direction: Direction,
    pub blobs: Vec<Blob>,
}

impl Player {
    /// A player holding a single blob.
    pub fn new(id: UserId, name: impl Into<String>, index: usize, blob: Blob) -> Self {
        Self {
            id,
            name: name.into(),
            index,
            direction: Direction::Stay,
            blobs: vec![blob],
        }
    }

    /// Sum of all blob masses.
    pub fn total_mass(&self) -> f64 {
        self.blobs.iter().map(|b| b.mass).sum()
    }

    /// Still holds at least one blob.
    pub fn is_alive(&self) -> bool {
        !self.blobs.is_empty()
    }

    /// The heaviest blob; the earliest one on ties.
    pub fn largest_blob_mut(&mut self) -> Option<&mut Blob> {
        let mut best: Option<usize> = None;
        for (i, blob) in self.blobs.iter().enumerate() {
            if best.is_none_or(|b| blob.mass > self.blobs[b].mass) {
                best = Some(i);
            }
        }
        best.map(|i| &mut self.blobs[i])
    }
}
