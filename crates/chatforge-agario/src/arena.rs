//! The circular strip of cells the game is played on.

use rand::Rng;

/// What a single arena cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Food,
}

/// A fixed-size ring of cells. Every index is taken modulo the size, so
/// callers can pass positions that have drifted arbitrarily far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arena {
    cells: Vec<Cell>,
}

impl Arena {
    /// An arena of `size` empty cells.
    pub fn empty(size: usize) -> Self {
        Self {
            cells: vec![Cell::Empty; size.max(1)],
        }
    }

    /// An arena where each cell independently holds food with
    /// `food_probability` (expected in `0.0..=1.0`).
    pub fn generate<R: Rng + ?Sized>(size: usize, food_probability: f64, rng: &mut R) -> Self {
        let food_probability = food_probability.clamp(0.0, 1.0);
        let cells = (0..size.max(1))
            .map(|_| {
                if rng.random_bool(food_probability) {
                    Cell::Food
                } else {
                    Cell::Empty
                }
            })
            .collect();
        Self { cells }
    }

    /// Builds an arena from explicit cells. An empty vector yields a
    /// single empty cell.
    pub fn from_cells(cells: Vec<Cell>) -> Self {
        if cells.is_empty() {
            return Self::empty(1);
        }
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; an arena has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Maps any integer index onto `0..len`.
    pub fn wrap(&self, index: i64) -> usize {
        index.rem_euclid(self.cells.len() as i64) as usize
    }

    /// The cell a real-valued position falls on: rounded half-to-even,
    /// then wrapped.
    pub fn index_of(&self, position: f64) -> usize {
        self.wrap(position.round_ties_even() as i64)
    }

    pub fn cell(&self, index: i64) -> Cell {
        self.cells[self.wrap(index)]
    }

    /// Clears the cell at `index` if it holds food. Returns whether food
    /// was there.
    pub fn take_food(&mut self, index: i64) -> bool {
        let index = self.wrap(index);
        let slot = &mut self.cells[index];
        if *slot == Cell::Food {
            *slot = Cell::Empty;
            true
        } else {
            false
        }
    }

    /// Puts food on the cell under `position`. Returns the cell index.
    pub fn place_food(&mut self, position: f64) -> usize {
        let index = self.index_of(position);
        self.cells[index] = Cell::Food;
        index
    }

    pub fn food_count(&self) -> usize {
        self.cells.iter().filter(|c| **c == Cell::Food).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_wrap_handles_negative_and_large_indices() {
        let arena = Arena::empty(100);
        assert_eq!(arena.wrap(-1), 99);
        assert_eq!(arena.wrap(137), 37);
        assert_eq!(arena.wrap(-250), 50);
        assert_eq!(arena.wrap(100), 0);
    }

    #[test]
    fn test_index_of_rounds_half_to_even() {
        let arena = Arena::empty(100);
        assert_eq!(arena.index_of(2.5), 2);
        assert_eq!(arena.index_of(3.5), 4);
        assert_eq!(arena.index_of(99.6), 0);
        assert_eq!(arena.index_of(-0.4), 0);
        assert_eq!(arena.index_of(-0.6), 99);
    }

    #[test]
    fn test_take_food_clears_once() {
        let mut arena = Arena::empty(10);
        arena.place_food(13.2);
        assert_eq!(arena.cell(3), Cell::Food);

        assert!(arena.take_food(-7));
        assert!(!arena.take_food(3));
        assert_eq!(arena.food_count(), 0);
    }

    #[test]
    fn test_generate_respects_probability_extremes() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(Arena::generate(50, 1.0, &mut rng).food_count(), 50);
        assert_eq!(Arena::generate(50, 0.0, &mut rng).food_count(), 0);
    }

    #[test]
    fn test_generate_is_deterministic_for_a_seed() {
        let a = Arena::generate(100, 0.3, &mut StdRng::seed_from_u64(42));
        let b = Arena::generate(100, 0.3, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_zero_size_becomes_one_cell() {
        assert_eq!(Arena::empty(0).len(), 1);
        assert_eq!(Arena::from_cells(Vec::new()).len(), 1);
    }
}
