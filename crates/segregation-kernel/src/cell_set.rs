//! Dense indexed set of grid coordinates.
//!
//! Members live in a vector so a uniform draw is a single index; a per-cell
//! slot table maps each coordinate back to its position for O(1) removal.
//! Iteration order depends only on the sequence of inserts and removes, so a
//! seeded draw replays identically.

use rand::Rng;

use crate::grid::Coord;

#[derive(Debug, Clone)]
pub struct CellSet {
    n: usize,
    members: Vec<Coord>,
    /// Position of each cell in `members`, indexed row-major.
    slots: Vec<Option<usize>>,
}

impl CellSet {
    /// Empty set over an `n`×`n` grid.
    pub fn new(n: usize) -> Self {
        Self {
            n,
            members: Vec::new(),
            slots: vec![None; n * n],
        }
    }

    fn slot_index(&self, coord: Coord) -> usize {
        assert!(
            coord.row < self.n && coord.col < self.n,
            "coordinate {} out of range for {}x{} set",
            coord,
            self.n,
            self.n
        );
        coord.row * self.n + coord.col
    }

    /// Insert `coord`. Returns false if it was already present.
    pub fn insert(&mut self, coord: Coord) -> bool {
        let idx = self.slot_index(coord);
        if self.slots[idx].is_some() {
            return false;
        }
        self.slots[idx] = Some(self.members.len());
        self.members.push(coord);
        true
    }

    /// Remove `coord`. Returns false if it was absent.
    pub fn remove(&mut self, coord: Coord) -> bool {
        let idx = self.slot_index(coord);
        let Some(pos) = self.slots[idx].take() else {
            return false;
        };
        self.members.swap_remove(pos);
        if let Some(&moved) = self.members.get(pos) {
            let moved_idx = self.slot_index(moved);
            self.slots[moved_idx] = Some(pos);
        }
        true
    }

    /// Insert or remove so that membership equals `present`.
    pub fn set(&mut self, coord: Coord, present: bool) {
        if present {
            self.insert(coord);
        } else {
            self.remove(coord);
        }
    }

    pub fn contains(&self, coord: Coord) -> bool {
        self.slots[self.slot_index(coord)].is_some()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Uniform draw over current members. Consumes exactly one
    /// `random_range` call when non-empty and nothing otherwise.
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Coord> {
        if self.members.is_empty() {
            return None;
        }
        Some(self.members[rng.random_range(0..self.members.len())])
    }

    pub fn iter(&self) -> impl Iterator<Item = Coord> + '_ {
        self.members.iter().copied()
    }

    /// Members in row-major order.
    pub fn sorted(&self) -> Vec<Coord> {
        let mut out = self.members.clone();
        out.sort_unstable();
        out
    }
}

impl Extend<Coord> for CellSet {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for coord in iter {
            self.insert(coord);
        }
    }
}
