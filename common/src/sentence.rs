use crate::cell::Cell;
use crate::error::{KnowledgeError, Result};
use std::collections::BTreeSet;
use std::fmt;

/// A logical statement about the board: exactly `count` of `cells` are mines.
///
/// Cells are kept in a `BTreeSet` so that two sentences over the same cells
/// compare, hash and print identically no matter how they were built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Cell>,
    count: usize,
}

impl Sentence {
    /// Builds a sentence, rejecting counts larger than the number of cells.
    pub fn new(cells: impl IntoIterator<Item = Cell>, count: usize) -> Result<Self> {
        Self::checked(cells.into_iter().collect(), count as isize)
    }

    fn checked(cells: BTreeSet<Cell>, count: isize) -> Result<Self> {
        if count < 0 || count as usize > cells.len() {
            return Err(KnowledgeError::Contradiction {
                count,
                cells: cells.into_iter().collect(),
            });
        }
        Ok(Sentence {
            cells,
            count: count as usize,
        })
    }

    pub fn cells(&self) -> &BTreeSet<Cell> {
        &self.cells
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// A sentence with no cells says nothing and can be dropped.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All cells, if every one of them must be a mine.
    pub fn known_mines(&self) -> BTreeSet<Cell> {
        if self.count == self.cells.len() {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// All cells, if none of them can be a mine.
    pub fn known_safes(&self) -> BTreeSet<Cell> {
        if self.count == 0 {
            self.cells.clone()
        } else {
            BTreeSet::new()
        }
    }

    /// Removes a cell proven to be a mine, taking one off the count.
    ///
    /// Returns whether the cell was part of this sentence.
    pub fn mark_mine(&mut self, cell: Cell) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == 0 {
            return Err(KnowledgeError::Contradiction {
                count: -1,
                cells: self.remaining_without(cell),
            });
        }
        self.cells.remove(&cell);
        self.count -= 1;
        Ok(true)
    }

    /// Removes a cell proven to be safe. The count is unchanged.
    pub fn mark_safe(&mut self, cell: Cell) -> Result<bool> {
        if !self.cells.contains(&cell) {
            return Ok(false);
        }
        if self.count == self.cells.len() {
            return Err(KnowledgeError::Contradiction {
                count: self.count as isize,
                cells: self.remaining_without(cell),
            });
        }
        self.cells.remove(&cell);
        Ok(true)
    }

    pub fn is_subset(&self, other: &Sentence) -> bool {
        self.cells.is_subset(&other.cells)
    }

    /// Resolves `self` against a sentence over a subset of its cells.
    ///
    /// If `subset` holds exactly `subset.count` mines, the remaining cells
    /// hold exactly `self.count - subset.count`.
    pub fn without(&self, subset: &Sentence) -> Result<Sentence> {
        debug_assert!(subset.is_subset(self));
        let cells = self.cells.difference(&subset.cells).copied().collect();
        Self::checked(cells, self.count as isize - subset.count as isize)
    }

    fn remaining_without(&self, cell: Cell) -> Vec<Cell> {
        self.cells.iter().copied().filter(|&c| c != cell).collect()
    }
}

impl fmt::Display for Sentence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, cell) in self.cells.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{cell}")?;
        }
        write!(f, "}} = {}", self.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(raw: &[(usize, usize)]) -> Vec<Cell> {
        raw.iter().copied().map(Cell::from).collect()
    }

    #[test]
    fn test_degenerate_cases() {
        let all_mines = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert_eq!(all_mines.known_mines().len(), 2);
        assert!(all_mines.known_safes().is_empty());

        let all_safe = Sentence::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        assert_eq!(all_safe.known_safes().len(), 2);
        assert!(all_safe.known_mines().is_empty());

        // One mine among two cells tells us nothing on its own
        let unknown = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        assert!(unknown.known_mines().is_empty());
        assert!(unknown.known_safes().is_empty());
    }

    #[test]
    fn test_mark_mine_decrements_count() {
        let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1), (1, 1)]), 2).unwrap();
        assert!(sentence.mark_mine(Cell::new(0, 0)).unwrap());
        assert_eq!(sentence.count(), 1);
        assert_eq!(sentence.cells().len(), 2);

        // Unknown cell is a no-op
        assert!(!sentence.mark_mine(Cell::new(5, 5)).unwrap());
        assert_eq!(sentence.count(), 1);
    }

    #[test]
    fn test_mark_safe_keeps_count() {
        let mut sentence = Sentence::new(cells(&[(0, 0), (0, 1), (1, 1)]), 1).unwrap();
        assert!(sentence.mark_safe(Cell::new(0, 0)).unwrap());
        assert!(sentence.mark_safe(Cell::new(0, 1)).unwrap());
        assert_eq!(sentence.count(), 1);
        assert_eq!(sentence.known_mines(), BTreeSet::from([Cell::new(1, 1)]));
    }

    #[test]
    fn test_marks_that_break_the_count_are_rejected() {
        let mut safe = Sentence::new(cells(&[(0, 0), (0, 1)]), 0).unwrap();
        assert!(matches!(
            safe.mark_mine(Cell::new(0, 0)),
            Err(KnowledgeError::Contradiction { count: -1, .. })
        ));
        // Nothing was removed
        assert_eq!(safe.cells().len(), 2);

        let mut mined = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert!(mined.mark_safe(Cell::new(0, 1)).is_err());
    }

    #[test]
    fn test_count_above_cells_is_rejected() {
        assert!(Sentence::new(cells(&[(0, 0)]), 2).is_err());
        assert!(Sentence::new(Vec::new(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_subset_resolution() {
        let a = Sentence::new(cells(&[(0, 0), (0, 1)]), 1).unwrap();
        let b = Sentence::new(cells(&[(0, 0), (0, 1), (0, 2)]), 2).unwrap();
        assert!(a.is_subset(&b));
        assert!(!b.is_subset(&a));

        let derived = b.without(&a).unwrap();
        assert_eq!(derived, Sentence::new(cells(&[(0, 2)]), 1).unwrap());

        // Same cells with different counts cannot both hold
        let c = Sentence::new(cells(&[(0, 0), (0, 1)]), 2).unwrap();
        assert!(a.without(&c).is_err());
    }

    #[test]
    fn test_equality_ignores_construction_order() {
        let a = Sentence::new(cells(&[(1, 0), (0, 0)]), 1).unwrap();
        let b = Sentence::new(cells(&[(0, 0), (1, 0), (0, 0)]), 1).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{(0, 0), (1, 0)} = 1");
    }
}
