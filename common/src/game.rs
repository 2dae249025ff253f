use crate::cell::{Bounds, Cell};
use rand::Rng;
use std::collections::{BTreeSet, HashSet};

/// The hidden board: where the mines really are.
///
/// Acts as the oracle for the agent. The agent never looks at `mines`; it only
/// receives `nearby_mines` counts for the cells it probes.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Minesweeper {
    bounds: Bounds,
    mines: BTreeSet<Cell>,
    /// Cells flagged as mines so far.
    mines_found: BTreeSet<Cell>,
}

impl Minesweeper {
    /// Places `mines` mines uniformly at random.
    pub fn new<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        mines: usize,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        let bounds = Bounds::new(height, width);
        anyhow::ensure!(
            mines < bounds.area(),
            "total mines must be less than the number of cells on the board"
        );

        let mines = rand::seq::index::sample(rng, bounds.area(), mines)
            .into_iter()
            .map(|i| Cell::new(i / width, i % width))
            .collect();

        Ok(Minesweeper {
            bounds,
            mines,
            mines_found: BTreeSet::new(),
        })
    }

    /// Builds a board with a fixed mine layout.
    pub fn with_mines(
        height: usize,
        width: usize,
        mines: impl IntoIterator<Item = Cell>,
    ) -> anyhow::Result<Self> {
        let bounds = Bounds::new(height, width);
        let mines: BTreeSet<Cell> = mines.into_iter().collect();
        if let Some(cell) = mines.iter().find(|&&cell| !bounds.contains(cell)) {
            anyhow::bail!("mine {cell} is outside a {height}x{width} board");
        }

        Ok(Minesweeper {
            bounds,
            mines,
            mines_found: BTreeSet::new(),
        })
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn mine_count(&self) -> usize {
        self.mines.len()
    }

    pub fn is_mine(&self, cell: Cell) -> bool {
        self.mines.contains(&cell)
    }

    /// Number of mines among the cells adjacent to `cell`.
    pub fn nearby_mines(&self, cell: Cell) -> u8 {
        self.bounds
            .neighbors(cell)
            .filter(|neighbor| self.mines.contains(neighbor))
            .count() as u8
    }

    pub fn flag(&mut self, cell: Cell) {
        self.mines_found.insert(cell);
    }

    pub fn mines_found(&self) -> &BTreeSet<Cell> {
        &self.mines_found
    }

    /// Won once exactly the mines have been flagged.
    pub fn won(&self) -> bool {
        self.mines_found == self.mines
    }

    /// Whether every safe cell is among `probed`.
    pub fn cleared(&self, probed: &HashSet<Cell>) -> bool {
        self.bounds
            .cells()
            .all(|cell| self.mines.contains(&cell) || probed.contains(&cell))
    }

    pub fn serialize(&self) -> anyhow::Result<Vec<u8>> {
        Ok(bcs::to_bytes(self)?)
    }

    pub fn deserialize(bts: &[u8]) -> anyhow::Result<Self> {
        Ok(bcs::from_bytes(bts)?)
    }
}
