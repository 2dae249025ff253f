use std::fmt;

/// A board coordinate. Compared and hashed by value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    pub const fn new(row: usize, col: usize) -> Self {
        Cell { row, col }
    }
}

impl From<(usize, usize)> for Cell {
    fn from((row, col): (usize, usize)) -> Self {
        Cell { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The fixed dimensions of a board.
///
/// The knowledge base stores no grid; bounds are only used to clip
/// neighbourhoods and to enumerate candidates for random moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Bounds {
    pub height: usize,
    pub width: usize,
}

impl Bounds {
    pub const fn new(height: usize, width: usize) -> Self {
        Bounds { height, width }
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    pub fn area(&self) -> usize {
        self.height * self.width
    }

    /// Every cell on the board in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + use<> {
        let width = self.width;
        (0..self.height).flat_map(move |row| (0..width).map(move |col| Cell { row, col }))
    }

    /// The up-to-8 cells adjacent to `cell`, clipped to the board edges.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + use<> {
        let height = self.height as isize;
        let width = self.width as isize;

        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }

                let nr = cell.row as isize + dr;
                let nc = cell.col as isize + dc;

                if nr >= 0 && nr < height && nc >= 0 && nc < width {
                    Some(Cell {
                        row: nr as usize,
                        col: nc as usize,
                    })
                } else {
                    None
                }
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_neighbors_are_clipped() {
        let bounds = Bounds::new(3, 3);

        // Corner cell (0,0) should have 3 neighbors
        assert_eq!(bounds.neighbors(Cell::new(0, 0)).count(), 3);

        // Center cell (1,1) should have 8 neighbors
        assert_eq!(bounds.neighbors(Cell::new(1, 1)).count(), 8);

        // Edge cell (0,1) should have 5 neighbors
        assert_eq!(bounds.neighbors(Cell::new(0, 1)).count(), 5);
    }

    #[test]
    fn test_neighbors_exclude_self() {
        let bounds = Bounds::new(4, 5);
        let center = Cell::new(2, 3);
        assert!(bounds.neighbors(center).all(|n| n != center));
        assert!(bounds.neighbors(center).all(|n| bounds.contains(n)));
    }

    #[test]
    fn test_non_square_board() {
        let bounds = Bounds::new(1, 4);
        let neighbors: Vec<Cell> = bounds.neighbors(Cell::new(0, 3)).collect();
        assert_eq!(neighbors, vec![Cell::new(0, 2)]);
        assert_eq!(bounds.cells().count(), bounds.area());
        assert!(!bounds.contains(Cell::new(1, 0)));
    }
}
