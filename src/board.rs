use crate::{Cell, CellKind, CellStatus};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;
use std::ops::{Index, IndexMut};

/// Grid coordinates `(x, y)`, both in `[0, side - 1]`.
pub type Point = (usize, usize);

/// A finalized board: a flat row-major vector of cells plus its size.
///
/// Neighbour relationships are coordinate arithmetic, never stored references;
/// `x + y * side` resolves a point to its slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Board {
    cells: Vec<Cell>,
    size: BoardSize
}

impl Board {

    pub(crate) fn from_cells(size: BoardSize, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), size.cell_count());
        Self {
            cells,
            size
        }
    }

    /// An all-closed, mine-free placeholder of the given size. Used for the
    /// `Waiting` phase before any game has been generated.
    pub fn empty(size: BoardSize) -> Self {
        let cells = size.points()
                .map(|point| Cell::closed(CellKind::Clear, point))
                .collect();

        Self::from_cells(size, cells)
    }

    /// A board with mines at exactly the given points and adjacency counts
    /// already computed. Meant for frontends replaying fixed layouts and for
    /// tests.
    ///
    /// # Panics
    /// If the number of points differs from `size.mines()`, or any point is
    /// out of the grid or repeated.
    pub fn with_mines(size: BoardSize, mines: &[Point]) -> Self {
        assert_eq!(mines.len(), size.mines().get(), "mine points must match the configured count");

        let mut board = Self::empty(size);

        for &point in mines {
            assert!(size.contains(point), "mine point {point:?} is outside the grid");
            assert_eq!(board[point].kind, CellKind::Clear, "mine point {point:?} is repeated");
            board[point].kind = CellKind::Mine;
        }

        crate::generate::compute_adjacency(&mut board);
        board.debug_validate();

        board
    }

    pub fn size(&self) -> BoardSize {
        self.size
    }

    pub(crate) fn is_cleared(&self) -> bool {
        self.iter()
                .all(|cell| cell.kind == CellKind::Mine || cell.status == CellStatus::Open)
    }

    /// Fails fast in debug/test builds when the generation invariants are
    /// broken: every slot's cell must carry the coordinate of that slot
    /// (which makes coordinates a bijection onto the grid), and the mine
    /// count must match the configured size.
    pub(crate) fn debug_validate(&self) {
        if !cfg!(debug_assertions) {
            return
        }

        let side = self.size.side().get();
        for (index, cell) in self.cells.iter().enumerate() {
            assert_eq!(cell.point, (index % side, index / side),
                       "cell coordinate desynced from its slot");
        }

        let mines = self.iter()
                .filter(|cell| cell.kind == CellKind::Mine)
                .count();
        assert_eq!(mines, self.size.mines().get(), "mine count drifted from the configured size");
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.into_iter()
    }
}

impl Index<Point> for Board {
    type Output = Cell;

    // A hard check: the flat arithmetic would otherwise resolve an
    // out-of-grid x to a cell on the next row.
    fn index(&self, index: Point) -> &Self::Output {
        assert!(self.size.contains(index), "point {index:?} is outside the grid");
        &self.cells[index.0 + index.1 * self.size.side().get()]
    }
}

impl IndexMut<Point> for Board {
    fn index_mut(&mut self, index: Point) -> &mut Self::Output {
        assert!(self.size.contains(index), "point {index:?} is outside the grid");
        &mut self.cells[index.0 + index.1 * self.size.side().get()]
    }
}

impl IntoIterator for Board {
    type Item = Cell;
    type IntoIter = std::vec::IntoIter<Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.into_iter()
    }
}

impl<'a> IntoIterator for &'a Board {
    type Item = &'a Cell;
    type IntoIter = std::slice::Iter<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter()
    }
}

impl<'a> IntoIterator for &'a mut Board {
    type Item = &'a mut Cell;
    type IntoIter = std::slice::IterMut<'a, Cell>;

    fn into_iter(self) -> Self::IntoIter {
        self.cells.iter_mut()
    }
}

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for y in 0..self.size.side().get() {
            for x in 0..self.size.side().get() {
                write!(f, "{}", self[(x, y)])?;
            }
            writeln!(f)?;
        }

        Ok(())
    }
}

#[derive(Debug)]
pub enum BoardSizeError {
    InvalidSize {
        side: usize
    },
    TooManyMines {
        mines: usize,
        max_mines: usize
    },
    TooFewMines
}

impl Display for BoardSizeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoardSizeError::InvalidSize { side } =>
                write!(f, "board side length cannot be {}", side),
            BoardSizeError::TooManyMines { mines, max_mines } =>
                write!(f, "board cannot have {} mines (max: {})", mines, max_mines),
            BoardSizeError::TooFewMines =>
                write!(f, "board cannot have 0 mines")
        }
    }
}

impl Error for BoardSizeError {}

/// Side length and mine count of a square board. Construction validates that
/// at least one cell stays clear.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardSize {
    side: NonZeroUsize,
    mines: NonZeroUsize
}

impl BoardSize {
    pub fn new(side: usize, mines: usize) -> Result<Self, BoardSizeError> {

        let s = NonZeroUsize::new(side)
                .ok_or(BoardSizeError::InvalidSize { side })?;
        let m = NonZeroUsize::new(mines)
                .ok_or(BoardSizeError::TooFewMines)?;

        if mines >= side * side {
            return Err(BoardSizeError::TooManyMines {
                mines,
                max_mines: side * side - 1
            })
        }

        Ok(Self {
            side: s,
            mines: m
        })
    }

    pub fn side(&self) -> NonZeroUsize {
        self.side
    }

    pub fn mines(&self) -> NonZeroUsize {
        self.mines
    }

    pub fn cell_count(&self) -> usize {
        self.side.get() * self.side.get()
    }

    pub fn contains(&self, point: Point) -> bool {
        point.0 < self.side.get() && point.1 < self.side.get()
    }

    /// The up-to-8 in-grid neighbours of `point`, edge-clipped.
    pub fn neighbours(&self, point: Point) -> impl Iterator<Item = Point> {
        let mut neighbours = vec![];

        for y in point.1.saturating_sub(1)..=usize::min(self.side.get() - 1, point.1.saturating_add(1)) {
            for x in point.0.saturating_sub(1)..=usize::min(self.side.get() - 1, point.0.saturating_add(1)) {
                if (x, y) != point {
                    neighbours.push((x, y))
                }
            }
        }

        neighbours.into_iter()
    }

    /// Row-major enumeration of every point on the grid.
    pub fn points(&self) -> impl Iterator<Item = Point> {
        let side = self.side.get();
        (0..side)
                .flat_map(move |y| (0..side)
                        .map(move |x| (x, y)))
    }
}

/// Fixed size/difficulty tiers. Immutable configuration, not game state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Preset {
    Small,
    Medium,
    Large
}

impl Preset {
    pub fn size(self) -> BoardSize {
        match self {
            Preset::Small => BoardSize::new(9, 10).unwrap(),
            Preset::Medium => BoardSize::new(16, 40).unwrap(),
            Preset::Large => BoardSize::new(22, 99).unwrap()
        }
    }
}
