use crate::board::{Board, BoardSize};
use crate::{Cell, CellKind};
use log::debug;

/// The injected randomness capability: one uniform permutation of the cell
/// kinds per generated board. The engine never implements a PRNG itself.
pub trait Shuffle {
    fn shuffle(&mut self, kinds: &mut [CellKind]);
}

/// Adapter letting any `FnMut(&mut [CellKind])` closure act as a shuffle
/// capability. The main seam for deterministic tests.
pub struct FnShuffle<F>(pub F);

impl<F: FnMut(&mut [CellKind])> Shuffle for FnShuffle<F> {
    fn shuffle(&mut self, kinds: &mut [CellKind]) {
        (self.0)(kinds)
    }
}

/// Default shuffle capability, backed by fastrand.
#[derive(Clone, Debug)]
pub struct FastrandShuffle {
    rng: fastrand::Rng
}

impl FastrandShuffle {
    pub fn new() -> Self {
        Self {
            rng: fastrand::Rng::new()
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed)
        }
    }
}

impl Default for FastrandShuffle {
    fn default() -> Self {
        Self::new()
    }
}

impl Shuffle for FastrandShuffle {
    fn shuffle(&mut self, kinds: &mut [CellKind]) {
        self.rng.shuffle(kinds)
    }
}

/// Builds an unrevealed board: `side² - mines` clear kinds followed by
/// `mines` mine kinds, shuffled once, then overlaid onto the row-major
/// enumeration of the grid. No adjacency counts yet; run
/// [`compute_adjacency`] on the result.
pub fn generate(size: BoardSize, shuffler: &mut impl Shuffle) -> Board {
    let mut kinds = vec![CellKind::Clear; size.cell_count() - size.mines().get()];
    kinds.resize(size.cell_count(), CellKind::Mine);

    shuffler.shuffle(&mut kinds);

    let cells = size.points()
            .zip(kinds)
            .map(|(point, kind)| Cell::closed(kind, point))
            .collect();

    debug!("generated {0}x{0} board with {1} mines", size.side(), size.mines());

    Board::from_cells(size, cells)
}

/// Stores in every cell the number of mines among its in-grid neighbours.
/// Mine cells get a count too; nothing reads it.
pub fn compute_adjacency(board: &mut Board) {
    let size = board.size();

    for point in size.points() {
        let count = size.neighbours(point)
                .filter(|&p| board[p].kind == CellKind::Mine)
                .count();

        board[point].adjacent_mines = count as u8;
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::board::{Point, Preset};
    use std::collections::HashSet;

    #[test]
    fn generated_board_has_exact_counts() {
        let size = Preset::Small.size();
        let board = generate(size, &mut FastrandShuffle::with_seed(42));

        assert_eq!(board.iter().count(), 81);

        let mines = board.iter()
                .filter(|cell| cell.kind == CellKind::Mine)
                .count();
        assert_eq!(mines, 10);
    }

    #[test]
    fn generated_coordinates_cover_the_grid_exactly_once() {
        let size = Preset::Small.size();
        let board = generate(size, &mut FastrandShuffle::with_seed(7));

        let points: HashSet<Point> = board.iter()
                .map(|cell| cell.point)
                .collect();

        assert_eq!(points.len(), size.cell_count());
        assert!(size.points().all(|point| points.contains(&point)));

        board.debug_validate();
    }

    #[test]
    fn overlay_preserves_shuffled_order() {
        // An identity shuffle leaves the mine kinds at the tail of the
        // sequence, so they land on the highest row-major points.
        let size = crate::board::BoardSize::new(3, 2).unwrap();
        let board = generate(size, &mut FnShuffle(|_: &mut [CellKind]| {}));

        assert_eq!(board[(1, 2)].kind, CellKind::Mine);
        assert_eq!(board[(2, 2)].kind, CellKind::Mine);

        let mines = board.iter()
                .filter(|cell| cell.kind == CellKind::Mine)
                .count();
        assert_eq!(mines, 2);
    }

    #[test]
    fn closure_shuffler_drives_placement() {
        // Reversing the sequence moves the mines to the lowest points.
        let size = crate::board::BoardSize::new(3, 2).unwrap();
        let board = generate(size, &mut FnShuffle(|kinds: &mut [CellKind]| kinds.reverse()));

        assert_eq!(board[(0, 0)].kind, CellKind::Mine);
        assert_eq!(board[(1, 0)].kind, CellKind::Mine);
        assert_eq!(board[(2, 0)].kind, CellKind::Clear);
    }

    #[test]
    fn adjacency_handles_grid_edges_without_padding() {
        let size = crate::board::BoardSize::new(2, 1).unwrap();
        let mut board = generate(size, &mut FnShuffle(|_: &mut [CellKind]| {}));
        compute_adjacency(&mut board);

        // Mine at (1, 1); the corner diagonally across it sees exactly one.
        assert_eq!(board[(1, 1)].kind, CellKind::Mine);
        assert_eq!(board[(0, 0)].adjacent_mines, 1);
        assert_eq!(board[(1, 0)].adjacent_mines, 1);
        assert_eq!(board[(0, 1)].adjacent_mines, 1);
    }
}
