use crate::board::{Board, BoardSize, Point};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

pub mod board;
pub mod game;
pub mod generate;

/// Command surface of the engine, consumed by a frontend one command at a time.
///
/// Rejected commands return `Err` with the unchanged session, so a caller can
/// always render whatever comes back.
pub trait Minesweeper {

    fn begin_game(&mut self, size: BoardSize) -> &GameSession;

    fn session(&self) -> &GameSession;

    fn reveal(&mut self, point: Point) -> Result<&GameSession, &GameSession>;

    fn clear_around(&mut self, point: Point) -> Result<&GameSession, &GameSession>;

    fn set_flag(&mut self, point: Point) -> Result<&GameSession, &GameSession>;

    fn clear_flag(&mut self, point: Point) -> Result<&GameSession, &GameSession>;

    fn toggle_flag(&mut self, point: Point) -> Result<&GameSession, &GameSession> {
        if check_interact(self, point).is_err() {
            return Err(self.session())
        }

        if self.session().board[point].status == CellStatus::Flagged {
            self.clear_flag(point)
        } else {
            self.set_flag(point)
        }
    }

    fn left_click(&mut self, point: Point) -> Result<&GameSession, &GameSession> {

        if check_interact(self, point).is_err() {
            return Err(self.session())
        }

        let cell = self.session().board[point];

        match cell.status {
            CellStatus::Open => self.clear_around(point),
            CellStatus::Closed => self.reveal(point),
            _ => Err(self.session())
        }
    }

    fn right_click(&mut self, point: Point) -> Result<&GameSession, &GameSession> {
        self.toggle_flag(point)
    }

}

fn check_interact(minesweeper: &(impl Minesweeper + ?Sized), point: Point) -> Result<(), ()> {
    let session = minesweeper.session();
    if session.phase == GamePhase::Playing && session.size.contains(point) {
        Ok(())
    } else {
        Err(())
    }
}

impl AsRef<GameSession> for Result<&GameSession, &GameSession> {
    fn as_ref(&self) -> &GameSession {
        match self {
            Ok(session) => session,
            Err(session) => session
        }
    }
}

impl<'a> From<Result<&'a GameSession, &'a GameSession>> for &'a GameSession {
    fn from(value: Result<&'a GameSession, &'a GameSession>) -> Self {
        value.unwrap_or_else(|session| session)
    }
}

/// Root aggregate of one game: current phase, the board, and the configured
/// size. Frontends read `status`, `kind` and `adjacent_mines` off the board
/// cells to pick a visual representation; nothing else is part of the contract.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GameSession {
    pub phase: GamePhase,
    pub board: Board,
    pub size: BoardSize
}

impl GameSession {
    pub const fn new(phase: GamePhase, board: Board, size: BoardSize) -> Self {
        Self {
            phase,
            board,
            size
        }
    }

    /// Configured mine count minus the flags currently placed. Derived on
    /// demand because a flood fill may open flagged cells.
    pub fn remaining_mines(&self) -> isize {
        let flagged = self.board.iter()
                .filter(|cell| cell.status == CellStatus::Flagged)
                .count();

        self.size.mines().get() as isize - flagged as isize
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Cell {
    pub kind: CellKind,
    pub status: CellStatus,
    pub point: Point,
    pub adjacent_mines: u8
}

impl Cell {
    pub const fn closed(kind: CellKind, point: Point) -> Self {
        Self {
            kind,
            status: CellStatus::Closed,
            point,
            adjacent_mines: 0
        }
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.status, self.kind) {
            (CellStatus::Closed, _) => write!(f, "▩"),
            (CellStatus::Flagged, _) => write!(f, "!"),
            (CellStatus::FlaggedMine, _) => write!(f, "#"),
            (CellStatus::Open, CellKind::Mine) => write!(f, "*"),
            (CellStatus::Open, CellKind::Clear) if self.adjacent_mines == 0 => write!(f, " "),
            (CellStatus::Open, CellKind::Clear) => write!(f, "{}", self.adjacent_mines)
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellKind {
    Mine, Clear
}

/// `FlaggedMine` is terminal display state only: a correctly flagged mine,
/// assigned when the minefield is exposed on loss.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CellStatus {
    Closed, Open, Flagged, FlaggedMine
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum GamePhase {
    Waiting, Playing, GameOver, Victory
}
