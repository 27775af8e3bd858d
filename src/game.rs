use crate::board::{Board, BoardSize, Point};
use crate::generate::{FastrandShuffle, Shuffle, compute_adjacency, generate};
use crate::{CellKind, CellStatus, GamePhase, GameSession, Minesweeper, check_interact};
use log::debug;

#[cfg(feature = "linked-hash-set")]
use hashlink::LinkedHashSet as WorkSet;
#[cfg(not(feature = "linked-hash-set"))]
use std::collections::HashSet as WorkSet;

/// The game state machine. Owns the single [`GameSession`]; every command
/// runs to completion before the next is accepted, and nothing else holds a
/// mutable reference to the board.
pub struct Game<S: Shuffle = FastrandShuffle> {
    session: GameSession,
    shuffler: S
}

impl Game<FastrandShuffle> {

    pub fn new(size: BoardSize) -> Self {
        Self::with_shuffler(size, FastrandShuffle::new())
    }

    /// Resumes directly in `Playing` on a prepared board. Meant for fixed
    /// layouts and tests.
    pub fn from_board(board: Board) -> Self {
        let size = board.size();
        Self {
            session: GameSession::new(GamePhase::Playing, board, size),
            shuffler: FastrandShuffle::new()
        }
    }
}

impl<S: Shuffle> Game<S> {

    pub fn with_shuffler(size: BoardSize, shuffler: S) -> Self {
        Self {
            session: GameSession::new(GamePhase::Waiting, Board::empty(size), size),
            shuffler
        }
    }
}

impl<S: Shuffle> Minesweeper for Game<S> {

    fn begin_game(&mut self, size: BoardSize) -> &GameSession {
        let mut board = generate(size, &mut self.shuffler);
        compute_adjacency(&mut board);
        board.debug_validate();

        debug!("game started: {0}x{0}, {1} mines", size.side(), size.mines());
        self.session = GameSession::new(GamePhase::Playing, board, size);

        &self.session
    }

    fn session(&self) -> &GameSession {
        &self.session
    }

    fn reveal(&mut self, point: Point) -> Result<&GameSession, &GameSession> {
        if check_interact(self, point).is_err() {
            return Err(&self.session)
        }

        let cell = self.session.board[point];

        if cell.status != CellStatus::Closed {
            return Err(&self.session)
        }

        match cell.kind {
            CellKind::Mine => self.lose(point),
            CellKind::Clear => {
                reveal_clear(&mut self.session.board, point);
                self.check_victory();
            }
        }

        Ok(&self.session)
    }

    fn clear_around(&mut self, point: Point) -> Result<&GameSession, &GameSession> {
        if check_interact(self, point).is_err() {
            return Err(&self.session)
        }

        let cell = self.session.board[point];

        if cell.status != CellStatus::Open || cell.kind != CellKind::Clear || cell.adjacent_mines == 0 {
            return Err(&self.session)
        }

        let flags = self.session.board.size().neighbours(point)
                .filter(|&p| self.session.board[p].status == CellStatus::Flagged)
                .count();

        if flags != cell.adjacent_mines as usize {
            return Err(&self.session)
        }

        let mut hit_mine = None;

        for p in self.session.board.size().neighbours(point) {
            let neighbour = self.session.board[p];

            if neighbour.status != CellStatus::Closed {
                continue
            }

            match neighbour.kind {
                CellKind::Mine => hit_mine = Some(p),
                CellKind::Clear => reveal_clear(&mut self.session.board, p)
            }
        }

        match hit_mine {
            Some(mine) => self.lose(mine),
            None => self.check_victory()
        }

        Ok(&self.session)
    }

    fn set_flag(&mut self, point: Point) -> Result<&GameSession, &GameSession> {
        if check_interact(self, point).is_err() {
            return Err(&self.session)
        }

        match self.session.board[point].status {
            CellStatus::Closed => {
                self.session.board[point].status = CellStatus::Flagged;
                Ok(&self.session)
            }
            _ => Err(&self.session)
        }
    }

    fn clear_flag(&mut self, point: Point) -> Result<&GameSession, &GameSession> {
        if check_interact(self, point).is_err() {
            return Err(&self.session)
        }

        match self.session.board[point].status {
            CellStatus::Flagged => {
                self.session.board[point].status = CellStatus::Closed;
                Ok(&self.session)
            }
            _ => Err(&self.session)
        }
    }
}

impl<S: Shuffle> Game<S> {

    fn lose(&mut self, mine: Point) {
        reveal_mines(&mut self.session.board);
        self.session.phase = GamePhase::GameOver;

        debug!("mine hit at {mine:?}: game over");
    }

    /// Scans the whole updated board, not just the cells the last reveal
    /// touched. A flood fill may complete the board in one command.
    fn check_victory(&mut self) {
        if self.session.board.is_cleared() {
            self.session.phase = GamePhase::Victory;

            debug!("board cleared: victory");
        }
    }
}

/// Opens a clear cell. A cell with no adjacent mines flood-fills: the whole
/// connected zero-count region opens, plus its directly bordering numbered
/// cells. Mines are never touched on this path.
fn reveal_clear(board: &mut Board, point: Point) {
    debug_assert_eq!(board[point].kind, CellKind::Clear);

    if board[point].status == CellStatus::Open {
        return
    }

    if board[point].adjacent_mines > 0 {
        board[point].status = CellStatus::Open;
        return
    }

    let mut flood = WorkSet::new();

    flood.insert(point);

    // A cell is opened when taken from the set and never re-inserted once
    // open, so the set shrinks to empty and the fill terminates.
    while !flood.is_empty() {
        let point = *flood.iter().next().unwrap();
        flood.remove(&point);

        board[point].status = CellStatus::Open;

        for point in board.size().neighbours(point) {
            let neighbour = board[point];

            if neighbour.status == CellStatus::Open || neighbour.kind == CellKind::Mine {
                continue
            }

            if neighbour.adjacent_mines == 0 {
                flood.insert(point);
            } else {
                board[point].status = CellStatus::Open;
            }
        }
    }
}

/// Exposes the minefield at the end of a lost game: a flagged mine becomes
/// [`CellStatus::FlaggedMine`], every other mine opens. Clear cells keep
/// whatever status they had, flagging mistakes included.
fn reveal_mines(board: &mut Board) {
    for cell in board.iter_mut() {
        if cell.kind != CellKind::Mine {
            continue
        }

        cell.status = match cell.status {
            CellStatus::Flagged => CellStatus::FlaggedMine,
            _ => CellStatus::Open
        };
    }
}

#[cfg(feature = "async")]
pub mod nonblocking {
    use crate::board::{Board, BoardSize, Point};
    use crate::game::Game;
    use crate::generate::{FastrandShuffle, Shuffle};
    use crate::{GameSession, Minesweeper};
    use tokio::sync::RwLock;

    /// [`Game`] behind an `RwLock` for hosts that receive commands
    /// concurrently. Every command holds the write lock to completion, so
    /// commands are serialized per session and a flood fill can never be
    /// observed half-done.
    pub struct AsyncGame<S: Shuffle + Send + Sync = FastrandShuffle> {
        game: RwLock<Game<S>>
    }

    impl AsyncGame<FastrandShuffle> {

        pub fn new(size: BoardSize) -> Self {
            Self {
                game: RwLock::new(Game::new(size))
            }
        }

        pub fn from_board(board: Board) -> Self {
            Self {
                game: RwLock::new(Game::from_board(board))
            }
        }
    }

    impl<S: Shuffle + Send + Sync> AsyncGame<S> {

        pub fn with_shuffler(size: BoardSize, shuffler: S) -> Self {
            Self {
                game: RwLock::new(Game::with_shuffler(size, shuffler))
            }
        }

        pub async fn begin_game(&self, size: BoardSize) -> GameSession {
            self.game.write()
                    .await
                    .begin_game(size)
                    .clone()
        }

        pub async fn session(&self) -> GameSession {
            self.game.read()
                    .await
                    .session()
                    .clone()
        }

        pub async fn reveal(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::reveal(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }

        pub async fn clear_around(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::clear_around(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }

        pub async fn set_flag(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::set_flag(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }

        pub async fn clear_flag(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::clear_flag(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }

        pub async fn toggle_flag(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::toggle_flag(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }

        pub async fn left_click(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::left_click(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }

        pub async fn right_click(&self, point: Point) -> Result<GameSession, GameSession> {
            Minesweeper::right_click(&mut *self.game.write().await, point)
                    .cloned()
                    .map_err(Clone::clone)
        }
    }
}
