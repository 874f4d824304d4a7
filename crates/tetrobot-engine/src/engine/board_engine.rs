use std::fmt;

use crate::{
    BoardSizeError, PieceCollisionError,
    core::{
        board::Board,
        piece::{Orientation, Piece, PieceKind, Position, ShapeMask},
    },
};

use super::statistics::BoardStatistics;

/// One discrete command accepted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Move {
    /// Turn the active piece 90° counter-clockwise.
    #[display("rotate")]
    Rotate,
    #[display("left")]
    ShiftLeft,
    #[display("right")]
    ShiftRight,
    /// Move down one row, or land if blocked.
    #[display("drop")]
    Drop,
}

impl Move {
    pub const ALL: [Self; 4] = [Move::Rotate, Move::ShiftLeft, Move::ShiftRight, Move::Drop];
}

/// Identifies one spawned piece instance.
///
/// Two spawns of the same kind get different ids, so callers can tell a new
/// piece from the one they planned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
#[display("#{_0}")]
pub struct PieceId(u64);

/// Board plus falling piece: the passive state machine driving one game.
///
/// Movement operations never fail loudly. They return `false` and leave the
/// state untouched when the move is illegal or there is no active piece.
///
/// # Line clears
///
/// Landing a piece clears full rows immediately and adds their count to an
/// internal accumulator. [`clear_full_rows`](Self::clear_full_rows) reads and
/// resets that accumulator, so it must be called once per landing by whoever
/// keeps score. [`statistics`](Self::statistics) reports the accumulator
/// without draining it.
///
/// # Example
///
/// ```
/// use tetrobot_engine::{BoardEngine, PieceKind};
///
/// let mut engine = BoardEngine::new();
/// assert!(engine.spawn(PieceKind::O));
/// assert!(engine.shift_left());
/// engine.hard_drop();
/// assert!(engine.is_landed());
///
/// let stats = engine.statistics();
/// assert_eq!(stats.aggregate_height, 4);
/// assert_eq!(stats.holes, 0);
/// ```
#[derive(Debug, Clone)]
pub struct BoardEngine {
    board: Board,
    active: Option<Piece>,
    spawn_count: u64,
    landed: bool,
    game_over: bool,
    cleared: usize,
}

impl Default for BoardEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BoardEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.snapshot(), f)
    }
}

impl BoardEngine {
    pub const DEFAULT_ROWS: usize = 20;
    pub const DEFAULT_COLS: usize = 10;

    /// Creates an empty 20×10 board with no active piece.
    #[must_use]
    pub fn new() -> Self {
        match Self::with_size(Self::DEFAULT_ROWS, Self::DEFAULT_COLS) {
            Ok(engine) => engine,
            Err(e) => unreachable!("default board size rejected: {e}"),
        }
    }

    pub fn with_size(rows: usize, cols: usize) -> Result<Self, BoardSizeError> {
        Ok(Self::from_board(Board::new(rows, cols)?))
    }

    /// Wraps an existing grid. Full rows already present are cleared on the
    /// next [`clear_full_rows`](Self::clear_full_rows).
    #[must_use]
    pub fn from_board(board: Board) -> Self {
        Self {
            board,
            active: None,
            spawn_count: 0,
            landed: false,
            game_over: false,
            cleared: 0,
        }
    }

    /// Test helper, see [`Board::from_ascii`].
    #[must_use]
    pub fn from_ascii(rows: usize, art: &str) -> Self {
        Self::from_board(Board::from_ascii(rows, art))
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.board.rows()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.board.cols()
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// Id of the active piece, `None` between landing and the next spawn.
    #[must_use]
    pub fn active_id(&self) -> Option<PieceId> {
        self.active.map(|_| PieceId(self.spawn_count))
    }

    /// Whether the last piece has landed and no new piece was spawned yet.
    #[must_use]
    pub fn is_landed(&self) -> bool {
        self.landed
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Anchor where a piece of `kind` appears: row 0, horizontally centered.
    #[must_use]
    pub fn spawn_position(&self, kind: PieceKind) -> Position {
        let col = self.cols() / 2 - kind.base_mask().size() / 2;
        // cols is at most 255, so the column always fits
        Position::new(0, i32::try_from(col).unwrap_or(i32::MAX))
    }

    /// Places a new piece of `kind` at the spawn anchor in its base orientation.
    ///
    /// Returns `false` and enters the game-over state if the spawn cells are
    /// already occupied.
    pub fn spawn(&mut self, kind: PieceKind) -> bool {
        if self.game_over {
            return false;
        }
        self.landed = false;
        self.spawn_count += 1;
        let piece = Piece::new(kind, self.spawn_position(kind));
        if !self.board.fits(piece.mask(), piece.position()) {
            log::debug!("spawn of {kind} collides, game over");
            self.active = None;
            self.game_over = true;
            return false;
        }
        self.active = Some(piece);
        true
    }

    /// Whether `shape` fits at `position`. A missing shape always fits.
    #[must_use]
    pub fn can_place(&self, shape: Option<ShapeMask>, position: Position) -> bool {
        shape.is_none_or(|mask| self.board.fits(mask, position))
    }

    /// Replaces the active piece with `piece` if it fits.
    pub fn set_active_piece(&mut self, piece: Piece) -> Result<(), PieceCollisionError> {
        if !self.board.fits(piece.mask(), piece.position()) {
            return Err(PieceCollisionError);
        }
        self.active = Some(piece);
        Ok(())
    }

    fn try_replace(&mut self, f: impl FnOnce(&Piece) -> Piece) -> bool {
        let Some(current) = &self.active else {
            return false;
        };
        let moved = f(current);
        self.set_active_piece(moved).is_ok()
    }

    pub fn rotate(&mut self) -> bool {
        self.try_replace(Piece::rotated)
    }

    pub fn shift_left(&mut self) -> bool {
        self.try_replace(|p| p.moved_to(p.position().left()))
    }

    pub fn shift_right(&mut self) -> bool {
        self.try_replace(|p| p.moved_to(p.position().right()))
    }

    /// Moves the active piece down one row, or lands it if it is blocked.
    ///
    /// Landing writes the piece into the board, clears full rows into the
    /// line-clear accumulator, and leaves no active piece. Returns `false`
    /// only when there is no active piece.
    pub fn step_down(&mut self) -> bool {
        let Some(piece) = self.active else {
            return false;
        };
        let below = piece.position().down();
        if self.board.fits(piece.mask(), below) {
            self.active = Some(piece.moved_to(below));
            return true;
        }
        self.board.fill_piece(&piece);
        self.active = None;
        self.landed = true;
        let cleared = self.board.clear_full_rows();
        self.cleared += cleared;
        log::trace!("{piece} landed, {cleared} rows cleared");
        true
    }

    /// Applies one [`Move`], returning whether it changed the state.
    pub fn apply(&mut self, mv: Move) -> bool {
        match mv {
            Move::Rotate => self.rotate(),
            Move::ShiftLeft => self.shift_left(),
            Move::ShiftRight => self.shift_right(),
            Move::Drop => self.step_down(),
        }
    }

    /// Teleports the active piece to `position` and `orientation`.
    ///
    /// The rotation takes the fewest quarter turns from the current orientation.
    /// Either the whole state is committed or nothing changes.
    pub fn reposition(&mut self, position: Position, orientation: Orientation) -> bool {
        self.try_replace(|p| p.rotated_to(orientation).moved_to(position))
    }

    /// Steps down until the active piece lands.
    ///
    /// Returns the anchor the piece landed at, or `None` if there was no
    /// active piece.
    pub fn hard_drop(&mut self) -> Option<Position> {
        let mut last = self.active?.position();
        while let Some(piece) = self.active {
            last = piece.position();
            self.step_down();
        }
        Some(last)
    }

    /// Clears any full rows, then returns and resets the line-clear accumulator.
    pub fn clear_full_rows(&mut self) -> usize {
        self.cleared += self.board.clear_full_rows();
        std::mem::take(&mut self.cleared)
    }

    /// Board features of the landed cells, with `cleared` taken from the
    /// line-clear accumulator (not drained).
    #[must_use]
    pub fn statistics(&self) -> BoardStatistics {
        BoardStatistics::from_board(&self.board, self.cleared)
    }

    /// Independently owned copy for exploration, with an empty line-clear
    /// accumulator.
    #[must_use]
    pub fn fork(&self) -> Self {
        Self {
            cleared: 0,
            ..self.clone()
        }
    }

    /// Grid of landed cells with the active piece drawn in.
    #[must_use]
    pub fn snapshot(&self) -> Board {
        let mut board = self.board.clone();
        if let Some(piece) = &self.active {
            board.fill_piece(piece);
        }
        board
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Block;

    fn active(engine: &BoardEngine) -> Piece {
        *engine.active_piece().unwrap()
    }

    #[test]
    fn test_spawn_is_centered() {
        let mut engine = BoardEngine::new();
        assert!(engine.spawn(PieceKind::T));
        assert_eq!(active(&engine).position(), Position::new(0, 4));
        assert_eq!(active(&engine).orientation(), Orientation::SPAWN);
        assert_eq!(engine.spawn_position(PieceKind::I), Position::new(0, 3));
        assert_eq!(engine.spawn_position(PieceKind::O), Position::new(0, 4));
    }

    #[test]
    fn test_spawn_collision_sets_game_over() {
        let mut engine = BoardEngine::from_ascii(
            6,
            "
            .......
            ...I...
            ...I...
            ...I...
            ...I...
            ..TTT..
            ",
        );
        assert!(!engine.spawn(PieceKind::O));
        assert!(engine.is_game_over());
        assert!(engine.active_piece().is_none());
        assert!(!engine.spawn(PieceKind::I));
    }

    #[test]
    fn test_can_place_checks_bounds_and_cells() {
        let engine = BoardEngine::from_ascii(
            4,
            "
            ....
            ....
            ..Z.
            ...Z
            ",
        );
        let o = PieceKind::O.base_mask();
        assert!(engine.can_place(Some(o), Position::new(0, 0)));
        assert!(engine.can_place(Some(o), Position::new(2, 0)));
        assert!(!engine.can_place(Some(o), Position::new(2, 1)));
        assert!(!engine.can_place(Some(o), Position::new(3, 0)));
        assert!(!engine.can_place(Some(o), Position::new(0, -1)));
        assert!(!engine.can_place(Some(o), Position::new(0, 3)));
        assert!(engine.can_place(None, Position::new(-10, 99)));

        // vertical I has an empty leading column, so a negative anchor is fine
        let vertical_i = PieceKind::I.base_mask().rotated();
        assert!(engine.can_place(Some(vertical_i), Position::new(0, -1)));
        assert!(!engine.can_place(Some(vertical_i), Position::new(0, -2)));
    }

    #[test]
    fn test_moves_without_active_piece_fail() {
        let mut engine = BoardEngine::new();
        for mv in Move::ALL {
            assert!(!engine.apply(mv), "{mv} should fail without a piece");
        }
        assert!(!engine.reposition(Position::new(5, 5), Orientation::SPAWN));
        assert_eq!(engine.hard_drop(), None);
    }

    #[test]
    fn test_shift_stops_at_walls() {
        let mut engine = BoardEngine::new();
        engine.spawn(PieceKind::O);
        let mut shifts = 0;
        while engine.shift_left() {
            shifts += 1;
        }
        assert_eq!(shifts, 4);
        assert_eq!(active(&engine).position().col(), 0);
        let mut shifts = 0;
        while engine.shift_right() {
            shifts += 1;
        }
        assert_eq!(shifts, 8);
        assert_eq!(active(&engine).position().col(), 8);
    }

    #[test]
    fn test_rotate_blocked_leaves_piece() {
        let mut engine = BoardEngine::new();
        engine.spawn(PieceKind::I);
        // flat I sits on row 1 of its box; rotating needs rows 0..4 of column 4
        let before = active(&engine);
        assert!(engine.rotate());
        assert_eq!(active(&engine).orientation().quarter_turns(), 1);
        assert!(engine.rotate());
        assert!(engine.rotate());
        assert!(engine.rotate());
        assert_eq!(active(&engine), before);

        let mut engine = BoardEngine::from_ascii(
            20,
            "
            ..........
            ..........
            ....I.....
            ",
        );
        engine.spawn(PieceKind::I);
        while active(&engine).position().row() < 16 {
            assert!(engine.step_down());
        }
        // box rows 16..20, rotated cells would include the filled (19, 4)
        let before = active(&engine);
        assert!(!engine.rotate());
        assert_eq!(active(&engine), before);
    }

    #[test]
    fn test_o_rotation_is_noop_on_cells() {
        let mut engine = BoardEngine::new();
        engine.spawn(PieceKind::O);
        let cells: Vec<_> = active(&engine).occupied_cells().collect();
        for _ in 0..4 {
            assert!(engine.rotate());
            assert_eq!(active(&engine).occupied_cells().collect::<Vec<_>>(), cells);
        }
        assert_eq!(active(&engine).orientation(), Orientation::SPAWN);
    }

    #[test]
    fn test_step_down_lands_and_merges() {
        let mut engine = BoardEngine::with_size(6, 5).unwrap();
        engine.spawn(PieceKind::O);
        let id = engine.active_id();
        assert!(id.is_some());
        for row in 1..=4 {
            assert!(engine.step_down());
            assert_eq!(active(&engine).position().row(), row);
        }
        assert!(!engine.is_landed());
        assert!(engine.step_down());
        assert!(engine.is_landed());
        assert_eq!(engine.active_id(), None);
        assert_eq!(engine.board().block_at(5, 1), Some(Block::Piece(PieceKind::O)));
        assert_eq!(engine.board().block_at(4, 2), Some(Block::Piece(PieceKind::O)));

        engine.spawn(PieceKind::O);
        assert_ne!(engine.active_id(), id);
    }

    #[test]
    fn test_reposition_is_all_or_nothing() {
        let mut engine = BoardEngine::from_ascii(
            8,
            "
            ..........
            LLL.......
            L.........
            ",
        );
        engine.spawn(PieceKind::S);
        let before = active(&engine);

        // target overlaps the L at (6, 0)
        assert!(!engine.reposition(Position::new(5, 0), Orientation::from_quarter_turns(1)));
        assert_eq!(active(&engine), before);

        // out of bounds on the right
        assert!(!engine.reposition(Position::new(0, 9), Orientation::SPAWN));
        assert_eq!(active(&engine), before);

        assert!(engine.reposition(Position::new(3, 0), Orientation::from_quarter_turns(3)));
        let piece = active(&engine);
        assert_eq!(piece.position(), Position::new(3, 0));
        assert_eq!(piece.orientation().quarter_turns(), 3);
        assert_eq!(piece.mask(), PieceKind::S.base_mask().rotated_by(3));
    }

    #[test]
    fn test_hard_drop_returns_landing_anchor() {
        let mut engine = BoardEngine::from_ascii(
            20,
            "
            ...ZZ.....
            ....ZZ....
            ",
        );
        engine.spawn(PieceKind::O);
        assert_eq!(engine.hard_drop(), Some(Position::new(16, 4)));
        assert!(engine.is_landed());
    }

    #[test]
    fn test_line_clear_accumulator_drains() {
        let mut engine = BoardEngine::from_ascii(
            20,
            "
            JJJJJJJJ..
            LLLLLLLL..
            ",
        );
        engine.spawn(PieceKind::O);
        for _ in 0..4 {
            engine.shift_right();
        }
        engine.hard_drop();
        assert_eq!(engine.statistics().cleared, 2);
        assert_eq!(engine.statistics().cleared, 2);
        assert_eq!(engine.clear_full_rows(), 2);
        assert_eq!(engine.clear_full_rows(), 0);
        assert_eq!(engine.statistics(), BoardStatistics::default());
    }

    #[test]
    fn test_clear_full_rows_on_prefilled_board() {
        let mut engine = BoardEngine::from_ascii(4, "....\nIIII");
        assert_eq!(engine.clear_full_rows(), 1);
        assert_eq!(engine.clear_full_rows(), 0);
        assert_eq!(engine.board().topmost_occupied_row(), None);
    }

    #[test]
    fn test_fork_is_independent() {
        let mut engine = BoardEngine::from_ascii(4, "III.\nIII.");
        engine.spawn(PieceKind::I);
        let mut fork = engine.fork();
        assert!(fork.reposition(Position::new(0, 2), Orientation::from_quarter_turns(1)));
        fork.hard_drop();
        assert_eq!(fork.statistics().cleared, 2);

        assert_eq!(active(&engine).orientation(), Orientation::SPAWN);
        assert_eq!(engine.board().holes(), 0);
        assert_eq!(engine.statistics().cleared, 0);
    }

    #[test]
    fn test_snapshot_overlays_active_piece() {
        let mut engine = BoardEngine::with_size(4, 4).unwrap();
        engine.spawn(PieceKind::T);
        assert_eq!(engine.to_string(), "..T.\n.TTT\n....\n....");
        assert!(engine.board().labels().all(|label| label == 0));
        assert_eq!(engine.snapshot().labels().filter(|&l| l == 7).count(), 4);
    }
}
