use std::fmt;

use crate::BoardSizeError;

use super::piece::{Piece, PieceKind, Position, ShapeMask};

/// A single cell of the board.
///
/// `Block` keeps the kind of the piece that filled the cell so boards can be
/// rendered with per-piece labels. Gameplay only distinguishes empty from filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell filled by a landed piece of the given type.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub fn is_empty(self) -> bool {
        self == Block::Empty
    }

    /// Integer label of the cell: `0` when empty, the piece's color id otherwise.
    #[must_use]
    pub fn label(self) -> u8 {
        match self {
            Block::Empty => 0,
            Block::Piece(kind) => kind.color_id(),
        }
    }

    #[must_use]
    pub fn from_label(label: u8) -> Option<Self> {
        if label == 0 {
            return Some(Block::Empty);
        }
        PieceKind::from_color_id(label).map(Block::Piece)
    }

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Block::Empty => '.',
            Block::Piece(kind) => kind.as_char(),
        }
    }
}

/// Rectangular grid of landed blocks.
///
/// Row `0` is the top of the board. The board owns only landed cells; the
/// falling piece is tracked by [`BoardEngine`](crate::BoardEngine) and merged
/// into the grid when it lands.
///
/// # Example
///
/// ```
/// use tetrobot_engine::Board;
///
/// let board = Board::from_ascii(
///     4,
///     "
///     ....
///     .I..
///     OOI.
///     ",
/// );
/// assert_eq!(board.column_height(0), 1);
/// assert_eq!(board.column_height(1), 2);
/// assert_eq!(board.holes(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: u8,
    cols: u8,
    cells: Vec<Block>,
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for block in row {
                write!(f, "{}", block.as_char())?;
            }
        }
        Ok(())
    }
}

impl Board {
    /// Smallest accepted side length: the bounding box of an I-piece.
    pub const MIN_SIZE: usize = 4;
    pub const MAX_SIZE: usize = 255;

    /// Creates an empty board.
    pub fn new(rows: usize, cols: usize) -> Result<Self, BoardSizeError> {
        let valid = Self::MIN_SIZE..=Self::MAX_SIZE;
        let (Some(rows_u8), Some(cols_u8)) = (
            u8::try_from(rows).ok().filter(|_| valid.contains(&rows)),
            u8::try_from(cols).ok().filter(|_| valid.contains(&cols)),
        ) else {
            return Err(BoardSizeError { rows, cols });
        };
        Ok(Self {
            rows: rows_u8,
            cols: cols_u8,
            cells: vec![Block::Empty; rows * cols],
        })
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        usize::from(self.rows)
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        usize::from(self.cols)
    }

    fn index(&self, row: i32, col: i32) -> Option<usize> {
        let row = usize::try_from(row).ok().filter(|&r| r < self.rows())?;
        let col = usize::try_from(col).ok().filter(|&c| c < self.cols())?;
        Some(row * self.cols() + col)
    }

    /// Returns the block at `(row, col)`, or `None` outside the board.
    #[must_use]
    pub fn block_at(&self, row: i32, col: i32) -> Option<Block> {
        self.index(row, col).map(|i| self.cells[i])
    }

    /// Whether `(row, col)` is inside the board and empty.
    #[must_use]
    pub fn is_vacant(&self, row: i32, col: i32) -> bool {
        self.block_at(row, col).is_some_and(Block::is_empty)
    }

    /// Whether every filled cell of `mask` anchored at `position` is inside the
    /// board and empty.
    #[must_use]
    pub fn fits(&self, mask: ShapeMask, position: Position) -> bool {
        mask.cells().all(|(dr, dc)| {
            self.is_vacant(
                position.row() + i32::from(dr),
                position.col() + i32::from(dc),
            )
        })
    }

    /// Writes the piece's cells into the grid.
    ///
    /// Cells outside the board are ignored.
    pub fn fill_piece(&mut self, piece: &Piece) {
        for (row, col) in piece.occupied_cells() {
            if let Some(i) = self.index(row, col) {
                self.cells[i] = Block::Piece(piece.kind());
            }
        }
    }

    /// Panics if `(row, col)` is outside the board.
    pub(crate) fn set_block(&mut self, row: usize, col: usize, block: Block) {
        assert!(row < self.rows() && col < self.cols());
        let cols = self.cols();
        self.cells[row * cols + col] = block;
    }

    /// Iterates over the rows from top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[Block]> {
        self.cells.chunks_exact(self.cols())
    }

    /// Integer labels of the grid in row-major order.
    pub fn labels(&self) -> impl Iterator<Item = u8> + '_ {
        self.cells.iter().map(|block| block.label())
    }

    fn row(&self, row: usize) -> &[Block] {
        let cols = self.cols();
        &self.cells[row * cols..][..cols]
    }

    fn is_row_filled(&self, row: usize) -> bool {
        self.row(row).iter().all(|b| !b.is_empty())
    }

    /// Removes every completely filled row and returns how many were removed.
    ///
    /// Rows above a removed row shift down; new empty rows appear at the top.
    pub fn clear_full_rows(&mut self) -> usize {
        let cols = self.cols();
        let mut count = 0;
        for row in (0..self.rows()).rev() {
            if self.is_row_filled(row) {
                count += 1;
                continue;
            }
            if count > 0 {
                self.cells
                    .copy_within(row * cols..(row + 1) * cols, (row + count) * cols);
            }
        }
        self.cells[..count * cols].fill(Block::Empty);
        count
    }

    /// Index of the highest row containing a filled cell.
    #[must_use]
    pub fn topmost_occupied_row(&self) -> Option<usize> {
        (0..self.rows()).find(|&row| self.row(row).iter().any(|b| !b.is_empty()))
    }

    /// Height of column `col`: `rows - r` where `r` is its highest filled row,
    /// or `0` for an empty column.
    #[must_use]
    pub fn column_height(&self, col: usize) -> usize {
        (0..self.rows())
            .find(|&row| !self.row(row)[col].is_empty())
            .map_or(0, |top| self.rows() - top)
    }

    /// Empty cells in column `col` that lie below its highest filled cell.
    #[must_use]
    pub fn column_holes(&self, col: usize) -> usize {
        let height = self.column_height(col);
        (self.rows() - height..self.rows())
            .filter(|&row| self.row(row)[col].is_empty())
            .count()
    }

    /// Total number of holes over all columns.
    #[must_use]
    pub fn holes(&self) -> usize {
        (0..self.cols()).map(|col| self.column_holes(col)).sum()
    }

    /// Builds a board with `rows` rows from ASCII art aligned to the bottom.
    ///
    /// Each non-blank line is one row; `.` is empty and a piece letter
    /// (`I J L O S Z T`) is a cell filled by that piece. Rows not covered by the
    /// art are empty. Intended for tests and fixtures.
    ///
    /// # Panics
    ///
    /// Panics if the art is empty, ragged, taller than `rows`, or contains an
    /// unknown character.
    #[must_use]
    pub fn from_ascii(rows: usize, art: &str) -> Self {
        let lines: Vec<&str> = art
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        assert!(!lines.is_empty(), "board art must contain at least one row");
        assert!(lines.len() <= rows, "board art has more than {rows} rows");
        let cols = lines[0].chars().count();
        let mut board = match Self::new(rows, cols) {
            Ok(board) => board,
            Err(e) => panic!("invalid board art: {e}"),
        };
        let offset = rows - lines.len();
        for (i, line) in lines.iter().enumerate() {
            assert_eq!(line.chars().count(), cols, "ragged board art: {line:?}");
            for (col, c) in line.chars().enumerate() {
                let block = match c {
                    '.' => Block::Empty,
                    c => match PieceKind::from_char(c) {
                        Some(kind) => Block::Piece(kind),
                        None => panic!("unknown board cell {c:?}"),
                    },
                };
                board.set_block(offset + i, col, block);
            }
        }
        board
    }
}
