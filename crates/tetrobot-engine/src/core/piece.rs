use std::fmt;

use serde::{Deserialize, Serialize};

/// A Tetris piece (tetromino) with its current shape, orientation, and anchor.
///
/// Pieces are plain values: movement and rotation return new `Piece` instances and
/// never touch a board. Whether a piece state is legal is decided by
/// [`BoardEngine::can_place`](crate::BoardEngine::can_place).
///
/// # Coordinate System
///
/// - The anchor is the top-left corner of the piece's square bounding box
/// - Rows increase downward, columns increase rightward
/// - The anchor may lie outside the board (e.g. column `-1`) as long as every
///   filled cell of the mask is inside it
///
/// # Example
///
/// ```
/// use tetrobot_engine::{Orientation, Piece, PieceKind, Position};
///
/// let piece = Piece::new(PieceKind::T, Position::new(0, 4));
/// let rotated = piece.rotated();
/// assert_eq!(rotated.orientation(), Orientation::from_quarter_turns(1));
/// assert_eq!(rotated.rotated().rotated().rotated(), piece);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    kind: PieceKind,
    orientation: Orientation,
    mask: ShapeMask,
    position: Position,
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Format: "kind#turns@row,col" (e.g., "S#1@4,-1")
        write!(
            f,
            "{}#{}@{},{}",
            self.kind.as_char(),
            self.orientation.quarter_turns(),
            self.position.row,
            self.position.col
        )
    }
}

impl Piece {
    /// Creates a piece in its base orientation at the given anchor.
    #[must_use]
    pub fn new(kind: PieceKind, position: Position) -> Self {
        Self {
            kind,
            orientation: Orientation::SPAWN,
            mask: kind.base_mask(),
            position,
        }
    }

    #[must_use]
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    #[must_use]
    pub fn mask(&self) -> ShapeMask {
        self.mask
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn moved_to(&self, position: Position) -> Self {
        Self { position, ..*self }
    }

    /// Returns the piece turned a quarter counter-clockwise in place.
    #[must_use]
    pub fn rotated(&self) -> Self {
        Self {
            orientation: self.orientation.rotated(),
            mask: self.mask.rotated(),
            ..*self
        }
    }

    /// Returns the piece turned to `target` using the fewest quarter turns.
    #[must_use]
    pub fn rotated_to(&self, target: Orientation) -> Self {
        let turns = self.orientation.quarter_turns_to(target);
        Self {
            orientation: target,
            mask: self.mask.rotated_by(turns),
            ..*self
        }
    }

    /// Board coordinates `(row, col)` of every filled cell.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.mask.cells().map(move |(dr, dc)| {
            (
                self.position.row + i32::from(dr),
                self.position.col + i32::from(dc),
            )
        })
    }
}

/// Anchor of a piece on the board: the top-left corner of its bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Position {
    row: i32,
    col: i32,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl Position {
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> i32 {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> i32 {
        self.col
    }

    #[must_use]
    pub const fn left(self) -> Self {
        Self::new(self.row, self.col - 1)
    }

    #[must_use]
    pub const fn right(self) -> Self {
        Self::new(self.row, self.col + 1)
    }

    #[must_use]
    pub const fn down(self) -> Self {
        Self::new(self.row + 1, self.col)
    }
}

/// Orientation of a piece, counted in counter-clockwise quarter turns from spawn.
///
/// - `0`: 0° (spawn orientation)
/// - `1`: 90°
/// - `2`: 180°
/// - `3`: 270°
///
/// Rotation wraps around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation(u8);

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

impl Orientation {
    pub const SPAWN: Self = Self(0);

    #[must_use]
    pub const fn from_quarter_turns(turns: u8) -> Self {
        Self(turns % 4)
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn degrees(self) -> u16 {
        u16::from(self.0) * 90
    }

    #[must_use]
    pub const fn rotated(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    /// Number of quarter turns (0-3) needed to go from `self` to `target`.
    #[must_use]
    pub const fn quarter_turns_to(self, target: Self) -> u8 {
        (target.0 + 4 - self.0) % 4
    }
}

/// Enum representing the type of piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece.
    I = 0,
    /// J-piece.
    J = 1,
    /// L-piece.
    L = 2,
    /// O-piece.
    O = 3,
    /// S-piece.
    S = 4,
    /// Z-piece.
    Z = 5,
    /// T-piece.
    T = 6,
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl PieceKind {
    /// Number of piece types (7).
    pub const LEN: usize = 7;

    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::T,
    ];

    /// Shape mask in the base (spawn) orientation.
    #[must_use]
    pub const fn base_mask(self) -> ShapeMask {
        SHAPE_MASKS[self as usize]
    }

    /// Nonzero cell label written into the board when this piece lands.
    ///
    /// Labels only identify the piece for rendering; gameplay treats every
    /// nonzero label the same.
    #[must_use]
    pub const fn color_id(self) -> u8 {
        self as u8 + 1
    }

    #[must_use]
    pub const fn from_color_id(id: u8) -> Option<Self> {
        match id {
            1..=7 => Some(Self::ALL[(id - 1) as usize]),
            _ => None,
        }
    }

    /// Returns the single character representation of this piece kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrobot_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::I.as_char(), 'I');
    /// assert_eq!(PieceKind::T.as_char(), 'T');
    /// ```
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            PieceKind::I => 'I',
            PieceKind::J => 'J',
            PieceKind::L => 'L',
            PieceKind::O => 'O',
            PieceKind::S => 'S',
            PieceKind::Z => 'Z',
            PieceKind::T => 'T',
        }
    }

    /// Parses a piece kind from a single character.
    ///
    /// # Examples
    ///
    /// ```
    /// use tetrobot_engine::PieceKind;
    ///
    /// assert_eq!(PieceKind::from_char('O'), Some(PieceKind::O));
    /// assert_eq!(PieceKind::from_char('X'), None);
    /// ```
    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(PieceKind::I),
            'J' => Some(PieceKind::J),
            'L' => Some(PieceKind::L),
            'O' => Some(PieceKind::O),
            'S' => Some(PieceKind::S),
            'Z' => Some(PieceKind::Z),
            'T' => Some(PieceKind::T),
            _ => None,
        }
    }
}

/// 0/1 mask of a piece inside its square bounding box (2×2, 3×3 or 4×4).
///
/// Each row is stored as a bitmask where bit `c` is column `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeMask {
    size: u8,
    rows: [u8; 4],
}

impl ShapeMask {
    const fn new(size: u8, rows: [u8; 4]) -> Self {
        assert!(size as usize <= 4);
        Self { size, rows }
    }

    /// Side length of the bounding box.
    #[must_use]
    pub const fn size(self) -> usize {
        self.size as usize
    }

    #[must_use]
    pub const fn is_filled(self, row: u8, col: u8) -> bool {
        row < self.size && col < self.size && (self.rows[row as usize] & (1 << col)) != 0
    }

    /// `(row, col)` offsets of the filled cells, in row-major order.
    pub fn cells(self) -> impl Iterator<Item = (u8, u8)> {
        (0..self.size).flat_map(move |row| {
            (0..self.size)
                .filter(move |&col| self.is_filled(row, col))
                .map(move |col| (row, col))
        })
    }

    /// Rotates the mask 90° counter-clockwise within its bounding box.
    #[must_use]
    pub fn rotated(self) -> Self {
        let n = self.size;
        let mut rows = [0; 4];
        for (i, row) in (0..n).zip(rows.iter_mut()) {
            for j in 0..n {
                if self.is_filled(j, n - 1 - i) {
                    *row |= 1 << j;
                }
            }
        }
        Self { size: n, rows }
    }

    #[must_use]
    pub fn rotated_by(self, quarter_turns: u8) -> Self {
        (0..quarter_turns % 4).fold(self, |mask, _| mask.rotated())
    }

    /// Horizontal footprint as `(leading_empty_columns, effective_width)`.
    ///
    /// `effective_width` counts the columns containing at least one filled cell.
    /// Returns `None` for an empty mask.
    #[must_use]
    pub fn column_span(self) -> Option<(usize, usize)> {
        let columns = self.rows.iter().fold(0, |acc, row| acc | row);
        if columns == 0 {
            return None;
        }
        Some((
            columns.trailing_zeros() as usize,
            columns.count_ones() as usize,
        ))
    }
}

const SHAPE_MASKS: [ShapeMask; PieceKind::LEN] = {
    const fn m(bits: [bool; 4]) -> u8 {
        let mut mask = 0;
        let mut i = 0;
        while i < 4 {
            if bits[i] {
                mask |= 1 << i;
            }
            i += 1;
        }
        mask
    }

    const C: bool = true;
    const E: bool = false;
    const EEEE: u8 = m([E; 4]);

    [
        // I-piece
        ShapeMask::new(4, [EEEE, m([C, C, C, C]), EEEE, EEEE]),
        // J-piece
        ShapeMask::new(3, [m([C, E, E, E]), m([C, C, C, E]), EEEE, EEEE]),
        // L-piece
        ShapeMask::new(3, [m([E, E, C, E]), m([C, C, C, E]), EEEE, EEEE]),
        // O-piece
        ShapeMask::new(2, [m([C, C, E, E]), m([C, C, E, E]), EEEE, EEEE]),
        // S-piece
        ShapeMask::new(3, [m([E, C, C, E]), m([C, C, E, E]), EEEE, EEEE]),
        // Z-piece
        ShapeMask::new(3, [m([C, C, E, E]), m([E, C, C, E]), EEEE, EEEE]),
        // T-piece
        ShapeMask::new(3, [m([E, C, E, E]), m([C, C, C, E]), EEEE, EEEE]),
    ]
};

#[cfg(test)]
mod tests {
    use super::*;

    fn render(mask: ShapeMask) -> Vec<String> {
        let size = u8::try_from(mask.size()).unwrap();
        (0..size)
            .map(|row| {
                (0..size)
                    .map(|col| if mask.is_filled(row, col) { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn test_every_kind_has_four_cells() {
        for kind in PieceKind::ALL {
            let mut mask = kind.base_mask();
            for _ in 0..4 {
                assert_eq!(mask.cells().count(), 4, "{kind} should have 4 cells");
                mask = mask.rotated();
            }
        }
    }

    #[test]
    fn test_rotation_is_counter_clockwise() {
        let mask = PieceKind::J.base_mask();
        assert_eq!(render(mask), ["#..", "###", "..."]);
        assert_eq!(render(mask.rotated()), [".#.", ".#.", "##."]);
        assert_eq!(render(mask.rotated_by(2)), ["...", "###", "..#"]);
    }

    #[test]
    fn test_four_rotations_return_to_base() {
        for kind in PieceKind::ALL {
            let piece = Piece::new(kind, Position::new(0, 3));
            let turned = piece.rotated().rotated().rotated().rotated();
            assert_eq!(turned, piece, "{kind} should return to its base state");
        }
    }

    #[test]
    fn test_o_rotation_keeps_cells() {
        let piece = Piece::new(PieceKind::O, Position::new(2, 2));
        let cells: Vec<_> = piece.occupied_cells().collect();
        let mut turned = piece;
        for turn in 1..=4 {
            turned = turned.rotated();
            assert_eq!(turned.occupied_cells().collect::<Vec<_>>(), cells);
            assert_eq!(turned.orientation().quarter_turns(), turn % 4);
        }
    }

    #[test]
    fn test_rotated_to_uses_shortest_turns() {
        let piece = Piece::new(PieceKind::T, Position::new(0, 0));
        let target = Orientation::from_quarter_turns(3);
        let direct = piece.rotated_to(target);
        assert_eq!(direct, piece.rotated().rotated().rotated());
        assert_eq!(direct.rotated_to(Orientation::SPAWN), piece);
        assert_eq!(Orientation::from_quarter_turns(3).quarter_turns_to(Orientation::SPAWN), 1);
    }

    #[test]
    fn test_column_span() {
        // vertical I lives in column 1 of its 4x4 box
        let vertical_i = PieceKind::I.base_mask().rotated();
        assert_eq!(vertical_i.column_span(), Some((1, 1)));
        assert_eq!(PieceKind::I.base_mask().column_span(), Some((0, 4)));
        assert_eq!(PieceKind::O.base_mask().column_span(), Some((0, 2)));
        // J turned twice keeps all three columns, turned once drops the last
        assert_eq!(PieceKind::J.base_mask().rotated().column_span(), Some((0, 2)));
        assert_eq!(PieceKind::S.base_mask().rotated().column_span(), Some((0, 2)));
        assert_eq!(
            PieceKind::S.base_mask().rotated_by(3).column_span(),
            Some((1, 2))
        );
    }

    #[test]
    fn test_occupied_cells_follow_anchor() {
        let piece = Piece::new(PieceKind::T, Position::new(5, -1));
        let cells: Vec<_> = piece.occupied_cells().collect();
        assert_eq!(cells, [(5, 0), (6, -1), (6, 0), (6, 1)]);
    }

    #[test]
    fn test_piece_kind_char_and_color_conversion() {
        for kind in PieceKind::ALL {
            assert_eq!(PieceKind::from_char(kind.as_char()), Some(kind));
            assert_eq!(PieceKind::from_color_id(kind.color_id()), Some(kind));
        }
        assert_eq!(PieceKind::I.color_id(), 1);
        assert_eq!(PieceKind::T.color_id(), 7);
        assert_eq!(PieceKind::from_color_id(0), None);
        assert_eq!(PieceKind::from_color_id(8), None);
        assert_eq!(PieceKind::from_char('x'), None);
    }

    #[test]
    fn test_piece_display() {
        let piece = Piece::new(PieceKind::S, Position::new(4, -1)).rotated();
        assert_eq!(piece.to_string(), "S#1@4,-1");
        assert_eq!(piece.orientation().to_string(), "90°");
    }
}
