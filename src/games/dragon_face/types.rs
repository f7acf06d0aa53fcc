//! Core domain types for Dragon Face: players, coordinates, pieces and the board.

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Number of rows on the board, Sacrifice Zone included.
pub const ROWS: usize = 11;

/// Number of columns on the board, Sacrifice Zone included.
pub const COLS: usize = 9;

/// Player in the game.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter, derive_more::Display,
)]
pub enum Player {
    /// Player 1 (the session host, moves first, advances toward row 0).
    #[display("Player 1")]
    One,
    /// Player 2 (the joiner, advances toward row 10).
    #[display("Player 2")]
    Two,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }

    /// Returns the player number (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 2,
        }
    }

    /// Row delta of one step "forward" for this player's Governors.
    pub fn forward(self) -> i8 {
        match self {
            Player::One => -1,
            Player::Two => 1,
        }
    }

    /// The opponent's back row, where this player's Governors trigger a rescue.
    pub fn promotion_row(self) -> u8 {
        match self {
            Player::One => 1,
            Player::Two => 9,
        }
    }
}

/// A square on the 11x9 grid.
///
/// Always inside the grid: construction goes through [`Coord::new`] or
/// [`Coord::offset`], both of which reject anything outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawCoord")]
pub struct Coord {
    row: u8,
    col: u8,
}

/// Unchecked wire form of a [`Coord`].
#[derive(Deserialize)]
struct RawCoord {
    row: u8,
    col: u8,
}

impl TryFrom<RawCoord> for Coord {
    type Error = String;

    fn try_from(raw: RawCoord) -> Result<Self, Self::Error> {
        Coord::new(raw.row, raw.col)
            .ok_or_else(|| format!("Square ({}, {}) is off the board", raw.row, raw.col))
    }
}

impl Coord {
    /// Creates a coordinate, or `None` if it lies outside the grid.
    pub fn new(row: u8, col: u8) -> Option<Self> {
        Board::is_within_bounds(i16::from(row), i16::from(col)).then_some(Self { row, col })
    }

    /// Row index (0-10).
    pub fn row(self) -> u8 {
        self.row
    }

    /// Column index (0-8).
    pub fn col(self) -> u8 {
        self.col
    }

    /// Returns the coordinate `dr` rows and `dc` columns away, if still on the grid.
    pub fn offset(self, dr: i8, dc: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(dr);
        let col = i16::from(self.col) + i16::from(dc);
        if Board::is_within_bounds(row, col) {
            Some(Self {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// True for the 9x7 interior; false for the Sacrifice Zone ring.
    pub fn is_playable(self) -> bool {
        Board::is_playable(i16::from(self.row), i16::from(self.col))
    }

    /// Every coordinate of the grid in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..ROWS as u8).flat_map(|row| (0..COLS as u8).map(move |col| Coord { row, col }))
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The three kinds of piece.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display,
)]
pub enum PieceKind {
    /// Moves forward one step (two on its first move), captures diagonally forward.
    Governor,
    /// Slides in all eight directions, captures by jumping the first piece met.
    Ambassador,
    /// Moves one step in any direction; losing it loses the game.
    Emperor,
}

/// A piece standing on the board.
///
/// Pieces are plain values: a capture changes the owner in place instead of
/// removing the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Piece {
    kind: PieceKind,
    owner: Player,
    is_trapped: bool,
    /// Only meaningful for Governors.
    has_moved: bool,
}

impl Piece {
    fn fresh(kind: PieceKind, owner: Player) -> Self {
        Self {
            kind,
            owner,
            is_trapped: false,
            has_moved: false,
        }
    }

    /// A Governor that has not moved yet.
    pub fn governor(owner: Player) -> Self {
        Self::fresh(PieceKind::Governor, owner)
    }

    /// An untrapped Ambassador.
    pub fn ambassador(owner: Player) -> Self {
        Self::fresh(PieceKind::Ambassador, owner)
    }

    /// An Emperor.
    pub fn emperor(owner: Player) -> Self {
        Self::fresh(PieceKind::Emperor, owner)
    }

    /// Returns this piece marked as trapped.
    pub fn trapped(mut self) -> Self {
        self.is_trapped = true;
        self
    }

    /// Returns this piece marked as having moved (drops a Governor's double step).
    pub fn moved(mut self) -> Self {
        self.has_moved = true;
        self
    }

    /// Piece kind.
    pub fn kind(&self) -> PieceKind {
        self.kind
    }

    /// Current owner.
    pub fn owner(&self) -> Player {
        self.owner
    }

    /// Whether the piece sits in the Sacrifice Zone awaiting rescue.
    pub fn is_trapped(&self) -> bool {
        self.is_trapped
    }

    /// Whether a Governor has used its opening move.
    pub fn has_moved(&self) -> bool {
        self.has_moved
    }

    pub(crate) fn set_owner(&mut self, owner: Player) {
        self.owner = owner;
    }

    pub(crate) fn set_trapped(&mut self, trapped: bool) {
        self.is_trapped = trapped;
    }

    pub(crate) fn mark_moved(&mut self) {
        self.has_moved = true;
    }

    /// One-letter symbol: uppercase for player 1, lowercase for player 2.
    pub fn symbol(&self) -> char {
        let letter = match self.kind {
            PieceKind::Governor => 'G',
            PieceKind::Ambassador => 'A',
            PieceKind::Emperor => 'E',
        };
        match self.owner {
            Player::One => letter,
            Player::Two => letter.to_ascii_lowercase(),
        }
    }
}

/// The 11x9 Dragon Face board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order.
    cells: [[Option<Piece>; COLS]; ROWS],
}

impl Board {
    /// Creates a board with the standard starting layout.
    #[instrument]
    pub fn new() -> Self {
        let mut board = Self::empty();
        for player in Player::iter() {
            // Each side starts on the row the opponent promotes on.
            let back_row = player.opponent().promotion_row();
            let governor_row = back_row.saturating_add_signed(player.forward());
            for col in 1..(COLS as u8 - 1) {
                let back = if col == 4 {
                    Piece::emperor(player)
                } else {
                    Piece::ambassador(player)
                };
                board.cells[back_row as usize][col as usize] = Some(back);
                board.cells[governor_row as usize][col as usize] = Some(Piece::governor(player));
            }
        }
        board
    }

    /// Creates a board with no pieces.
    pub fn empty() -> Self {
        Self {
            cells: [[None; COLS]; ROWS],
        }
    }

    /// True if `(row, col)` lies on the 11x9 grid.
    pub fn is_within_bounds(row: i16, col: i16) -> bool {
        (0..ROWS as i16).contains(&row) && (0..COLS as i16).contains(&col)
    }

    /// True if `(row, col)` lies in the 9x7 interior.
    pub fn is_playable(row: i16, col: i16) -> bool {
        row > 0 && row < ROWS as i16 - 1 && col > 0 && col < COLS as i16 - 1
    }

    /// Gets the piece at the given coordinate.
    pub fn get(&self, at: Coord) -> Option<Piece> {
        self.cells[at.row() as usize][at.col() as usize]
    }

    /// Writes a cell. No rule checks happen here.
    pub fn set(&mut self, at: Coord, piece: Option<Piece>) {
        self.cells[at.row() as usize][at.col() as usize] = piece;
    }

    /// Checks if a cell is empty.
    pub fn is_empty(&self, at: Coord) -> bool {
        self.get(at).is_none()
    }

    /// All occupied cells in row-major order.
    pub fn pieces(&self) -> impl Iterator<Item = (Coord, Piece)> + '_ {
        Coord::all().filter_map(|at| self.get(at).map(|piece| (at, piece)))
    }

    /// Number of pieces on the board.
    pub fn piece_count(&self) -> usize {
        self.pieces().count()
    }

    /// Number of pieces currently owned by `player`.
    pub fn count_for(&self, player: Player) -> usize {
        self.pieces().filter(|(_, p)| p.owner() == player).count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
