use crate::engine::zobrist::{dimensions_key, piece_key};
use crate::engine::Move;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The four orthogonal steps, in the order every scan in the engine uses.
pub const DIRECTIONS: [(i32, i32); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Default board dimensions used by the host when none are given.
pub const DEFAULT_ROWS: i32 = 13;
pub const DEFAULT_COLS: i32 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    Circle,
    Square,
}

impl Player {
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Circle => Self::Square,
            Self::Square => Self::Circle,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Circle => write!(f, "circle"),
            Self::Square => write!(f, "square"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Horizontal => Self::Vertical,
            Self::Vertical => Self::Horizontal,
        }
    }

    /// The two steps a piece can flow along on a river with this orientation.
    pub const fn axis(self) -> [(i32, i32); 2] {
        match self {
            Self::Horizontal => [(1, 0), (-1, 0)],
            Self::Vertical => [(0, 1), (0, -1)],
        }
    }
}

/// Which face of a piece is up. A river carries its orientation; a stone has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Stone,
    River(Orientation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PieceJson", into = "PieceJson")]
pub struct Piece {
    pub owner: Player,
    pub side: Side,
}

impl Piece {
    pub const fn stone(owner: Player) -> Self {
        Self {
            owner,
            side: Side::Stone,
        }
    }

    pub const fn river(owner: Player, orientation: Orientation) -> Self {
        Self {
            owner,
            side: Side::River(orientation),
        }
    }

    pub const fn is_stone(self) -> bool {
        matches!(self.side, Side::Stone)
    }

    pub const fn is_river(self) -> bool {
        matches!(self.side, Side::River(_))
    }

    pub const fn orientation(self) -> Option<Orientation> {
        match self.side {
            Side::Stone => None,
            Side::River(o) => Some(o),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum SideJson {
    Stone,
    River,
}

/// Wire shape of a piece: `{"owner": "circle", "side": "river", "orientation": "vertical"}`.
#[derive(Serialize, Deserialize)]
struct PieceJson {
    owner: Player,
    #[serde(default = "default_side")]
    side: SideJson,
    #[serde(default)]
    orientation: Option<Orientation>,
}

const fn default_side() -> SideJson {
    SideJson::Stone
}

impl From<PieceJson> for Piece {
    fn from(json: PieceJson) -> Self {
        let side = match json.side {
            SideJson::Stone => Side::Stone,
            SideJson::River => Side::River(json.orientation.unwrap_or(Orientation::Horizontal)),
        };
        Self {
            owner: json.owner,
            side,
        }
    }
}

impl From<Piece> for PieceJson {
    fn from(piece: Piece) -> Self {
        let (side, orientation) = match piece.side {
            Side::Stone => (SideJson::Stone, None),
            Side::River(o) => (SideJson::River, Some(o)),
        };
        Self {
            owner: piece.owner,
            side,
            orientation,
        }
    }
}

/// A grid coordinate: `x` is the column, `y` the row. Serialized as `[x, y]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    pub const fn manhattan(self, other: Self) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

impl From<[i32; 2]> for Position {
    fn from([x, y]: [i32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Position> for [i32; 2] {
    fn from(pos: Position) -> Self {
        [pos.x, pos.y]
    }
}

/// Scoring columns for a board `cols` wide: a centred band 4, 5 or 6 wide.
pub fn score_cols_for(cols: i32) -> Vec<i32> {
    let width = if cols <= 12 {
        4
    } else if cols <= 14 {
        5
    } else {
        6
    };
    let start = ((cols - width) / 2).max(0);
    (start..start + width).collect()
}

/// Stones needed on the scoring row to win, scaled with board width.
pub const fn win_count(cols: i32) -> usize {
    if cols <= 12 {
        4
    } else if cols <= 14 {
        5
    } else {
        6
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: i32,
    cols: i32,
    cells: Vec<Option<Piece>>,
    score_cols: Vec<i32>,
    signature: u64,
}

impl Default for Board {
    fn default() -> Self {
        Self::standard(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl Board {
    /// An empty board with the scoring columns derived from `cols`.
    #[must_use]
    pub fn new(rows: i32, cols: i32) -> Self {
        Self::with_score_cols(rows, cols, score_cols_for(cols))
    }

    #[must_use]
    pub fn with_score_cols(rows: i32, cols: i32, score_cols: Vec<i32>) -> Self {
        let rows = rows.max(0);
        let cols = cols.max(0);
        #[allow(clippy::cast_sign_loss)]
        let size = (rows * cols) as usize;
        Self {
            rows,
            cols,
            cells: vec![None; size],
            score_cols,
            signature: dimensions_key(rows, cols),
        }
    }

    /// Start position: each side has `cols` stones in two centred rows,
    /// square on rows 3-4 and circle on rows `rows-5`, `rows-4`.
    #[must_use]
    pub fn standard(rows: i32, cols: i32) -> Self {
        let mut board = Self::new(rows, cols);
        let per_row = cols / 2;
        let start_col = (cols - per_row) / 2;

        for (player, band) in [
            (Player::Square, [3, 4]),
            (Player::Circle, [rows - 5, rows - 4]),
        ] {
            for y in band {
                for x in start_col..start_col + per_row {
                    board.set(Position::new(x, y), Some(Piece::stone(player)));
                }
            }
        }
        board
    }

    pub const fn rows(&self) -> i32 {
        self.rows
    }

    pub const fn cols(&self) -> i32 {
        self.cols
    }

    pub fn score_cols(&self) -> &[i32] {
        &self.score_cols
    }

    /// Content signature, maintained incrementally on every `set`.
    pub const fn signature(&self) -> u64 {
        self.signature
    }

    #[must_use]
    pub const fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.cols && pos.y >= 0 && pos.y < self.rows
    }

    fn index(&self, pos: Position) -> Option<usize> {
        if self.in_bounds(pos) {
            #[allow(clippy::cast_sign_loss)]
            Some((pos.y * self.cols + pos.x) as usize)
        } else {
            None
        }
    }

    /// The piece at `pos`, or `None` for an empty or out-of-bounds cell.
    #[must_use]
    pub fn get(&self, pos: Position) -> Option<Piece> {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx).copied().flatten())
    }

    /// True only for an in-bounds cell with no piece on it.
    #[must_use]
    pub fn is_empty(&self, pos: Position) -> bool {
        self.index(pos)
            .and_then(|idx| self.cells.get(idx))
            .is_some_and(Option::is_none)
    }

    pub fn set(&mut self, pos: Position, piece: Option<Piece>) {
        let Some(idx) = self.index(pos) else {
            return;
        };
        let Some(slot) = self.cells.get_mut(idx) else {
            return;
        };
        if let Some(old) = slot.take() {
            self.signature ^= piece_key(idx, old);
        }
        if let Some(new) = piece {
            self.signature ^= piece_key(idx, new);
        }
        *slot = piece;
    }

    /// Row a player scores on: circle at the top (row 2), square at the bottom.
    pub const fn goal_row(&self, player: Player) -> i32 {
        match player {
            Player::Circle => 2,
            Player::Square => self.rows - 3,
        }
    }

    #[must_use]
    pub fn is_my_score_cell(&self, pos: Position, player: Player) -> bool {
        pos.y == self.goal_row(player) && self.score_cols.contains(&pos.x)
    }

    /// The cells `player` may never enter: the other side's scoring cells.
    #[must_use]
    pub fn is_opponent_score_cell(&self, pos: Position, player: Player) -> bool {
        self.is_my_score_cell(pos, player.opposite())
    }

    pub fn goal_cells(&self, player: Player) -> Vec<Position> {
        let row = self.goal_row(player);
        self.score_cols
            .iter()
            .map(|&x| Position::new(x, row))
            .collect()
    }

    pub const fn win_count(&self) -> usize {
        win_count(self.cols)
    }

    /// Stones of `player` sitting on their own scoring cells.
    pub fn scoring_stones(&self, player: Player) -> usize {
        self.goal_cells(player)
            .into_iter()
            .filter(|&p| {
                self.get(p)
                    .is_some_and(|piece| piece.owner == player && piece.is_stone())
            })
            .count()
    }

    /// The winner, if either side has reached the win count. Circle is checked first.
    pub fn check_win(&self) -> Option<Player> {
        let needed = self.win_count();
        [Player::Circle, Player::Square]
            .into_iter()
            .find(|&p| self.scoring_stones(p) >= needed)
    }

    /// Every cell in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> {
        let cols = self.cols;
        (0..self.rows).flat_map(move |y| (0..cols).map(move |x| Position::new(x, y)))
    }

    /// Occupied cells with their pieces, row-major.
    pub fn pieces(&self) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.positions()
            .filter_map(|pos| self.get(pos).map(|piece| (pos, piece)))
    }

    pub fn pieces_of(&self, player: Player) -> impl Iterator<Item = (Position, Piece)> + '_ {
        self.pieces().filter(move |(_, p)| p.owner == player)
    }

    pub fn stones_of(&self, player: Player) -> impl Iterator<Item = Position> + '_ {
        self.pieces_of(player)
            .filter(|(_, p)| p.is_stone())
            .map(|(pos, _)| pos)
    }

    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// Applies `mv` in place. Moves whose source cell is empty or off the
    /// board leave the board untouched.
    pub fn apply_move(&mut self, mv: &Move) {
        match *mv {
            Move::Move { from, to } => {
                let Some(piece) = self.get(from) else {
                    return;
                };
                if !self.in_bounds(to) {
                    return;
                }
                self.set(from, None);
                self.set(to, Some(piece));
            }
            Move::Push {
                from,
                over,
                pushed_to,
            } => {
                let (Some(pusher), Some(pushed)) = (self.get(from), self.get(over)) else {
                    return;
                };
                if !self.in_bounds(pushed_to) {
                    return;
                }
                self.set(from, None);
                // A river that pushes lands as a stone.
                self.set(over, Some(Piece::stone(pusher.owner)));
                self.set(pushed_to, Some(pushed));
            }
            Move::Flip { from, orientation } => {
                let Some(piece) = self.get(from) else {
                    return;
                };
                let side = match (piece.side, orientation) {
                    (Side::Stone, Some(o)) => Side::River(o),
                    (Side::Stone, None) => return,
                    (Side::River(_), _) => Side::Stone,
                };
                self.set(from, Some(Piece { side, ..piece }));
            }
            Move::Rotate { from } => {
                if let Some(Piece {
                    owner,
                    side: Side::River(o),
                }) = self.get(from)
                {
                    self.set(from, Some(Piece::river(owner, o.toggled())));
                }
            }
        }
    }

    /// Copy-on-write application: returns the successor board.
    #[must_use]
    pub fn with_move(&self, mv: &Move) -> Self {
        let mut next = self.clone();
        next.apply_move(mv);
        next
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "   ")?;
        for x in 0..self.cols {
            write!(f, "{x:>3}")?;
        }
        writeln!(f)?;

        for y in 0..self.rows {
            write!(f, "{y:>2} ")?;
            for x in 0..self.cols {
                let pos = Position::new(x, y);
                let glyph = match self.get(pos) {
                    None if self.is_my_score_cell(pos, Player::Circle) => "  c",
                    None if self.is_my_score_cell(pos, Player::Square) => "  s",
                    None => "  .",
                    Some(piece) => match (piece.owner, piece.side) {
                        (Player::Circle, Side::Stone) => "  O",
                        (Player::Square, Side::Stone) => "  X",
                        (Player::Circle, Side::River(Orientation::Horizontal)) => " O-",
                        (Player::Circle, Side::River(Orientation::Vertical)) => " O|",
                        (Player::Square, Side::River(Orientation::Horizontal)) => " X-",
                        (Player::Square, Side::River(Orientation::Vertical)) => " X|",
                    },
                };
                write!(f, "{glyph}")?;
            }
            if y == self.goal_row(Player::Circle) {
                write!(f, "   <- circle scores here")?;
            } else if y == self.goal_row(Player::Square) {
                write!(f, "   <- square scores here")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
