//! Wire types for talking to a host: board snapshots in, moves out.
//!
//! A [`Session`] owns one [`Agent`] for the length of a match so that turn
//! count, history and cache survive between requests.

use crate::engine::config::EngineConfig;
use crate::engine::policy::Agent;
use crate::engine::{Move, SearchStats};
use crate::logic::board::{Board, Piece, Player, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug)]
pub enum SnapshotError {
    EmptyGrid,
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    TooLarge,
    ScoreColumnOutOfRange(i32),
    Json(serde_json::Error),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid => write!(f, "board grid is empty"),
            Self::RaggedRow {
                row,
                expected,
                found,
            } => write!(f, "row {row} has {found} cells, expected {expected}"),
            Self::TooLarge => write!(f, "board dimensions do not fit the grid"),
            Self::ScoreColumnOutOfRange(col) => write!(f, "score column {col} is off the board"),
            Self::Json(e) => write!(f, "invalid snapshot json: {e}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// What the host sends each turn. `board[y][x]`, row 0 at the top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub board: Vec<Vec<Option<Piece>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_cols: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub my_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avoid_repeat: Option<bool>,
}

impl Snapshot {
    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Snapshot of `board` with no clock information.
    pub fn from_board(board: &Board) -> Self {
        let board_rows = (0..board.rows())
            .map(|y| {
                (0..board.cols())
                    .map(|x| board.get(Position::new(x, y)))
                    .collect()
            })
            .collect();
        Self {
            board: board_rows,
            score_cols: Some(board.score_cols().to_vec()),
            my_time: None,
            opponent_time: None,
            avoid_repeat: None,
        }
    }

    /// Builds the board, deriving rows and columns from the grid. Scoring
    /// columns default to the centred band for the grid's width.
    pub fn to_board(&self) -> Result<Board, SnapshotError> {
        let expected = self.board.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(SnapshotError::EmptyGrid);
        }
        for (row, cells) in self.board.iter().enumerate() {
            if cells.len() != expected {
                return Err(SnapshotError::RaggedRow {
                    row,
                    expected,
                    found: cells.len(),
                });
            }
        }

        let rows = i32::try_from(self.board.len()).map_err(|_| SnapshotError::TooLarge)?;
        let cols = i32::try_from(expected).map_err(|_| SnapshotError::TooLarge)?;
        let mut board = match &self.score_cols {
            Some(score_cols) => {
                if let Some(&bad) = score_cols.iter().find(|&&c| c < 0 || c >= cols) {
                    return Err(SnapshotError::ScoreColumnOutOfRange(bad));
                }
                Board::with_score_cols(rows, cols, score_cols.clone())
            }
            None => Board::new(rows, cols),
        };

        for (y, cells) in (0..rows).zip(&self.board) {
            for (x, piece) in (0..cols).zip(cells) {
                if piece.is_some() {
                    board.set(Position::new(x, y), *piece);
                }
            }
        }
        Ok(board)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    Choose(Snapshot),
    Reset,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Response {
    /// `mv` is `null` when the agent had no legal move.
    Move {
        #[serde(rename = "move")]
        mv: Option<Move>,
        stats: SearchStats,
    },
    Reset,
    Error {
        message: String,
    },
}

pub struct Session {
    agent: Agent,
}

impl Session {
    pub fn new(player: Player, config: Arc<EngineConfig>) -> Self {
        Self {
            agent: Agent::new(player, config),
        }
    }

    pub const fn agent(&self) -> &Agent {
        &self.agent
    }

    pub fn handle(&mut self, request: Request) -> Response {
        match request {
            Request::Choose(snapshot) => self.choose(&snapshot),
            Request::Reset => {
                self.agent.reset();
                Response::Reset
            }
        }
    }

    /// One JSON-lines exchange. Malformed input becomes an error response.
    pub fn handle_line(&mut self, line: &str) -> Response {
        match serde_json::from_str::<Request>(line) {
            Ok(request) => self.handle(request),
            Err(e) => {
                log::warn!("rejected request: {e}");
                Response::Error {
                    message: e.to_string(),
                }
            }
        }
    }

    pub fn choose(&mut self, snapshot: &Snapshot) -> Response {
        let board = match snapshot.to_board() {
            Ok(board) => board,
            Err(e) => {
                log::warn!("rejected snapshot: {e}");
                return Response::Error {
                    message: e.to_string(),
                };
            }
        };
        let avoid_repeat = snapshot
            .avoid_repeat
            .unwrap_or(self.agent.config().avoid_repetition);
        let mv = self
            .agent
            .choose(&board, snapshot.my_time, snapshot.opponent_time, avoid_repeat);
        Response::Move {
            mv,
            stats: self.agent.last_stats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Orientation;

    fn session() -> Session {
        let config = EngineConfig {
            seed: Some(5),
            depth: 1,
            ..EngineConfig::default()
        };
        Session::new(Player::Circle, Arc::new(config))
    }

    #[test]
    fn test_snapshot_builds_board() {
        let json = r#"{
            "board": [
                [null, {"owner": "circle", "side": "stone"}, null],
                [{"owner": "square", "side": "river", "orientation": "vertical"}, null, null]
            ],
            "my_time": 12.5
        }"#;
        let snapshot = Snapshot::from_json(json).unwrap();
        let board = snapshot.to_board().unwrap();
        assert_eq!(board.rows(), 2);
        assert_eq!(board.cols(), 3);
        assert_eq!(board.get(Position::new(1, 0)), Some(Piece::stone(Player::Circle)));
        assert_eq!(
            board.get(Position::new(0, 1)),
            Some(Piece::river(Player::Square, Orientation::Vertical))
        );
        assert_eq!(board.population(), 2);
        assert_eq!(snapshot.my_time, Some(12.5));
        assert_eq!(snapshot.avoid_repeat, None);
    }

    #[test]
    fn test_snapshot_rejects_bad_grids() {
        let empty = Snapshot::from_json(r#"{"board": []}"#).unwrap();
        assert!(matches!(empty.to_board(), Err(SnapshotError::EmptyGrid)));

        let ragged = Snapshot::from_json(r#"{"board": [[null, null], [null]]}"#).unwrap();
        assert!(matches!(
            ragged.to_board(),
            Err(SnapshotError::RaggedRow {
                row: 1,
                expected: 2,
                found: 1
            })
        ));

        let bad_cols =
            Snapshot::from_json(r#"{"board": [[null, null]], "score_cols": [0, 2]}"#).unwrap();
        assert!(matches!(
            bad_cols.to_board(),
            Err(SnapshotError::ScoreColumnOutOfRange(2))
        ));

        let bad_side =
            Snapshot::from_json(r#"{"board": [[{"owner": "circle", "side": "lava"}]]}"#);
        assert!(matches!(bad_side, Err(SnapshotError::Json(_))));
    }

    #[test]
    fn test_snapshot_of_board_round_trips() {
        let board = Board::standard(13, 12);
        let rebuilt = Snapshot::from_board(&board).to_board().unwrap();
        assert_eq!(rebuilt, board);
        assert_eq!(rebuilt.signature(), board.signature());
    }

    #[test]
    fn test_session_choose_and_reset() {
        let mut board = Board::new(10, 10);
        board.set(Position::new(4, 3), Some(Piece::stone(Player::Circle)));
        let mut session = session();

        let response = session.handle(Request::Choose(Snapshot::from_board(&board)));
        let Response::Move { mv, stats } = response else {
            panic!("expected a move, got {response:?}");
        };
        assert_eq!(
            mv,
            Some(Move::Move {
                from: Position::new(4, 3),
                to: Position::new(4, 2)
            })
        );
        assert_eq!(stats.depth, 1);
        assert_eq!(session.agent().turn(), 1);

        assert_eq!(session.handle(Request::Reset), Response::Reset);
        assert_eq!(session.agent().turn(), 0);
        assert!(session.agent().history().is_empty());
    }

    #[test]
    fn test_session_reports_no_move() {
        let mut session = session();
        let response = session.handle_line(r#"{"type": "choose", "board": [[null, null]]}"#);
        assert!(matches!(response, Response::Move { mv: None, .. }));
    }

    #[test]
    fn test_malformed_line_is_an_error_response() {
        let mut session = session();
        assert!(matches!(
            session.handle_line("not json"),
            Response::Error { .. }
        ));
        assert!(matches!(
            session.handle_line(r#"{"type": "choose", "board": []}"#),
            Response::Error { .. }
        ));
    }

    #[test]
    fn test_response_wire_format() {
        let response = Response::Move {
            mv: Some(Move::Flip {
                from: Position::new(2, 3),
                orientation: Some(Orientation::Horizontal),
            }),
            stats: SearchStats::default(),
        };
        let json: serde_json::Value = serde_json::to_value(&response).unwrap();
        assert_eq!(json["type"], "move");
        assert_eq!(json["move"]["action"], "flip");
        assert_eq!(json["move"]["from"], serde_json::json!([2, 3]));
        assert_eq!(json["move"]["orientation"], "horizontal");
    }
}
