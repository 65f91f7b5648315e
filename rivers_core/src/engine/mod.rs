use crate::engine::path_cache::PathCache;
use crate::logic::board::{Board, Orientation, Player, Position};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod distance;
pub mod eval;
pub mod path_cache;
pub mod policy;
pub mod search;
pub mod zobrist;


/// One action. Serialized the way the host expects, e.g.
/// `{"action": "push", "from": [2, 5], "to": [3, 5], "pushed_to": [4, 5]}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Move {
    Move {
        from: Position,
        to: Position,
    },
    Push {
        from: Position,
        /// Cell of the piece being pushed; the pusher ends up here.
        #[serde(rename = "to")]
        over: Position,
        pushed_to: Position,
    },
    Flip {
        from: Position,
        /// Required when a stone becomes a river, absent the other way round.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        orientation: Option<Orientation>,
    },
    Rotate {
        from: Position,
    },
}

impl Move {
    pub const fn origin(&self) -> Position {
        match *self {
            Self::Move { from, .. }
            | Self::Push { from, .. }
            | Self::Flip { from, .. }
            | Self::Rotate { from } => from,
        }
    }

    /// Cells covered by the travelling piece: the mover for a move, the
    /// pushed piece for a push. Zero for flips and rotations.
    pub const fn travel(&self) -> i32 {
        match *self {
            Self::Move { from, to } => from.manhattan(to),
            Self::Push {
                over, pushed_to, ..
            } => over.manhattan(pushed_to),
            Self::Flip { .. } | Self::Rotate { .. } => 0,
        }
    }

    /// A move or push that covered more than one cell, i.e. used a river.
    pub const fn is_multi_cell(&self) -> bool {
        self.travel() > 1
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move { from, to } => write!(f, "move {from}->{to}"),
            Self::Push {
                from,
                over,
                pushed_to,
            } => write!(f, "push {from}->{over} => {pushed_to}"),
            Self::Flip {
                from,
                orientation: Some(o),
            } => write!(f, "flip {from} {o:?}"),
            Self::Flip {
                from,
                orientation: None,
            } => write!(f, "flip {from}"),
            Self::Rotate { from } => write!(f, "rotate {from}"),
        }
    }
}

pub type Score = f64;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    pub depth: u8,
    pub nodes: u32,
    pub time_ms: u64,
    pub score: Score,
    pub cache_hits: u64,
    pub cache_misses: u64,
}

/// Static evaluation of a board from `player`'s point of view.
pub trait Evaluator {
    fn evaluate(&self, board: &Board, player: Player, cache: &mut PathCache) -> Score;
}
