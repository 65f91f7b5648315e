//! River flow resolution.
//!
//! A piece that steps onto a river slides along the river's axis and may stop
//! on any empty cell it passes. When the slide runs into another river, the
//! flow continues along that river's own axis, which is how L-shaped and
//! longer chained flows arise. Stones of either owner stop the slide; they
//! can only ever be pushed.

use crate::logic::board::{Board, Player, Position};
use std::collections::{HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowMode {
    /// A piece moves onto the entry river under its own power.
    Slide,
    /// A river at `source` shoves the piece at `entry`. The pusher's
    /// orientation decides the first hop.
    Push,
}

/// Distinct cells a piece of `traveller` can come to rest on after entering
/// the river chain at `entry` from `source`, in discovery order.
///
/// `source` counts as vacated while the flow is resolved: the mover leaves
/// it, so slides pass straight over it. Cells in the traveller's opponent's
/// scoring area are never entered and end a slide in that direction.
pub fn river_destinations(
    board: &Board,
    entry: Position,
    source: Position,
    traveller: Player,
    mode: FlowMode,
) -> Vec<Position> {
    let mut destinations = Vec::new();
    let mut seen = HashSet::new();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::from([entry]);

    while let Some(pos) = queue.pop_front() {
        if !board.in_bounds(pos) || !visited.insert(pos) {
            continue;
        }

        let cell = if mode == FlowMode::Push && pos == entry {
            board.get(source)
        } else {
            board.get(pos)
        };

        let Some(piece) = cell else {
            if !board.is_opponent_score_cell(pos, traveller) && seen.insert(pos) {
                destinations.push(pos);
            }
            continue;
        };

        let Some(orientation) = piece.orientation() else {
            continue;
        };

        for (dx, dy) in orientation.axis() {
            let mut next = pos.offset(dx, dy);
            while board.in_bounds(next) {
                if board.is_opponent_score_cell(next, traveller) {
                    break;
                }
                match board.get(next) {
                    None => {
                        if seen.insert(next) {
                            destinations.push(next);
                        }
                    }
                    Some(_) if next == source => {}
                    Some(blocker) => {
                        if blocker.is_river() {
                            queue.push_back(next);
                        }
                        break;
                    }
                }
                next = next.offset(dx, dy);
            }
        }
    }

    destinations
}
