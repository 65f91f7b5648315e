//! Shortest hop counts from a stone to a goal set.
//!
//! One hop is either a step onto an empty neighbour or a whole river flow,
//! however far the flow carries the piece. Results are memoized in a
//! [`PathCache`] keyed by the board signature.

use crate::engine::path_cache::{PathCache, PathKey};
use crate::logic::board::{Board, Orientation, Piece, Player, Position, DIRECTIONS};
use crate::logic::eval_constants::DISTANCE_CAP;
use crate::logic::flow::{river_destinations, FlowMode};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Hops to the nearest goal; `None` when no goal is reachable.
    pub distance: Option<u32>,
    /// Start cell first, goal last. A river hop lists the river cell and then
    /// the landing cell.
    pub path: Vec<Position>,
}

impl PathResult {
    pub const fn unreachable() -> Self {
        Self {
            distance: None,
            path: Vec::new(),
        }
    }

    /// Distance for arithmetic: unreachable and very long paths both read as
    /// [`DISTANCE_CAP`].
    pub fn capped(&self) -> u32 {
        self.distance.map_or(DISTANCE_CAP, |d| d.min(DISTANCE_CAP))
    }

    /// True if the path took at least one river hop.
    pub fn used_river(&self) -> bool {
        self.distance
            .is_some_and(|d| self.path.len() > d as usize + 1)
    }
}

pub fn shortest_path(
    board: &Board,
    start: Position,
    goals: &[Position],
    player: Player,
    use_rivers: bool,
    cache: &mut PathCache,
) -> PathResult {
    let key = PathKey {
        signature: board.signature(),
        start,
        goals: goals.to_vec(),
        use_rivers,
        player,
    };
    if let Some(hit) = cache.probe(&key) {
        return hit;
    }
    let result = shortest_path_uncached(board, start, goals, player, use_rivers);
    cache.store(key, result.clone());
    result
}

/// The same query as [`shortest_path`] with rivers enabled, the common case.
pub fn distance_to_goals(
    board: &Board,
    start: Position,
    goals: &[Position],
    player: Player,
    cache: &mut PathCache,
) -> PathResult {
    shortest_path(board, start, goals, player, true, cache)
}

pub fn shortest_path_uncached(
    board: &Board,
    start: Position,
    goals: &[Position],
    player: Player,
    use_rivers: bool,
) -> PathResult {
    if goals.contains(&start) {
        return PathResult {
            distance: Some(0),
            path: vec![start],
        };
    }

    // Landing cell -> (cell it was reached from, river cell crossed if any).
    let mut parents: HashMap<Position, (Position, Option<Position>)> = HashMap::new();
    let mut queue = VecDeque::from([(start, 0_u32)]);
    parents.insert(start, (start, None));

    while let Some((pos, dist)) = queue.pop_front() {
        for (dx, dy) in DIRECTIONS {
            let next = pos.offset(dx, dy);
            if !board.in_bounds(next)
                || parents.contains_key(&next)
                || board.is_opponent_score_cell(next, player)
            {
                continue;
            }

            match board.get(next) {
                None => {
                    parents.insert(next, (pos, None));
                    if goals.contains(&next) {
                        return rebuild(&parents, start, next, dist + 1);
                    }
                    queue.push_back((next, dist + 1));
                }
                Some(piece) if use_rivers && piece.is_river() => {
                    for landing in river_destinations(board, next, pos, player, FlowMode::Slide) {
                        if parents.contains_key(&landing) {
                            continue;
                        }
                        parents.insert(landing, (pos, Some(next)));
                        if goals.contains(&landing) {
                            return rebuild(&parents, start, landing, dist + 1);
                        }
                        queue.push_back((landing, dist + 1));
                    }
                }
                Some(_) => {}
            }
        }
    }

    PathResult::unreachable()
}

fn rebuild(
    parents: &HashMap<Position, (Position, Option<Position>)>,
    start: Position,
    goal: Position,
    distance: u32,
) -> PathResult {
    let mut path = vec![goal];
    let mut at = goal;
    while at != start {
        let Some(&(prev, via)) = parents.get(&at) else {
            break;
        };
        if let Some(river) = via {
            path.push(river);
        }
        path.push(prev);
        at = prev;
    }
    path.reverse();
    PathResult {
        distance: Some(distance),
        path,
    }
}

/// Best distance the stone at `pos` could reach by first turning itself into
/// a river, together with the orientation that achieves it. The orientation
/// is `None` when flipping does not beat the current distance, and for
/// pieces that are not `player`'s stones. The board is never modified.
pub fn distance_with_best_flip(
    board: &Board,
    pos: Position,
    goals: &[Position],
    player: Player,
    cache: &mut PathCache,
) -> (Option<u32>, Option<Orientation>) {
    let Some(piece) = board.get(pos).filter(|p| p.owner == player) else {
        return (None, None);
    };
    let current = distance_to_goals(board, pos, goals, player, cache).distance;
    if piece.is_river() {
        return (current, None);
    }

    let mut best = (current, None);
    let mut scratch = board.clone();
    for orientation in [Orientation::Horizontal, Orientation::Vertical] {
        scratch.set(pos, Some(Piece::river(player, orientation)));
        let trial = distance_to_goals(&scratch, pos, goals, player, cache).distance;
        if shorter(trial, best.0) {
            best = (trial, Some(orientation));
        }
    }
    best
}

/// `a < b` where `None` is infinitely far.
pub const fn shorter(a: Option<u32>, b: Option<u32>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a < b,
        (Some(_), None) => true,
        (None, _) => false,
    }
}
