use crate::engine::Move;
use crate::logic::board::{Board, Orientation, Piece, Player, Position, DIRECTIONS};
use crate::logic::flow::{river_destinations, FlowMode};

#[derive(Debug, Clone, Copy, Default)]
pub struct MoveGenerator;

impl MoveGenerator {
    pub const fn new() -> Self {
        Self
    }

    /// Every move, push, flip and rotation available to `turn`, piece by
    /// piece in row-major order.
    pub fn generate_moves(&self, board: &Board, turn: Player) -> Vec<Move> {
        let mut moves = Vec::with_capacity(64);
        for (from, piece) in board.pieces_of(turn) {
            self.generate_piece_moves(board, from, piece, turn, &mut moves);
        }
        moves
    }

    fn generate_piece_moves(
        &self,
        board: &Board,
        from: Position,
        piece: Piece,
        turn: Player,
        moves: &mut Vec<Move>,
    ) {
        let mut targets = Vec::new();
        let mut pushes = Vec::new();

        for (dx, dy) in DIRECTIONS {
            let next = from.offset(dx, dy);
            if !board.in_bounds(next) || board.is_opponent_score_cell(next, turn) {
                continue;
            }

            match board.get(next) {
                None => targets.push(next),
                Some(target) if target.is_river() => {
                    targets.extend(river_destinations(
                        board,
                        next,
                        from,
                        turn,
                        FlowMode::Slide,
                    ));
                }
                Some(target) => {
                    self.push_targets(board, from, piece, next, target, (dx, dy), turn, &mut pushes);
                }
            }
        }

        for to in dedup(targets) {
            moves.push(Move::Move { from, to });
        }
        for (over, pushed_to) in pushes {
            moves.push(Move::Push {
                from,
                over,
                pushed_to,
            });
        }

        match piece.orientation() {
            None => {
                for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                    moves.push(Move::Flip {
                        from,
                        orientation: Some(orientation),
                    });
                }
            }
            Some(_) => {
                moves.push(Move::Flip {
                    from,
                    orientation: None,
                });
                moves.push(Move::Rotate { from });
            }
        }
    }

    /// Push landings for the stone at `over`, shoved by the piece at `from`.
    /// A stone pushes one cell straight on; a river sends the stone down its
    /// own axis.
    #[allow(clippy::too_many_arguments)]
    fn push_targets(
        &self,
        board: &Board,
        from: Position,
        pusher: Piece,
        over: Position,
        pushed: Piece,
        (dx, dy): (i32, i32),
        turn: Player,
        pushes: &mut Vec<(Position, Position)>,
    ) {
        if pusher.is_stone() {
            let landing = over.offset(dx, dy);
            if board.is_empty(landing)
                && !board.is_opponent_score_cell(landing, turn)
                && !board.is_opponent_score_cell(landing, pushed.owner)
            {
                pushes.push((over, landing));
            }
        } else {
            for landing in river_destinations(board, over, from, pushed.owner, FlowMode::Push) {
                if !board.is_opponent_score_cell(landing, turn) {
                    pushes.push((over, landing));
                }
            }
        }
    }
}

// Several entry rivers can feed the same landing cell.
fn dedup(mut cells: Vec<Position>) -> Vec<Position> {
    let mut seen = std::collections::HashSet::new();
    cells.retain(|c| seen.insert(*c));
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn count(moves: &[Move], pred: impl Fn(&Move) -> bool) -> usize {
        moves.iter().filter(|m| pred(m)).count()
    }

    #[test]
    fn test_lone_stone_moves_and_flips() {
        let mut board = Board::new(13, 12);
        board.set(p(1, 6), Some(Piece::stone(Player::Circle)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Circle);
        assert_eq!(count(&moves, |m| matches!(m, Move::Move { .. })), 4);
        assert_eq!(
            count(&moves, |m| matches!(m, Move::Flip { orientation: Some(_), .. })),
            2
        );
        assert_eq!(count(&moves, |m| matches!(m, Move::Rotate { .. })), 0);
        assert_eq!(moves.len(), 6);
    }

    #[test]
    fn test_river_piece_flips_back_and_rotates() {
        let mut board = Board::new(13, 12);
        board.set(p(1, 6), Some(Piece::river(Player::Square, Orientation::Vertical)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Square);
        assert!(moves.contains(&Move::Flip {
            from: p(1, 6),
            orientation: None
        }));
        assert!(moves.contains(&Move::Rotate { from: p(1, 6) }));
    }

    #[test]
    fn test_never_steps_into_opponent_score_cell() {
        let mut board = Board::new(13, 12);
        // Circle stone right above square's scoring row.
        board.set(p(5, 9), Some(Piece::stone(Player::Circle)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Circle);
        assert!(!moves.contains(&Move::Move {
            from: p(5, 9),
            to: p(5, 10)
        }));
        for mv in &moves {
            if let Move::Move { to, .. } = mv {
                assert!(!board.is_opponent_score_cell(*to, Player::Circle));
            }
        }
    }

    #[test]
    fn test_stone_push_one_cell() {
        let mut board = Board::new(13, 12);
        board.set(p(1, 6), Some(Piece::stone(Player::Circle)));
        board.set(p(2, 6), Some(Piece::stone(Player::Square)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Circle);
        assert!(moves.contains(&Move::Push {
            from: p(1, 6),
            over: p(2, 6),
            pushed_to: p(3, 6)
        }));
    }

    #[test]
    fn test_stone_push_blocked() {
        let mut board = Board::new(13, 12);
        board.set(p(1, 6), Some(Piece::stone(Player::Circle)));
        board.set(p(2, 6), Some(Piece::stone(Player::Square)));
        board.set(p(3, 6), Some(Piece::stone(Player::Square)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Circle);
        assert_eq!(
            count(&moves, |m| matches!(m, Move::Push { from, .. } if *from == p(1, 6))),
            0
        );
    }

    #[test]
    fn test_push_never_lands_in_either_forbidden_area() {
        let mut board = Board::new(13, 12);
        // Square pushes a circle stone down onto square's own scoring row:
        // that is circle's forbidden area, so the push is not offered.
        board.set(p(5, 8), Some(Piece::stone(Player::Square)));
        board.set(p(5, 9), Some(Piece::stone(Player::Circle)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Square);
        assert!(!moves.contains(&Move::Push {
            from: p(5, 8),
            over: p(5, 9),
            pushed_to: p(5, 10)
        }));
    }

    #[test]
    fn test_river_push_uses_flow() {
        let mut board = Board::new(13, 12);
        board.set(p(1, 6), Some(Piece::river(Player::Circle, Orientation::Horizontal)));
        board.set(p(2, 6), Some(Piece::stone(Player::Square)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Circle);
        let landings: Vec<Position> = moves
            .iter()
            .filter_map(|m| match m {
                Move::Push { pushed_to, .. } => Some(*pushed_to),
                _ => None,
            })
            .collect();
        // East along row 6 to the edge, and west past the vacated pusher cell.
        assert!(landings.contains(&p(3, 6)));
        assert!(landings.contains(&p(11, 6)));
        assert!(landings.contains(&p(0, 6)));
        assert_eq!(landings.len(), 10);
    }

    #[test]
    fn test_moving_onto_river_flows() {
        let mut board = Board::new(13, 12);
        board.set(p(1, 6), Some(Piece::stone(Player::Circle)));
        board.set(p(2, 6), Some(Piece::river(Player::Square, Orientation::Vertical)));

        let moves = MoveGenerator::new().generate_moves(&board, Player::Circle);
        assert!(moves.contains(&Move::Move {
            from: p(1, 6),
            to: p(2, 0)
        }));
        assert!(moves.contains(&Move::Move {
            from: p(1, 6),
            to: p(2, 12)
        }));
        // The river cell itself is never a landing.
        assert!(!moves.contains(&Move::Move {
            from: p(1, 6),
            to: p(2, 6)
        }));
    }

    #[test]
    fn test_application_preserves_population() {
        let mut board = Board::standard(13, 12);
        board.set(p(3, 5), Some(Piece::river(Player::Circle, Orientation::Horizontal)));
        board.set(p(8, 7), Some(Piece::river(Player::Square, Orientation::Vertical)));
        let before = board.population();

        for turn in [Player::Circle, Player::Square] {
            for mv in MoveGenerator::new().generate_moves(&board, turn) {
                let next = board.with_move(&mv);
                assert_eq!(next.population(), before, "{mv} changed the piece count");
                if matches!(mv, Move::Flip { .. } | Move::Rotate { .. }) {
                    let (a, b) = (board.get(mv.origin()), next.get(mv.origin()));
                    assert_eq!(a.map(|x| x.owner), b.map(|x| x.owner));
                }
            }
        }
    }
}
