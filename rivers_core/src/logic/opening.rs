use crate::engine::Move;
use crate::logic::board::{Orientation, Player, Position};
use serde::{Deserialize, Serialize};

/// Scripted first moves per side, played in order while the agent's turn
/// counter is below the script length.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpeningBook {
    pub circle: Vec<Move>,
    pub square: Vec<Move>,
}

impl OpeningBook {
    pub fn moves_for(&self, player: Player) -> &[Move] {
        match player {
            Player::Circle => &self.circle,
            Player::Square => &self.square,
        }
    }

    pub fn book_move(&self, player: Player, turn: usize) -> Option<Move> {
        self.moves_for(player).get(turn).copied()
    }

    /// Four-move script for the 13x12 start position: open a horizontal river
    /// on the front rank, slide a stone onto the left edge, turn that stone
    /// into a vertical river and send a second stone down it.
    pub fn river_rush() -> Self {
        let p = Position::new;
        Self {
            square: vec![
                Move::Flip {
                    from: p(3, 3),
                    orientation: Some(Orientation::Horizontal),
                },
                Move::Move {
                    from: p(3, 4),
                    to: p(0, 3),
                },
                Move::Flip {
                    from: p(0, 3),
                    orientation: Some(Orientation::Vertical),
                },
                Move::Move {
                    from: p(4, 3),
                    to: p(0, 7),
                },
            ],
            circle: vec![
                Move::Flip {
                    from: p(3, 9),
                    orientation: Some(Orientation::Horizontal),
                },
                Move::Move {
                    from: p(3, 8),
                    to: p(0, 9),
                },
                Move::Flip {
                    from: p(0, 9),
                    orientation: Some(Orientation::Vertical),
                },
                Move::Move {
                    from: p(4, 9),
                    to: p(0, 5),
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::Board;
    use crate::logic::generator::MoveGenerator;

    #[test]
    fn test_default_book_is_empty() {
        let book = OpeningBook::default();
        assert!(book.moves_for(Player::Circle).is_empty());
        assert_eq!(book.book_move(Player::Square, 0), None);
    }

    #[test]
    fn test_river_rush_is_playable_from_start() {
        let book = OpeningBook::river_rush();
        let gen = MoveGenerator::new();

        for player in [Player::Circle, Player::Square] {
            let mut board = Board::standard(13, 12);
            for (turn, mv) in book.moves_for(player).iter().enumerate() {
                let legal = gen.generate_moves(&board, player);
                assert!(legal.contains(mv), "{player} book move {turn} ({mv}) is not legal");
                board.apply_move(mv);
            }
        }
    }

    #[test]
    fn test_book_roundtrips_through_json() {
        let book = OpeningBook::river_rush();
        let json = serde_json::to_string(&book).unwrap();
        let back: OpeningBook = serde_json::from_str(&json).unwrap();
        assert_eq!(back, book);
    }
}
