use rivers_core::engine::config::EngineConfig;
use rivers_core::engine::Move;
use rivers_core::logic::board::{Board, Orientation, Piece, Player, Position, DIRECTIONS};
use rivers_core::logic::flow::{river_destinations, FlowMode};
use rivers_core::logic::generator::MoveGenerator;
use rivers_core::protocol::{Response, Session, Snapshot};
use std::collections::HashSet;
use std::sync::Arc;

fn p(x: i32, y: i32) -> Position {
    Position::new(x, y)
}

/// Start position with a few rivers of both owners dropped in.
fn river_board() -> Board {
    let mut board = Board::standard(13, 12);
    board.set(p(1, 6), Some(Piece::river(Player::Circle, Orientation::Horizontal)));
    board.set(p(6, 6), Some(Piece::river(Player::Square, Orientation::Vertical)));
    board.set(p(10, 6), Some(Piece::river(Player::Circle, Orientation::Vertical)));
    board.set(p(10, 2), Some(Piece::river(Player::Square, Orientation::Horizontal)));
    board.set(p(3, 5), Some(Piece::river(Player::Circle, Orientation::Vertical)));
    board
}

#[test]
fn test_flow_landings_are_empty_and_allowed() {
    let board = river_board();
    for player in [Player::Circle, Player::Square] {
        for (entry, piece) in board.pieces().filter(|(_, piece)| piece.is_river()) {
            for (dx, dy) in DIRECTIONS {
                let source = entry.offset(dx, dy);
                if !board.in_bounds(source) {
                    continue;
                }
                let landings = river_destinations(&board, entry, source, player, FlowMode::Slide);
                let unique: HashSet<_> = landings.iter().collect();
                assert_eq!(unique.len(), landings.len(), "duplicate landing from {entry}");
                for landing in landings {
                    assert!(board.in_bounds(landing));
                    assert!(board.is_empty(landing), "{piece:?} at {entry} lands on {landing}");
                    assert!(!board.is_opponent_score_cell(landing, player));
                }
            }
        }
    }
}

#[test]
fn test_generated_moves_keep_population_and_stay_legal() {
    let board = river_board();
    let generator = MoveGenerator::new();
    for player in [Player::Circle, Player::Square] {
        let moves = generator.generate_moves(&board, player);
        assert!(!moves.is_empty());
        for mv in moves {
            let next = board.with_move(&mv);
            assert_eq!(next.population(), board.population(), "{mv}");
            assert_eq!(board.get(mv.origin()).map(|piece| piece.owner), Some(player));
            match mv {
                Move::Move { to, .. } => {
                    assert!(board.is_empty(to));
                    assert!(!board.is_opponent_score_cell(to, player));
                }
                Move::Push { pushed_to, .. } => {
                    assert!(board.is_empty(pushed_to));
                    assert!(!board.is_opponent_score_cell(pushed_to, player));
                }
                Move::Flip { .. } | Move::Rotate { .. } => assert_ne!(next, board),
            }
        }
    }
}

#[test]
fn test_snapshot_session_end_to_end() {
    let json = r#"{
        "board": [
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, {"owner": "circle", "side": "stone"}, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, null],
            [null, null, null, null, null, null, null, null, null, {"owner": "square", "side": "stone"}]
        ],
        "my_time": 1.0,
        "avoid_repeat": false
    }"#;
    let snapshot = Snapshot::from_json(json).unwrap();
    let config = EngineConfig {
        seed: Some(3),
        ..EngineConfig::default()
    };
    let mut session = Session::new(Player::Circle, Arc::new(config));
    let response = session.choose(&snapshot);

    // The low clock forces a one-ply search.
    let Response::Move { mv: Some(mv), stats } = response else {
        panic!("expected a move, got {response:?}");
    };
    assert_eq!(stats.depth, 1);
    assert_eq!(
        mv,
        Move::Move {
            from: p(4, 4),
            to: p(4, 3)
        }
    );

    let wire = serde_json::to_value(mv).unwrap();
    assert_eq!(
        wire,
        serde_json::json!({"action": "move", "from": [4, 4], "to": [4, 3]})
    );
}
