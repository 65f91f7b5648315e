use crate::engine::config::EngineConfig;
use crate::engine::eval::FeatureEvaluator;
use crate::engine::path_cache::PathCache;
use crate::engine::{Evaluator, Score};
use crate::logic::board::{Board, Player};
use crate::logic::generator::MoveGenerator;
use std::sync::Arc;

pub struct AlphaBetaEngine {
    evaluator: FeatureEvaluator,
    generator: MoveGenerator,
    nodes_searched: u32,
}

impl AlphaBetaEngine {
    pub fn new(config: Arc<EngineConfig>) -> Self {
        Self {
            evaluator: FeatureEvaluator::new(config),
            generator: MoveGenerator::new(),
            nodes_searched: 0,
        }
    }

    pub const fn nodes_searched(&self) -> u32 {
        self.nodes_searched
    }

    pub fn reset_nodes(&mut self) {
        self.nodes_searched = 0;
    }

    /// Minimax with alpha-beta bounds. Scores are always from `player`'s point
    /// of view; `maximizing` says whether `player` is the side to move.
    #[allow(clippy::too_many_arguments)]
    pub fn minimax(
        &mut self,
        board: &Board,
        depth: u8,
        mut alpha: Score,
        mut beta: Score,
        maximizing: bool,
        player: Player,
        cache: &mut PathCache,
    ) -> Score {
        self.nodes_searched += 1;

        if depth == 0 || board.check_win().is_some() {
            return self.evaluator.evaluate(board, player, cache);
        }

        let mover = if maximizing { player } else { player.opposite() };
        let moves = self.generator.generate_moves(board, mover);
        if moves.is_empty() {
            return self.evaluator.evaluate(board, player, cache);
        }

        if maximizing {
            let mut best = Score::NEG_INFINITY;
            for mv in &moves {
                let child = board.with_move(mv);
                cache.invalidate();
                let score = self.minimax(&child, depth - 1, alpha, beta, false, player, cache);
                best = best.max(score);
                alpha = alpha.max(score);
                if beta <= alpha {
                    break;
                }
            }
            best
        } else {
            let mut best = Score::INFINITY;
            for mv in &moves {
                let child = board.with_move(mv);
                cache.invalidate();
                let score = self.minimax(&child, depth - 1, alpha, beta, true, player, cache);
                best = best.min(score);
                beta = beta.min(score);
                if beta <= alpha {
                    break;
                }
            }
            best
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::board::{Orientation, Piece, Position};
    use crate::logic::eval_constants::WIN_SCORE;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn engine() -> AlphaBetaEngine {
        AlphaBetaEngine::new(Arc::new(EngineConfig::default()))
    }

    fn full_window(
        engine: &mut AlphaBetaEngine,
        board: &Board,
        depth: u8,
        maximizing: bool,
        player: Player,
    ) -> Score {
        let mut cache = PathCache::new();
        engine.minimax(
            board,
            depth,
            Score::NEG_INFINITY,
            Score::INFINITY,
            maximizing,
            player,
            &mut cache,
        )
    }

    /// Three circle stones scoring on a 10x10 board, a fourth one step away.
    fn one_step_from_win() -> Board {
        let mut board = Board::new(10, 10);
        for x in [3, 4, 5] {
            board.set(p(x, 2), Some(Piece::stone(Player::Circle)));
        }
        board.set(p(6, 3), Some(Piece::stone(Player::Circle)));
        board.set(p(0, 9), Some(Piece::stone(Player::Square)));
        board
    }

    /// Plain minimax without bounds, for comparison.
    fn reference(board: &Board, depth: u8, maximizing: bool, player: Player) -> Score {
        let evaluator = FeatureEvaluator::new(Arc::new(EngineConfig::default()));
        let mut cache = PathCache::new();
        if depth == 0 || board.check_win().is_some() {
            return evaluator.evaluate(board, player, &mut cache);
        }
        let mover = if maximizing { player } else { player.opposite() };
        let moves = MoveGenerator::new().generate_moves(board, mover);
        if moves.is_empty() {
            return evaluator.evaluate(board, player, &mut cache);
        }
        let scores = moves
            .iter()
            .map(|mv| reference(&board.with_move(mv), depth - 1, !maximizing, player));
        if maximizing {
            scores.fold(Score::NEG_INFINITY, Score::max)
        } else {
            scores.fold(Score::INFINITY, Score::min)
        }
    }

    #[test]
    fn test_sees_own_win_one_ply_ahead() {
        let board = one_step_from_win();
        let mut engine = engine();
        let score = full_window(&mut engine, &board, 1, true, Player::Circle);
        assert!(score >= WIN_SCORE);
        assert!(engine.nodes_searched() > 1);
    }

    #[test]
    fn test_sees_opponent_win_one_ply_ahead() {
        let board = one_step_from_win();
        let score = full_window(&mut engine(), &board, 1, false, Player::Square);
        assert!(score <= -WIN_SCORE);
    }

    #[test]
    fn test_pruning_keeps_the_minimax_value() {
        let mut board = Board::new(10, 10);
        board.set(p(4, 4), Some(Piece::stone(Player::Circle)));
        board.set(p(5, 6), Some(Piece::river(Player::Circle, Orientation::Vertical)));
        board.set(p(6, 5), Some(Piece::stone(Player::Square)));

        let pruned = full_window(&mut engine(), &board, 2, true, Player::Circle);
        let plain = reference(&board, 2, true, Player::Circle);
        assert!((pruned - plain).abs() < 1e-6 * plain.abs().max(1.0));
    }

    #[test]
    fn test_minimax_at_depth_zero_is_static_eval() {
        let board = Board::standard(13, 12);
        let mut engine = engine();
        let mut cache = PathCache::new();
        let evaluator = FeatureEvaluator::new(Arc::new(EngineConfig::default()));
        let stat = evaluator.evaluate(&board, Player::Square, &mut cache);
        let searched = full_window(&mut engine, &board, 0, true, Player::Square);
        assert!((stat - searched).abs() < f64::EPSILON);
        assert_eq!(engine.nodes_searched(), 1);

        engine.reset_nodes();
        assert_eq!(engine.nodes_searched(), 0);
    }

    #[test]
    fn test_no_moves_falls_back_to_static_eval() {
        let board = Board::new(10, 10);
        let mut engine = engine();
        full_window(&mut engine, &board, 3, true, Player::Circle);
        assert_eq!(engine.nodes_searched(), 1);
    }
}
