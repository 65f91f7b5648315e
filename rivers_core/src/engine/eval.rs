use crate::engine::config::{EngineConfig, EvalWeights};
use crate::engine::distance::{distance_to_goals, PathResult};
use crate::engine::path_cache::PathCache;
use crate::engine::{Evaluator, Score};
use crate::logic::board::{Board, Orientation, Player, Position, DIRECTIONS};
use crate::logic::eval_constants::{
    NO_PATH_MIN_DISTANCE, SCALE_ADVANCEMENT, SCALE_BLOCKING, SCALE_CLEAR_PATH,
    SCALE_DISTANCE_BUCKET, SCALE_MIN_DISTANCE, SCALE_PROXIMITY, SCALE_RIVER, SCALE_SCORING,
    SCALE_WITHIN_ROWS, WIN_SCORE,
};
use std::sync::Arc;

/// Raw positional features of a board, seen from one player.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    pub my_scoring_stones: usize,
    pub opp_scoring_stones: usize,

    pub my_stones_within_2: u32,
    pub my_stones_within_4: u32,
    pub my_stones_within_6: u32,
    pub opp_stones_within_2: u32,
    pub opp_stones_within_4: u32,
    pub opp_stones_within_6: u32,
    pub my_stones_within_1_rows: u32,

    pub my_proximity_score: f64,
    pub opp_proximity_score: f64,
    pub my_min_distance: f64,
    pub opp_min_distance: f64,

    pub my_river_count: u32,
    pub my_rivers_near_goal: u32,
    pub my_rivers_horizontal: u32,
    pub my_rivers_vertical: u32,
    pub rivers_near_us: u32,
    pub opp_river_count: u32,
    pub opp_rivers_near_goal: u32,

    pub opp_stones_blocked: u32,
    pub my_blocking_pieces: u32,

    pub my_advancement: i64,
    pub opp_advancement: i64,

    pub my_clear_paths_to_goal: u32,
}

struct StonePath {
    pos: Position,
    result: PathResult,
}

impl Features {
    pub fn extract(board: &Board, player: Player, cache: &mut PathCache) -> Self {
        let opponent = player.opposite();
        let my_goals = board.goal_cells(player);
        let opp_goals = board.goal_cells(opponent);
        let my_row = board.goal_row(player);
        let opp_row = board.goal_row(opponent);
        let rows = i64::from(board.rows());

        let mut f = Self {
            my_scoring_stones: board.scoring_stones(player),
            opp_scoring_stones: board.scoring_stones(opponent),
            my_min_distance: NO_PATH_MIN_DISTANCE,
            opp_min_distance: NO_PATH_MIN_DISTANCE,
            ..Self::default()
        };
        #[allow(clippy::cast_precision_loss)]
        let my_scoring = f.my_scoring_stones as f64;

        // Stones with a reachable goal, and their shortest paths.
        let mut my_paths = Vec::new();
        let mut opp_paths = Vec::new();

        for pos in board.stones_of(player).collect::<Vec<_>>() {
            let row_dist = (pos.y - my_row).abs();
            if row_dist <= 1 {
                f.my_stones_within_1_rows += 1;
            }
            f.my_advancement += rows - i64::from(row_dist);

            let result = distance_to_goals(board, pos, &my_goals, player, cache);
            let Some(d) = result.distance else {
                continue;
            };
            let df = f64::from(d);
            f.my_min_distance = f.my_min_distance.min(df);
            f.my_stones_within_2 += u32::from(d <= 2);
            f.my_stones_within_4 += u32::from(d <= 4);
            f.my_stones_within_6 += u32::from(d <= 6);

            f.my_proximity_score += (25.0 - df.min(25.0)).powi(3) * 1_000.0;
            if d <= 2 {
                f.my_proximity_score += 2e6 + my_scoring * 5e5;
            } else if d <= 4 {
                f.my_proximity_score += 1e5 + my_scoring * 5e4;
            }
            if result.used_river() {
                f.my_proximity_score += 200_000.0;
            }
            my_paths.push(StonePath { pos, result });
        }

        for pos in board.stones_of(opponent).collect::<Vec<_>>() {
            f.opp_advancement += rows - i64::from((pos.y - opp_row).abs());

            let blocked = DIRECTIONS.iter().any(|&(dx, dy)| {
                board
                    .get(pos.offset(dx, dy))
                    .is_some_and(|n| n.owner == player)
            });
            f.opp_stones_blocked += u32::from(blocked);

            let result = distance_to_goals(board, pos, &opp_goals, opponent, cache);
            let Some(d) = result.distance else {
                continue;
            };
            let df = f64::from(d);
            f.opp_min_distance = f.opp_min_distance.min(df);
            f.opp_stones_within_2 += u32::from(d <= 2);
            f.opp_stones_within_4 += u32::from(d <= 4);
            f.opp_stones_within_6 += u32::from(d <= 6);

            f.opp_proximity_score += (20.0 - df.min(20.0)).powi(2) * 500.0;
            if d <= 2 {
                f.opp_proximity_score -= 80_000.0;
            } else if d <= 4 {
                f.opp_proximity_score -= 30_000.0;
            }
            opp_paths.push(StonePath { pos, result });
        }

        let near = |a: Position, b: Position| (a.x - b.x).abs() <= 2 && (a.y - b.y).abs() <= 2;
        let stones_near = |at: Position| {
            u32::try_from(my_paths.iter().filter(|s| near(at, s.pos)).count()).unwrap_or(u32::MAX)
        };

        for (pos, piece) in board.pieces() {
            let Some(orientation) = piece.orientation() else {
                continue;
            };
            if piece.owner == player {
                f.my_river_count += 1;
                let near_goal = (pos.y - my_row).abs() <= 3;
                f.my_rivers_near_goal += u32::from(near_goal);
                match orientation {
                    Orientation::Horizontal => f.my_rivers_horizontal += 1,
                    Orientation::Vertical => f.my_rivers_vertical += 1,
                }

                f.rivers_near_us += stones_near(pos);
                let on_their_paths = opp_paths
                    .iter()
                    .filter(|s| s.result.path.contains(&pos))
                    .count();
                f.rivers_near_us += u32::try_from(on_their_paths).unwrap_or(u32::MAX);
                f.rivers_near_us += u32::from(near_goal);
            } else {
                f.opp_river_count += 1;
                f.opp_rivers_near_goal += u32::from((pos.y - opp_row).abs() <= 3);
                f.rivers_near_us += stones_near(pos);
            }
        }

        // Per scoring column: a piece of ours between their goal row and ours.
        let step = (my_row - opp_row).signum();
        for &x in board.score_cols() {
            let mut y = opp_row;
            while y != my_row && y >= 0 && y < board.rows() {
                if board
                    .get(Position::new(x, y))
                    .is_some_and(|p| p.owner == player)
                {
                    f.my_blocking_pieces += 1;
                    break;
                }
                y += step;
            }

            let column_clear = !(0..board.rows()).any(|y| {
                board
                    .get(Position::new(x, y))
                    .is_some_and(|p| p.owner == opponent)
            });
            f.my_clear_paths_to_goal += u32::from(column_clear);
        }

        f
    }

    /// Weighted sum of the features.
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, w: &EvalWeights) -> Score {
        let n = |v: u32| f64::from(v);
        let mut score = 0.0;

        score += self.my_scoring_stones as f64 * w.my_scoring_stones * SCALE_SCORING;
        score -= self.opp_scoring_stones as f64 * w.opp_scoring_stones * SCALE_SCORING;

        score += n(self.my_stones_within_2) * w.my_stones_within_2 * SCALE_DISTANCE_BUCKET;
        score += n(self.my_stones_within_4) * w.my_stones_within_4 * SCALE_DISTANCE_BUCKET;
        score += n(self.my_stones_within_6) * w.my_stones_within_6 * SCALE_DISTANCE_BUCKET;
        score -= n(self.opp_stones_within_2) * w.opp_stones_within_2 * SCALE_DISTANCE_BUCKET;
        score -= n(self.opp_stones_within_4) * w.opp_stones_within_4 * SCALE_DISTANCE_BUCKET;
        score -= n(self.opp_stones_within_6) * w.opp_stones_within_6 * SCALE_DISTANCE_BUCKET;

        score += self.my_proximity_score * w.my_proximity_score * SCALE_PROXIMITY;
        score -= self.opp_proximity_score * w.opp_proximity_score * SCALE_PROXIMITY;

        score -= self.my_min_distance * w.my_min_distance * SCALE_MIN_DISTANCE;
        score += self.opp_min_distance * w.opp_min_distance * SCALE_MIN_DISTANCE;

        score += n(self.my_stones_within_1_rows) * w.my_stones_within_1_rows * SCALE_WITHIN_ROWS;

        score += n(self.my_river_count) * w.my_river_count * SCALE_RIVER;
        score += n(self.my_rivers_near_goal) * w.my_rivers_near_goal * SCALE_RIVER;
        score += n(self.rivers_near_us) * w.rivers_near_us * SCALE_RIVER;
        score += n(self.my_rivers_horizontal) * w.my_rivers_horizontal * SCALE_RIVER;
        score += n(self.my_rivers_vertical) * w.my_rivers_vertical * SCALE_RIVER;
        score -= n(self.opp_river_count) * w.opp_river_count * SCALE_RIVER;
        score -= n(self.opp_rivers_near_goal) * w.opp_rivers_near_goal * SCALE_RIVER;

        score += n(self.opp_stones_blocked) * w.opp_stones_blocked * SCALE_BLOCKING;
        score += n(self.my_blocking_pieces) * w.my_blocking_pieces * SCALE_BLOCKING;

        let (mine, theirs) = (self.my_advancement as f64, self.opp_advancement as f64);
        score += mine * w.my_advancement * SCALE_ADVANCEMENT;
        score -= theirs * w.opp_advancement * SCALE_ADVANCEMENT;
        score += (mine - theirs) * w.advancement_diff * SCALE_ADVANCEMENT;

        score += n(self.my_clear_paths_to_goal) * w.my_clear_paths_to_goal * SCALE_CLEAR_PATH;

        score
    }
}

pub struct FeatureEvaluator {
    config: Arc<EngineConfig>,
}

impl FeatureEvaluator {
    pub const fn new(config: Arc<EngineConfig>) -> Self {
        Self { config }
    }
}

impl Evaluator for FeatureEvaluator {
    fn evaluate(&self, board: &Board, player: Player, cache: &mut PathCache) -> Score {
        let needed = board.win_count();
        if board.scoring_stones(player) >= needed {
            return WIN_SCORE;
        }
        if board.scoring_stones(player.opposite()) >= needed {
            return -WIN_SCORE;
        }
        Features::extract(board, player, cache).score(&self.config.eval)
    }
}
