//! Per-turn move selection.
//!
//! Each candidate is searched one ply deep and then adjusted with bonuses
//! for the kind of move it is. Near-ties go to river moves first and then
//! to chance. A short history of our own moves keeps the agent from cycling.

use crate::engine::config::EngineConfig;
use crate::engine::distance::{distance_to_goals, distance_with_best_flip};
use crate::engine::path_cache::PathCache;
use crate::engine::search::AlphaBetaEngine;
use crate::engine::{Move, Score, SearchStats};
use crate::logic::board::{Board, Orientation, Player, Position};
use crate::logic::generator::MoveGenerator;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;

/// A flip worth extra credit this turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiverOpportunity {
    pub target: Position,
    /// `Some` when a stone becomes a river, `None` when a river turns back.
    pub orientation: Option<Orientation>,
    pub value: f64,
    pub defensive: bool,
}

impl RiverOpportunity {
    pub const fn as_move(&self) -> Move {
        Move::Flip {
            from: self.target,
            orientation: self.orientation,
        }
    }
}

pub struct Agent {
    player: Player,
    config: Arc<EngineConfig>,
    engine: AlphaBetaEngine,
    generator: MoveGenerator,
    cache: PathCache,
    turn: usize,
    history: VecDeque<Move>,
    rng: StdRng,
    last_stats: SearchStats,
}

impl Agent {
    pub fn new(player: Player, config: Arc<EngineConfig>) -> Self {
        let rng = config
            .seed
            .map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
        Self {
            player,
            engine: AlphaBetaEngine::new(config.clone()),
            config,
            generator: MoveGenerator::new(),
            cache: PathCache::new(),
            turn: 0,
            history: VecDeque::new(),
            rng,
            last_stats: SearchStats::default(),
        }
    }

    pub const fn player(&self) -> Player {
        self.player
    }

    pub const fn turn(&self) -> usize {
        self.turn
    }

    pub const fn history(&self) -> &VecDeque<Move> {
        &self.history
    }

    pub const fn last_stats(&self) -> SearchStats {
        self.last_stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Back to the start of a match: turn counter, history and cache cleared.
    /// The random source carries on.
    pub fn reset(&mut self) {
        self.turn = 0;
        self.history.clear();
        self.cache.invalidate();
        self.last_stats = SearchStats::default();
    }

    /// Picks one move for the current position, or `None` when the agent has
    /// no legal move at all.
    pub fn choose(
        &mut self,
        board: &Board,
        my_time: Option<f64>,
        opponent_time: Option<f64>,
        avoid_repeat: bool,
    ) -> Option<Move> {
        let start = Instant::now();
        self.cache.reset_counters();
        self.engine.reset_nodes();

        if let Some(mv) = self.book_move(board) {
            info!("{} plays book move {} on turn {}", self.player, mv, self.turn);
            self.remember(mv);
            self.last_stats = SearchStats {
                time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
                ..SearchStats::default()
            };
            self.turn += 1;
            return Some(mv);
        }

        let legal = self.generator.generate_moves(board, self.player);
        if legal.is_empty() {
            warn!("{} has no legal moves", self.player);
            return None;
        }

        let depth = self.search_depth(my_time);
        let creation = self.river_opportunities(board);
        let defensive = self.defensive_opportunities(board);

        let mut scored = Vec::with_capacity(legal.len());
        let mut alpha = Score::NEG_INFINITY;
        for mv in &legal {
            let next = board.with_move(mv);
            self.cache.invalidate();
            let base = self.engine.minimax(
                &next,
                depth.saturating_sub(1),
                alpha,
                Score::INFINITY,
                false,
                self.player,
                &mut self.cache,
            );
            alpha = alpha.max(base);
            let bonus = self.move_bonus(board, &next, mv, &creation, &defensive);
            scored.push((*mv, base + bonus));
        }

        let (picked, best_score) = self.pick(&scored)?;
        let chosen = if avoid_repeat {
            self.avoid_repetition(picked, &legal)
        } else {
            self.remember(picked);
            picked
        };

        self.last_stats = SearchStats {
            depth,
            nodes: self.engine.nodes_searched(),
            time_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            score: best_score,
            cache_hits: self.cache.hits(),
            cache_misses: self.cache.misses(),
        };
        debug!(
            "{} turn {}: {} of {} candidates, best {:.0}, nodes {}, cache {}/{} hit/miss, clock {:?}/{:?}",
            self.player,
            self.turn,
            chosen,
            legal.len(),
            best_score,
            self.last_stats.nodes,
            self.last_stats.cache_hits,
            self.last_stats.cache_misses,
            my_time,
            opponent_time,
        );
        self.turn += 1;
        Some(chosen)
    }

    fn search_depth(&self, my_time: Option<f64>) -> u8 {
        match my_time {
            Some(t) if t < self.config.low_time_secs => 1,
            _ => self.config.depth.max(1),
        }
    }

    /// The scripted move for this turn, if there is one, it is legal for us
    /// here and it actually changes the board.
    fn book_move(&self, board: &Board) -> Option<Move> {
        let mv = self.config.opening_book.book_move(self.player, self.turn)?;
        if !self.generator.generate_moves(board, self.player).contains(&mv) {
            warn!("{} skips book move {} that is not legal here", self.player, mv);
            return None;
        }
        if board.with_move(&mv) == *board {
            warn!("{} skips book move {} that does not fit the board", self.player, mv);
            return None;
        }
        Some(mv)
    }

    /// Stones that would get much closer to goal by becoming a river, best
    /// first, at most `creation_cap` of them.
    pub fn river_opportunities(&mut self, board: &Board) -> Vec<RiverOpportunity> {
        let goals = board.goal_cells(self.player);
        let per_hop = self.config.policy.creation_per_hop;
        let mut found = Vec::new();

        for pos in board.stones_of(self.player).collect::<Vec<_>>() {
            let current = distance_to_goals(board, pos, &goals, self.player, &mut self.cache);
            let (flipped, orientation) =
                distance_with_best_flip(board, pos, &goals, self.player, &mut self.cache);
            let (Some(orientation), Some(flipped)) = (orientation, flipped) else {
                continue;
            };
            let current = f64::from(current.capped());
            let flipped = f64::from(flipped);
            if flipped < current - 1.0 {
                found.push(RiverOpportunity {
                    target: pos,
                    orientation: Some(orientation),
                    value: (current - flipped) * per_hop,
                    defensive: false,
                });
            }
        }

        rank(found, self.config.creation_cap)
    }

    /// Flips of our own pieces lying on a threatening opponent stone's path
    /// that push that stone further from its goal without costing any of our
    /// stones more than two hops. Best first, at most `defensive_cap`.
    pub fn defensive_opportunities(&mut self, board: &Board) -> Vec<RiverOpportunity> {
        let opponent = self.player.opposite();
        let opp_goals = board.goal_cells(opponent);
        let my_goals = board.goal_cells(self.player);
        let per_hop = self.config.policy.defensive_per_hop;
        let my_stones: Vec<Position> = board.stones_of(self.player).collect();

        let mut threats = Vec::new();
        for pos in board.stones_of(opponent).collect::<Vec<_>>() {
            let result = distance_to_goals(board, pos, &opp_goals, opponent, &mut self.cache);
            if let Some(d) = result.distance.filter(|&d| d < 6) {
                threats.push((pos, d, result.path));
            }
        }

        let mut found = Vec::new();
        for (threat, dist, path) in threats {
            let inner = path.get(1..path.len().saturating_sub(1)).unwrap_or_default();
            for &cell in inner {
                let Some(piece) = board.get(cell).filter(|p| p.owner == self.player) else {
                    continue;
                };
                let flips: Vec<Option<Orientation>> = if piece.is_stone() {
                    vec![Some(Orientation::Horizontal), Some(Orientation::Vertical)]
                } else {
                    vec![None]
                };

                for orientation in flips {
                    let trial = RiverOpportunity {
                        target: cell,
                        orientation,
                        value: 0.0,
                        defensive: true,
                    };
                    let scratch = board.with_move(&trial.as_move());
                    let after = distance_to_goals(
                        &scratch,
                        threat,
                        &opp_goals,
                        opponent,
                        &mut self.cache,
                    )
                    .capped();
                    if after <= dist + 1 || self.hurts_us(board, &scratch, &my_stones, &my_goals) {
                        continue;
                    }
                    found.push(RiverOpportunity {
                        value: f64::from(after - dist) * per_hop,
                        ..trial
                    });
                }
            }
        }

        rank(found, self.config.defensive_cap)
    }

    fn hurts_us(
        &mut self,
        before: &Board,
        after: &Board,
        stones: &[Position],
        goals: &[Position],
    ) -> bool {
        stones.iter().any(|&s| {
            let was = distance_to_goals(before, s, goals, self.player, &mut self.cache).capped();
            let now = distance_to_goals(after, s, goals, self.player, &mut self.cache).capped();
            now > was + 2
        })
    }

    fn distance(&mut self, board: &Board, pos: Position) -> u32 {
        let goals = board.goal_cells(self.player);
        distance_to_goals(board, pos, &goals, self.player, &mut self.cache).capped()
    }

    /// Move-class bonus on top of the search score.
    fn move_bonus(
        &mut self,
        board: &Board,
        next: &Board,
        mv: &Move,
        creation: &[RiverOpportunity],
        defensive: &[RiverOpportunity],
    ) -> f64 {
        let config = Arc::clone(&self.config);
        let w = &config.policy;
        #[allow(clippy::cast_precision_loss)]
        let urgency = w.urgency_base + next.scoring_stones(self.player) as f64;

        match *mv {
            Move::Push {
                from,
                over,
                pushed_to,
            } => {
                let travel = mv.travel();
                if travel > 1 {
                    let mut bonus = f64::from(travel) * w.push_per_cell;
                    if next.is_my_score_cell(pushed_to, self.player) {
                        bonus += w.push_into_goal;
                    } else if board
                        .get(over)
                        .is_some_and(|p| p.owner == self.player && p.is_stone())
                        && self.distance(next, pushed_to) < w.push_near_goal_distance
                    {
                        bonus += w.push_near_goal;
                    }
                    bonus
                } else {
                    let before = self.distance(board, from);
                    let after = self.distance(next, over);
                    if before == 0 {
                        w.step_at_goal
                    } else {
                        (20.0 - f64::from(after.min(20))).powi(2) * w.step_push_curve
                    }
                }
            }
            Move::Move { from, to } => {
                if !board.get(from).is_some_and(|p| p.is_stone()) {
                    return 0.0;
                }
                let before = self.distance(board, from);
                let after = self.distance(next, to);

                let mut bonus = if mv.is_multi_cell() {
                    let improvement = f64::from(before) - f64::from(after);
                    improvement.powi(3) * w.river_progress
                } else if before == 0 {
                    w.step_at_goal
                } else {
                    (20.0 - f64::from(after.min(20))).powi(3) * w.step_move_curve
                };

                for (tier, &tier_bonus) in w.tier_bonus.iter().enumerate() {
                    let tier_dist = u32::try_from(tier).unwrap_or(u32::MAX);
                    if after == tier_dist && before > tier_dist {
                        bonus += if tier < w.urgent_tiers {
                            tier_bonus * urgency
                        } else {
                            tier_bonus
                        };
                        break;
                    }
                }
                bonus
            }
            Move::Flip { from, orientation } => {
                let mut bonus = 0.0;
                if let Some(opp) = creation.iter().find(|o| o.as_move() == *mv) {
                    bonus += opp.value;
                }
                if let Some(def) = defensive.iter().find(|o| o.as_move() == *mv) {
                    bonus += def.value;
                }
                let near_goal =
                    (from.y - board.goal_row(self.player)).abs() <= w.flip_near_goal_rows;
                if orientation.is_some() && near_goal {
                    bonus += w.flip_near_goal;
                }
                bonus
            }
            Move::Rotate { .. } => w.rotate,
        }
    }

    /// Best-scoring move; among moves within `tie_epsilon` of the best, river
    /// moves win and the rest is left to chance.
    fn pick(&mut self, scored: &[(Move, Score)]) -> Option<(Move, Score)> {
        let best = scored
            .iter()
            .map(|&(_, s)| s)
            .fold(Score::NEG_INFINITY, Score::max);
        let near: Vec<Move> = scored
            .iter()
            .filter(|&&(_, s)| best - s < self.config.tie_epsilon)
            .map(|&(m, _)| m)
            .collect();
        let rivers: Vec<Move> = near.iter().copied().filter(Move::is_multi_cell).collect();
        let pool = if rivers.is_empty() { near } else { rivers };
        pool.choose(&mut self.rng).map(|&m| (m, best))
    }

    /// Records `chosen` and, if that makes it one repeat too many, swaps it
    /// for a random legal move that has not been repeated as often.
    fn avoid_repetition(&mut self, chosen: Move, legal: &[Move]) -> Move {
        self.remember(chosen);
        let limit = self.config.repeat_limit;
        if self.repeats(&chosen) <= limit {
            return chosen;
        }

        let alternatives: Vec<Move> = legal
            .iter()
            .copied()
            .filter(|m| self.repeats(m) <= limit)
            .collect();
        let Some(&alt) = alternatives.choose(&mut self.rng) else {
            return chosen;
        };
        info!(
            "{} avoids repeating {} (played {} times recently), plays {} instead",
            self.player,
            chosen,
            self.repeats(&chosen),
            alt
        );
        self.history.pop_back();
        self.history.push_back(alt);
        alt
    }

    fn repeats(&self, mv: &Move) -> usize {
        self.history.iter().filter(|m| *m == mv).count()
    }

    fn remember(&mut self, mv: Move) {
        self.history.push_back(mv);
        while self.history.len() > self.config.history_len {
            self.history.pop_front();
        }
    }
}

fn rank(mut found: Vec<RiverOpportunity>, cap: usize) -> Vec<RiverOpportunity> {
    found.sort_by(|a, b| b.value.total_cmp(&a.value));
    found.truncate(cap);
    found
}
