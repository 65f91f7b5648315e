use crate::logic::eval_constants::{
    W_ADVANCEMENT_DIFF, W_MY_ADVANCEMENT, W_MY_BLOCKING_PIECES, W_MY_CLEAR_PATHS_TO_GOAL,
    W_MY_MIN_DISTANCE, W_MY_PROXIMITY_SCORE, W_MY_RIVERS_HORIZONTAL, W_MY_RIVERS_NEAR_GOAL,
    W_MY_RIVERS_VERTICAL, W_MY_RIVER_COUNT, W_MY_SCORING_STONES, W_MY_STONES_WITHIN_1_ROWS,
    W_MY_STONES_WITHIN_2, W_MY_STONES_WITHIN_4, W_MY_STONES_WITHIN_6, W_OPP_ADVANCEMENT,
    W_OPP_MIN_DISTANCE, W_OPP_PROXIMITY_SCORE, W_OPP_RIVERS_NEAR_GOAL, W_OPP_RIVER_COUNT,
    W_OPP_SCORING_STONES, W_OPP_STONES_BLOCKED, W_OPP_STONES_WITHIN_2, W_OPP_STONES_WITHIN_4,
    W_OPP_STONES_WITHIN_6, W_RIVERS_NEAR_US,
};
use crate::logic::opening::OpeningBook;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Search
    pub depth: u8,
    /// Below this many seconds on the clock the search drops to depth 1.
    pub low_time_secs: f64,

    // Selection
    pub tie_epsilon: f64,
    pub creation_cap: usize,
    pub defensive_cap: usize,
    pub seed: Option<u64>,

    // Repetition
    pub avoid_repetition: bool,
    pub history_len: usize,
    pub repeat_limit: usize,

    pub policy: PolicyWeights,
    pub eval: EvalWeights,
    pub opening_book: OpeningBook,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            depth: 2,
            low_time_secs: 2.0,

            tie_epsilon: 100.0,
            creation_cap: 3,
            defensive_cap: 4,
            seed: None,

            avoid_repetition: true,
            history_len: 6,
            repeat_limit: 2,

            policy: PolicyWeights::default(),
            eval: EvalWeights::default(),
            opening_book: OpeningBook::default(),
        }
    }
}

impl EngineConfig {
    /// Absolute values; anything missing keeps its default.
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }
}

/// Hand-tuned bonuses the move selection layer adds on top of the search score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyWeights {
    pub push_per_cell: f64,
    pub push_into_goal: f64,
    pub push_near_goal: f64,
    pub push_near_goal_distance: u32,
    pub step_at_goal: f64,
    pub step_push_curve: f64,
    pub step_move_curve: f64,
    pub river_progress: f64,
    /// Bonus for bringing a stone to distance 0, 1, 2, ... from further away.
    pub tier_bonus: Vec<f64>,
    /// How many of the leading tiers are multiplied by urgency.
    pub urgent_tiers: usize,
    pub urgency_base: f64,
    pub creation_per_hop: f64,
    pub defensive_per_hop: f64,
    pub flip_near_goal: f64,
    pub flip_near_goal_rows: i32,
    pub rotate: f64,
}

impl Default for PolicyWeights {
    fn default() -> Self {
        Self {
            push_per_cell: 1_000.0,
            push_into_goal: 5e7,
            push_near_goal: 80_000.0,
            push_near_goal_distance: 3,
            step_at_goal: 100.0,
            step_push_curve: 500.0,
            step_move_curve: 500.0,
            river_progress: 100_000.0,
            tier_bonus: vec![5e8, 5e7, 1e7, 1e6, 1e5, 1e4],
            urgent_tiers: 2,
            urgency_base: 2.0,
            creation_per_hop: 1_000.0,
            defensive_per_hop: 2_000.0,
            flip_near_goal: 3_000.0,
            flip_near_goal_rows: 4,
            rotate: 1_000.0,
        }
    }
}

/// Evaluator feature weights. Defaults are the learned constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalWeights {
    pub my_scoring_stones: f64,
    pub opp_scoring_stones: f64,
    pub my_min_distance: f64,
    pub my_proximity_score: f64,
    pub my_stones_within_2: f64,
    pub my_stones_within_4: f64,
    pub my_stones_within_6: f64,
    pub my_stones_within_1_rows: f64,
    pub opp_min_distance: f64,
    pub opp_proximity_score: f64,
    pub opp_stones_within_2: f64,
    pub opp_stones_within_4: f64,
    pub opp_stones_within_6: f64,
    pub my_river_count: f64,
    pub my_rivers_horizontal: f64,
    pub my_rivers_near_goal: f64,
    pub rivers_near_us: f64,
    pub my_rivers_vertical: f64,
    pub opp_river_count: f64,
    pub opp_rivers_near_goal: f64,
    pub my_blocking_pieces: f64,
    pub opp_stones_blocked: f64,
    pub advancement_diff: f64,
    pub my_advancement: f64,
    pub opp_advancement: f64,
    pub my_clear_paths_to_goal: f64,
}

impl Default for EvalWeights {
    fn default() -> Self {
        Self {
            my_scoring_stones: W_MY_SCORING_STONES,
            opp_scoring_stones: W_OPP_SCORING_STONES,
            my_min_distance: W_MY_MIN_DISTANCE,
            my_proximity_score: W_MY_PROXIMITY_SCORE,
            my_stones_within_2: W_MY_STONES_WITHIN_2,
            my_stones_within_4: W_MY_STONES_WITHIN_4,
            my_stones_within_6: W_MY_STONES_WITHIN_6,
            my_stones_within_1_rows: W_MY_STONES_WITHIN_1_ROWS,
            opp_min_distance: W_OPP_MIN_DISTANCE,
            opp_proximity_score: W_OPP_PROXIMITY_SCORE,
            opp_stones_within_2: W_OPP_STONES_WITHIN_2,
            opp_stones_within_4: W_OPP_STONES_WITHIN_4,
            opp_stones_within_6: W_OPP_STONES_WITHIN_6,
            my_river_count: W_MY_RIVER_COUNT,
            my_rivers_horizontal: W_MY_RIVERS_HORIZONTAL,
            my_rivers_near_goal: W_MY_RIVERS_NEAR_GOAL,
            rivers_near_us: W_RIVERS_NEAR_US,
            my_rivers_vertical: W_MY_RIVERS_VERTICAL,
            opp_river_count: W_OPP_RIVER_COUNT,
            opp_rivers_near_goal: W_OPP_RIVERS_NEAR_GOAL,
            my_blocking_pieces: W_MY_BLOCKING_PIECES,
            opp_stones_blocked: W_OPP_STONES_BLOCKED,
            advancement_diff: W_ADVANCEMENT_DIFF,
            my_advancement: W_MY_ADVANCEMENT,
            opp_advancement: W_OPP_ADVANCEMENT,
            my_clear_paths_to_goal: W_MY_CLEAR_PATHS_TO_GOAL,
        }
    }
}

#[derive(Deserialize)]
struct EvalScalesJson {
    my_scoring_stones: Option<f64>,
    opp_scoring_stones: Option<f64>,
    my_min_distance: Option<f64>,
    my_proximity_score: Option<f64>,
    my_stones_within_2: Option<f64>,
    my_stones_within_4: Option<f64>,
    my_stones_within_6: Option<f64>,
    my_stones_within_1_rows: Option<f64>,
    opp_min_distance: Option<f64>,
    opp_proximity_score: Option<f64>,
    opp_stones_within_2: Option<f64>,
    opp_stones_within_4: Option<f64>,
    opp_stones_within_6: Option<f64>,
    my_river_count: Option<f64>,
    my_rivers_horizontal: Option<f64>,
    my_rivers_near_goal: Option<f64>,
    rivers_near_us: Option<f64>,
    my_rivers_vertical: Option<f64>,
    opp_river_count: Option<f64>,
    opp_rivers_near_goal: Option<f64>,
    my_blocking_pieces: Option<f64>,
    opp_stones_blocked: Option<f64>,
    advancement_diff: Option<f64>,
    my_advancement: Option<f64>,
    opp_advancement: Option<f64>,
    my_clear_paths_to_goal: Option<f64>,
}

impl EvalWeights {
    /// Multipliers on top of the learned defaults: `{"my_proximity_score": 1.5}`
    /// makes that feature count half again as much.
    pub fn load_scales_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let s: EvalScalesJson = serde_json::from_str(json_str)?;
        let d = Self::default();

        Ok(Self {
            my_scoring_stones: apply_scale(d.my_scoring_stones, s.my_scoring_stones),
            opp_scoring_stones: apply_scale(d.opp_scoring_stones, s.opp_scoring_stones),
            my_min_distance: apply_scale(d.my_min_distance, s.my_min_distance),
            my_proximity_score: apply_scale(d.my_proximity_score, s.my_proximity_score),
            my_stones_within_2: apply_scale(d.my_stones_within_2, s.my_stones_within_2),
            my_stones_within_4: apply_scale(d.my_stones_within_4, s.my_stones_within_4),
            my_stones_within_6: apply_scale(d.my_stones_within_6, s.my_stones_within_6),
            my_stones_within_1_rows: apply_scale(
                d.my_stones_within_1_rows,
                s.my_stones_within_1_rows,
            ),
            opp_min_distance: apply_scale(d.opp_min_distance, s.opp_min_distance),
            opp_proximity_score: apply_scale(d.opp_proximity_score, s.opp_proximity_score),
            opp_stones_within_2: apply_scale(d.opp_stones_within_2, s.opp_stones_within_2),
            opp_stones_within_4: apply_scale(d.opp_stones_within_4, s.opp_stones_within_4),
            opp_stones_within_6: apply_scale(d.opp_stones_within_6, s.opp_stones_within_6),
            my_river_count: apply_scale(d.my_river_count, s.my_river_count),
            my_rivers_horizontal: apply_scale(d.my_rivers_horizontal, s.my_rivers_horizontal),
            my_rivers_near_goal: apply_scale(d.my_rivers_near_goal, s.my_rivers_near_goal),
            rivers_near_us: apply_scale(d.rivers_near_us, s.rivers_near_us),
            my_rivers_vertical: apply_scale(d.my_rivers_vertical, s.my_rivers_vertical),
            opp_river_count: apply_scale(d.opp_river_count, s.opp_river_count),
            opp_rivers_near_goal: apply_scale(d.opp_rivers_near_goal, s.opp_rivers_near_goal),
            my_blocking_pieces: apply_scale(d.my_blocking_pieces, s.my_blocking_pieces),
            opp_stones_blocked: apply_scale(d.opp_stones_blocked, s.opp_stones_blocked),
            advancement_diff: apply_scale(d.advancement_diff, s.advancement_diff),
            my_advancement: apply_scale(d.my_advancement, s.my_advancement),
            opp_advancement: apply_scale(d.opp_advancement, s.opp_advancement),
            my_clear_paths_to_goal: apply_scale(
                d.my_clear_paths_to_goal,
                s.my_clear_paths_to_goal,
            ),
        })
    }
}

fn apply_scale(default_val: f64, scale: Option<f64>) -> f64 {
    scale.map_or(default_val, |s| default_val * s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_default() {
        let config = EngineConfig::load_from_json("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.depth, 2);
        assert_eq!(config.history_len, 6);
        assert_eq!(config.repeat_limit, 2);
    }

    #[test]
    fn test_load_config_partial() {
        let json = r#"{
            "depth": 3,
            "seed": 42,
            "policy": { "rotate": 5.0 }
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.seed, Some(42));
        assert!((config.policy.rotate - 5.0).abs() < f64::EPSILON);
        // Others should be default
        assert!((config.policy.flip_near_goal - 3_000.0).abs() < f64::EPSILON);
        assert_eq!(config.eval, EvalWeights::default());
    }

    #[test]
    fn test_load_config_with_book() {
        let json = r#"{
            "opening_book": {
                "circle": [{"action": "flip", "from": [3, 9], "orientation": "horizontal"}]
            }
        }"#;
        let config = EngineConfig::load_from_json(json).unwrap();
        assert_eq!(config.opening_book.circle.len(), 1);
        assert!(config.opening_book.square.is_empty());
    }

    #[test]
    fn test_load_config_invalid_json() {
        assert!(EngineConfig::load_from_json("{ invalid json }").is_err());
    }

    #[test]
    fn test_load_scales() {
        let json = r#"{
            "my_proximity_score": 2.0,
            "opp_river_count": 0.5
        }"#;
        let w = EvalWeights::load_scales_from_json(json).unwrap();
        assert!((w.my_proximity_score - W_MY_PROXIMITY_SCORE * 2.0).abs() < 1e-12);
        assert!((w.opp_river_count - W_OPP_RIVER_COUNT * 0.5).abs() < 1e-12);
        assert!((w.my_advancement - W_MY_ADVANCEMENT).abs() < 1e-12);
    }

    #[test]
    fn test_load_scales_empty_is_default() {
        let w = EvalWeights::load_scales_from_json("{}").unwrap();
        assert_eq!(w, EvalWeights::default());
    }
}
