// Learned feature weights. Each feature is multiplied by its scale first and
// then by its weight; the weights come from an offline fit and sum to ~2.

pub const W_MY_SCORING_STONES: f64 = 0.088_790_476_3;
pub const W_OPP_SCORING_STONES: f64 = 0.099_998_161_2;

pub const W_MY_MIN_DISTANCE: f64 = 0.086_827_844_4;
pub const W_MY_PROXIMITY_SCORE: f64 = 0.076_305_136_1;
pub const W_MY_STONES_WITHIN_2: f64 = 0.108_961_612_0;
pub const W_MY_STONES_WITHIN_4: f64 = 0.092_351_369_6;
pub const W_MY_STONES_WITHIN_6: f64 = 0.103_209_950_0;
pub const W_MY_STONES_WITHIN_1_ROWS: f64 = 0.101_995_386_2;

pub const W_OPP_MIN_DISTANCE: f64 = 0.102_060_794_8;
pub const W_OPP_PROXIMITY_SCORE: f64 = 0.060_609_359_3;
pub const W_OPP_STONES_WITHIN_2: f64 = 0.078_766_390_7;
pub const W_OPP_STONES_WITHIN_4: f64 = 0.081_372_395_2;
pub const W_OPP_STONES_WITHIN_6: f64 = 0.106_364_578_0;

pub const W_MY_RIVER_COUNT: f64 = 0.057_693_876_3;
pub const W_MY_RIVERS_HORIZONTAL: f64 = 0.083_654_500_5;
pub const W_MY_RIVERS_NEAR_GOAL: f64 = 0.081_220_194_7;
pub const W_RIVERS_NEAR_US: f64 = 0.085_007_265_2;
pub const W_MY_RIVERS_VERTICAL: f64 = 0.079_191_826_3;
pub const W_OPP_RIVER_COUNT: f64 = 0.076_986_670_5;
pub const W_OPP_RIVERS_NEAR_GOAL: f64 = 0.068_337_425_6;

pub const W_MY_BLOCKING_PIECES: f64 = 0.037_965_532_4;
pub const W_OPP_STONES_BLOCKED: f64 = 0.078_868_761_7;

pub const W_ADVANCEMENT_DIFF: f64 = 0.047_985_926_3;
pub const W_MY_ADVANCEMENT: f64 = 0.062_837_377_2;
pub const W_OPP_ADVANCEMENT: f64 = 0.042_971_879_2;

pub const W_MY_CLEAR_PATHS_TO_GOAL: f64 = 0.073_908_269_4;

// Feature scales: bring raw counts and curves to comparable magnitudes.
pub const SCALE_SCORING: f64 = 10_000_000.0;
pub const SCALE_DISTANCE_BUCKET: f64 = 1_000_000.0;
pub const SCALE_PROXIMITY: f64 = 10_000.0;
pub const SCALE_MIN_DISTANCE: f64 = 100_000.0;
pub const SCALE_WITHIN_ROWS: f64 = 100_000.0;
pub const SCALE_RIVER: f64 = 100_000.0;
pub const SCALE_BLOCKING: f64 = 100_000.0;
pub const SCALE_ADVANCEMENT: f64 = 1_000.0;
pub const SCALE_CLEAR_PATH: f64 = 1_000_000.0;

/// Score of a decided game. Symmetric so a win for one side reads as the
/// exact negation of the same position seen by the other.
pub const WIN_SCORE: f64 = 1e15;

/// Stand-in for "no path" wherever a distance feeds arithmetic.
pub const DISTANCE_CAP: u32 = 25;

/// Minimum-distance feature value when a side has no stone with a path.
pub const NO_PATH_MIN_DISTANCE: f64 = 999.0;
