use crate::logic::board::{Orientation, Piece, Player, Side};

// Zobrist-style keys for board signatures.
// Boards come in several sizes, so keys are derived on demand from
// (cell index, piece state) instead of being read from a fixed table.
const NUM_PIECE_STATES: u64 = 6;
const SEED: u64 = 123_456_789;
const GOLDEN: u64 = 0x9E37_79B9_7F4A_7C15;

// Simple XorShift RNG for deterministic keys without dependencies
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    const fn new(seed: u64) -> Self {
        // XorShift never leaves the zero state.
        Self { state: seed | 1 }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

const fn piece_state(piece: Piece) -> u64 {
    let side = match piece.side {
        Side::Stone => 0,
        Side::River(Orientation::Horizontal) => 1,
        Side::River(Orientation::Vertical) => 2,
    };
    let owner = match piece.owner {
        Player::Circle => 0,
        Player::Square => 3,
    };
    owner + side
}

fn mix(value: u64) -> u64 {
    let mut rng = XorShift64::new(SEED ^ value.wrapping_mul(GOLDEN));
    rng.next();
    rng.next()
}

/// Key for `piece` standing on the cell with row-major index `index`.
pub fn piece_key(index: usize, piece: Piece) -> u64 {
    mix((index as u64) * NUM_PIECE_STATES + piece_state(piece) + 1)
}

/// Starting signature of an empty board; keeps equal layouts of different
/// sizes apart.
#[allow(clippy::cast_sign_loss)]
pub fn dimensions_key(rows: i32, cols: i32) -> u64 {
    mix(!(((rows as u64) << 32) | (cols as u64 & 0xFFFF_FFFF)))
}
