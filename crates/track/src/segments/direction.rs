use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::track_rng::TrackRng;

/// Upper bound on rejection sampling before falling back to a deterministic pick.
pub const MAX_DIRECTION_SAMPLES: u32 = 16;

/// Lateral drift of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TurnDirection {
    Left,
    #[default]
    Straight,
    Right,
}

impl TurnDirection {
    pub const ALL: [TurnDirection; 3] = [
        TurnDirection::Left,
        TurnDirection::Straight,
        TurnDirection::Right,
    ];

    /// -1 for left, 0 for straight, 1 for right.
    #[inline]
    pub fn sign(self) -> i32 {
        match self {
            TurnDirection::Left => -1,
            TurnDirection::Straight => 0,
            TurnDirection::Right => 1,
        }
    }

    #[inline]
    pub fn is_turn(self) -> bool {
        self != TurnDirection::Straight
    }

    pub fn from_sign(sign: i32) -> Self {
        match sign.signum() {
            -1 => TurnDirection::Left,
            1 => TurnDirection::Right,
            _ => TurnDirection::Straight,
        }
    }
}

/// Lane offset of row `row` within a segment: half a cell of drift per row,
/// rounded up.
#[inline]
pub fn row_offset(direction: TurnDirection, row: i32) -> i32 {
    direction.sign() * ((row + 1) / 2)
}

/// Head x after a segment of `length` rows in `direction`.
#[inline]
pub fn head_shift(direction: TurnDirection, length: i32) -> i32 {
    direction.sign() * (length / 2)
}

/// Whether turning from `head_x` keeps the whole lane inside
/// `[-visible_half_width, visible_half_width]`.
pub fn turn_within_bounds(
    head_x: i32,
    direction: TurnDirection,
    segment_length: i32,
    track_width: i32,
    visible_half_width: f32,
) -> bool {
    let predicted = head_x + head_shift(direction, segment_length);
    let half = track_width / 2;
    (predicted - half) as f32 >= -visible_half_width
        && (predicted + half) as f32 <= visible_half_width
}

/// Sample the next segment's direction.
///
/// Draws uniformly from left/straight/right and rejects a draw that repeats
/// the previous turn or leaves the visible bounds. After
/// `MAX_DIRECTION_SAMPLES` rejections it falls back to steering towards the
/// center (when that is not a repeat), then straight.
pub fn sample_direction(
    rng: &mut TrackRng,
    previous: TurnDirection,
    head_x: i32,
    segment_length: i32,
    track_width: i32,
    visible_half_width: f32,
) -> TurnDirection {
    let acceptable = |candidate: TurnDirection| {
        !(candidate.is_turn() && candidate == previous)
            && turn_within_bounds(
                head_x,
                candidate,
                segment_length,
                track_width,
                visible_half_width,
            )
    };

    for _ in 0..MAX_DIRECTION_SAMPLES {
        let candidate = TurnDirection::from_sign(rng.0.gen_range(-1..2));
        if acceptable(candidate) {
            return candidate;
        }
    }

    let towards_center = TurnDirection::from_sign(-head_x.signum());
    if towards_center.is_turn() && towards_center != previous {
        towards_center
    } else {
        TurnDirection::Straight
    }
}
