//! Segment generation: lane rows with turn drift, walls, the optional barrier
//! row, and the direction sampler that picks each new segment's heading.

pub mod direction;
pub mod generator;

pub use direction::{
    head_shift, row_offset, sample_direction, turn_within_bounds, TurnDirection,
    MAX_DIRECTION_SAMPLES,
};
pub use generator::{emit_segment, GeneratedSegment, TrackState};
