use std::collections::{HashSet, VecDeque};

use crate::barriers::{BarrierDraft, BarrierPlan};
use crate::tile_grid::{TileGrid, TileLayer, TilePosition};

use super::direction::{head_shift, row_offset, TurnDirection};

/// Generation cursor plus the FIFO history the tile window evicts from.
#[derive(Debug, Clone)]
pub struct TrackState {
    /// Top-center of the next segment.
    pub head: TilePosition,
    /// Direction of the most recent segment.
    pub direction: TurnDirection,
    pub track_width: i32,
    /// Every road tile placed, oldest first.
    pub road_tiles: VecDeque<TilePosition>,
    /// Every barrier tile placed, oldest first.
    pub barrier_tiles: VecDeque<TilePosition>,
}

impl TrackState {
    pub fn new(track_width: i32) -> Self {
        Self {
            head: TilePosition::ORIGIN,
            direction: TurnDirection::Straight,
            track_width,
            road_tiles: VecDeque::new(),
            barrier_tiles: VecDeque::new(),
        }
    }

    pub fn reset(&mut self, track_width: i32) {
        self.head = TilePosition::ORIGIN;
        self.direction = TurnDirection::Straight;
        self.track_width = track_width;
        self.road_tiles.clear();
        self.barrier_tiles.clear();
    }
}

/// Tiles emitted for one segment, as committed to the grid.
#[derive(Debug, Clone, Default)]
pub struct GeneratedSegment {
    pub direction: TurnDirection,
    pub road: Vec<TilePosition>,
    pub left_walls: Vec<TilePosition>,
    pub right_walls: Vec<TilePosition>,
    /// Gate for this segment, if one was planned. May carry no tiles.
    pub barrier: Option<BarrierDraft>,
}

/// Emit one segment of `length` rows and `width` lane at the current head,
/// commit it to `grid` in one batch per layer, and advance the head.
///
/// Rows drift by `row_offset` when turning. Walls go one cell beyond each
/// lane edge wherever the cell is still empty, plus a second "gap" cell one
/// further out so diagonal steps in a turn leave no single-cell notch. With a
/// `barrier` plan, row 0 turns every lane cell outside the opening into a
/// barrier tile.
pub fn emit_segment(
    state: &mut TrackState,
    grid: &mut TileGrid,
    length: i32,
    width: i32,
    direction: TurnDirection,
    barrier: Option<BarrierPlan>,
) -> GeneratedSegment {
    state.track_width = width;
    state.direction = direction;

    let half = width.max(0) / 2;
    let head = state.head;
    let rows = length.max(0);
    let lane = (2 * half + 1) as usize;

    let mut segment = GeneratedSegment {
        direction,
        road: Vec::with_capacity(rows as usize * lane),
        left_walls: Vec::with_capacity(rows as usize * 2),
        right_walls: Vec::with_capacity(rows as usize * 2),
        barrier: barrier.map(|plan| BarrierDraft::new(head, plan)),
    };
    let mut pending_road: HashSet<TilePosition> =
        HashSet::with_capacity(segment.road.capacity());

    for y in 0..rows {
        let offset = row_offset(direction, y);
        let row = head.y - y;

        for x in -half..=half {
            let pos = TilePosition::new(head.x + x + offset, row);
            segment.road.push(pos);
            pending_road.insert(pos);
            state.road_tiles.push_back(pos);

            if y == 0 {
                if let Some(draft) = segment.barrier.as_mut() {
                    if !draft.plan.is_opening(x) {
                        draft.barrier_positions.push(pos);
                        state.barrier_tiles.push_back(pos);
                    }
                }
            }
        }

        let has_road = |pos: TilePosition| {
            grid.has_tile(TileLayer::Road, pos) || pending_road.contains(&pos)
        };
        let is_empty =
            |pos: TilePosition| !has_road(pos) && !grid.has_tile(TileLayer::Wall, pos);

        let left_wall = TilePosition::new(head.x - half - 1 + offset, row);
        let right_wall = TilePosition::new(head.x + half + 1 + offset, row);
        if is_empty(left_wall) {
            segment.left_walls.push(left_wall);
        }
        if is_empty(right_wall) {
            segment.right_walls.push(right_wall);
        }

        // Gap cells fill the diagonal step a drifting lane leaves between rows.
        // Neither side may put one over road, which keeps the drift side open.
        let left_gap = left_wall.offset(-1, 0);
        let right_gap = right_wall.offset(1, 0);
        if is_empty(left_gap) {
            segment.left_walls.push(left_gap);
        }
        if is_empty(right_gap) {
            segment.right_walls.push(right_gap);
        }

        segment.left_walls.retain(|&pos| !has_road(pos));
        segment.right_walls.retain(|&pos| !has_road(pos));
    }

    grid.set_tiles(TileLayer::Road, &segment.road);
    grid.set_tiles(TileLayer::Wall, &segment.left_walls);
    grid.set_tiles(TileLayer::Wall, &segment.right_walls);
    if let Some(draft) = &segment.barrier {
        grid.set_tiles(TileLayer::Barrier, &draft.barrier_positions);
    }

    state.head.y -= rows;
    state.head.x += head_shift(direction, rows);

    segment
}
