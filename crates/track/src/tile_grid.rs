use std::collections::HashSet;

use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

/// Integer grid coordinate. Rows grow upwards, so the track advances
/// towards negative `y`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    pub const ORIGIN: TilePosition = TilePosition { x: 0, y: 0 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileLayer {
    Road,
    Wall,
    Barrier,
}

impl TileLayer {
    pub const ALL: [TileLayer; 3] = [TileLayer::Road, TileLayer::Wall, TileLayer::Barrier];

    #[inline]
    fn index(self) -> usize {
        match self {
            TileLayer::Road => 0,
            TileLayer::Wall => 1,
            TileLayer::Barrier => 2,
        }
    }
}

/// Sparse tile surface with three independent layers. The track is endless,
/// so storage is keyed by coordinate rather than a fixed-size array.
#[derive(Debug, Clone, Default)]
pub struct TileGrid {
    layers: [HashSet<TilePosition>; 3],
}

impl TileGrid {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn has_tile(&self, layer: TileLayer, pos: TilePosition) -> bool {
        self.layers[layer.index()].contains(&pos)
    }

    /// True when any layer carries a tile at `pos`.
    #[inline]
    pub fn occupied(&self, pos: TilePosition) -> bool {
        self.layers.iter().any(|layer| layer.contains(&pos))
    }

    /// Topmost layer at `pos`: barriers sit on top of road, walls never overlap road.
    pub fn layer_at(&self, pos: TilePosition) -> Option<TileLayer> {
        [TileLayer::Barrier, TileLayer::Wall, TileLayer::Road]
            .into_iter()
            .find(|&layer| self.has_tile(layer, pos))
    }

    pub fn set_tile(&mut self, layer: TileLayer, pos: TilePosition) {
        self.layers[layer.index()].insert(pos);
    }

    pub fn clear_tile(&mut self, layer: TileLayer, pos: TilePosition) -> bool {
        self.layers[layer.index()].remove(&pos)
    }

    /// Batched write of one layer.
    pub fn set_tiles(&mut self, layer: TileLayer, positions: &[TilePosition]) {
        let set = &mut self.layers[layer.index()];
        set.reserve(positions.len());
        set.extend(positions.iter().copied());
    }

    /// Batched clear of one layer. Returns the number of tiles actually removed.
    pub fn clear_tiles(&mut self, layer: TileLayer, positions: &[TilePosition]) -> usize {
        let set = &mut self.layers[layer.index()];
        positions.iter().filter(|pos| set.remove(pos)).count()
    }

    pub fn clear_layer(&mut self, layer: TileLayer) {
        self.layers[layer.index()].clear();
    }

    pub fn clear_all(&mut self) {
        for layer in TileLayer::ALL {
            self.clear_layer(layer);
        }
    }

    pub fn tile_count(&self, layer: TileLayer) -> usize {
        self.layers[layer.index()].len()
    }

    pub fn tiles(&self, layer: TileLayer) -> impl Iterator<Item = TilePosition> + '_ {
        self.layers[layer.index()].iter().copied()
    }

    /// World-space center of a cell. Cells are one world unit wide.
    #[inline]
    pub fn cell_center_world(pos: TilePosition) -> Vec2 {
        Vec2::new(pos.x as f32 + 0.5, pos.y as f32 + 0.5)
    }

    #[inline]
    pub fn world_to_cell(world: Vec2) -> TilePosition {
        TilePosition::new(world.x.floor() as i32, world.y.floor() as i32)
    }
}
