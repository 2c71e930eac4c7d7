use bevy::math::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::OCCUPANCY_RADIUS;

/// A spawnable obstacle variant with its relative spawn weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstacleKind {
    /// Prototype name the host maps to its own renderable/collider.
    pub name: String,
    /// Relative weight, 1-100.
    pub spawn_weight: u32,
    /// Ramps are never placed in turning segments.
    #[serde(default)]
    pub is_ramp: bool,
}

impl ObstacleKind {
    pub fn new(name: impl Into<String>, spawn_weight: u32, is_ramp: bool) -> Self {
        Self {
            name: name.into(),
            spawn_weight,
            is_ramp,
        }
    }

    pub fn default_set() -> Vec<ObstacleKind> {
        vec![
            ObstacleKind::new("rock", 40, false),
            ObstacleKind::new("oil_slick", 30, false),
            ObstacleKind::new("ramp", 15, true),
        ]
    }
}

/// Generational handle into an [`ObstacleArena`]. A handle outlives its
/// obstacle safely: once the slot is reused the old handle stops resolving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObstacleHandle {
    index: u32,
    generation: u32,
}

/// A live obstacle instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleInstance {
    pub kind: ObstacleKind,
    pub position: Vec2,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    instance: Option<ObstacleInstance>,
}

/// Slot storage for spawned obstacles. The host may move or destroy entries
/// through their handles; the session notices and prunes its tracking list.
#[derive(Debug, Clone, Default)]
pub struct ObstacleArena {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl ObstacleArena {
    pub fn spawn(&mut self, instance: ObstacleInstance) -> ObstacleHandle {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.instance = Some(instance);
            return ObstacleHandle {
                index,
                generation: slot.generation,
            };
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            instance: Some(instance),
        });
        ObstacleHandle {
            index,
            generation: 0,
        }
    }

    pub fn despawn(&mut self, handle: ObstacleHandle) -> Option<ObstacleInstance> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation {
            return None;
        }
        let instance = slot.instance.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.live -= 1;
        Some(instance)
    }

    pub fn get(&self, handle: ObstacleHandle) -> Option<&ObstacleInstance> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.instance.as_ref())
    }

    #[inline]
    pub fn is_alive(&self, handle: ObstacleHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn position(&self, handle: ObstacleHandle) -> Option<Vec2> {
        self.get(handle).map(|instance| instance.position)
    }

    /// Move a live obstacle. Returns `false` for a stale handle.
    pub fn set_position(&mut self, handle: ObstacleHandle, position: Vec2) -> bool {
        match self.slots.get_mut(handle.index as usize) {
            Some(slot) if slot.generation == handle.generation => match &mut slot.instance {
                Some(instance) => {
                    instance.position = position;
                    true
                }
                None => false,
            },
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObstacleHandle, &ObstacleInstance)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.instance.as_ref().map(|instance| {
                (
                    ObstacleHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    instance,
                )
            })
        })
    }

    /// Destroy every obstacle. Outstanding handles all become stale.
    pub fn clear(&mut self) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.instance.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(index as u32);
            }
        }
        self.live = 0;
    }
}

/// Session-side record of a spawned obstacle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedObstacle {
    pub handle: ObstacleHandle,
    /// Last known world position, refreshed from the arena every tick.
    pub position: Vec2,
    /// Reserved for safe-zone violation bookkeeping.
    pub checked_for_safe_zone_violation: bool,
}

/// The obstacle arena plus the session's tracking list.
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    pub arena: ObstacleArena,
    tracked: Vec<TrackedObstacle>,
}

impl ObstacleField {
    pub fn spawn(&mut self, kind: ObstacleKind, position: Vec2) -> ObstacleHandle {
        let handle = self.arena.spawn(ObstacleInstance { kind, position });
        self.tracked.push(TrackedObstacle {
            handle,
            position,
            checked_for_safe_zone_violation: false,
        });
        handle
    }

    pub fn tracked(&self) -> &[TrackedObstacle] {
        &self.tracked
    }

    pub(crate) fn tracked_mut(&mut self) -> &mut Vec<TrackedObstacle> {
        &mut self.tracked
    }

    /// Live tracked obstacles, skipping entries whose handle went stale.
    pub fn live(&self) -> impl Iterator<Item = &TrackedObstacle> {
        self.tracked
            .iter()
            .filter(|obstacle| self.arena.is_alive(obstacle.handle))
    }

    /// True when a live obstacle sits within `OCCUPANCY_RADIUS` of `point`.
    pub fn occupies(&self, point: Vec2) -> bool {
        self.live()
            .any(|obstacle| obstacle.position.distance(point) < OCCUPANCY_RADIUS)
    }

    /// Destroy every obstacle and forget all tracking.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.tracked.clear();
    }
}
