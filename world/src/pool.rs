//! Prototype-keyed object pool with generational handles.
//!
//! Every prototype owns a FIFO queue of despawned instances and the set of
//! instances currently in use. A handle lives in exactly one of the two.
//! Reusing a slot bumps its generation so handles kept past a despawn never
//! alias the slot's next occupant.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use glam::Vec2;
use log::{trace, warn};
use thiserror::Error;
use waypoint_defence_core::{EntityHandle, PrototypeId};

/// Transform applied to an instance when it is spawned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// World position.
    pub position: Vec2,
    /// Rotation in radians.
    pub rotation: f32,
    /// Non-uniform scale.
    pub scale: Vec2,
    /// Instance the spawned instance is attached to, if any.
    pub parent: Option<EntityHandle>,
}

impl Placement {
    /// Creates an unparented placement at the provided position.
    #[must_use]
    pub const fn at(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
            scale: Vec2::ONE,
            parent: None,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Vec2::ZERO)
    }
}

/// Reasons a despawn request may be rejected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    /// The handle was never issued or refers to a reused slot.
    #[error("instance {0:?} is not tracked by any pool")]
    Untracked(EntityHandle),
    /// The instance is already waiting in its pool.
    #[error("instance {0:?} is already despawned")]
    AlreadyDespawned(EntityHandle),
}

#[derive(Debug, Default)]
struct PrefabPool {
    spawned: BTreeSet<EntityHandle>,
    despawned: VecDeque<EntityHandle>,
    preloaded: bool,
}

#[derive(Debug)]
struct Slot<T> {
    generation: u32,
    prototype: PrototypeId,
    active: bool,
    placement: Placement,
    value: T,
}

/// Allocator that recycles instances per prototype.
#[derive(Debug)]
pub struct ObjectPool<T> {
    slots: Vec<Slot<T>>,
    pools: BTreeMap<PrototypeId, PrefabPool>,
}

impl<T> Default for ObjectPool<T> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            pools: BTreeMap::new(),
        }
    }
}

impl<T: Default> ObjectPool<T> {
    /// Creates an empty pool with no registered prototypes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a prototype and preloads the requested number of instances.
    ///
    /// A prototype registered twice keeps its first registration.
    pub fn register(&mut self, prototype: PrototypeId, preload: u32) {
        if self.pools.contains_key(&prototype) {
            warn!("prototype {prototype:?} registered more than once, keeping the first entry");
            return;
        }
        let _ = self.pools.insert(prototype, PrefabPool::default());
        self.preload(prototype, preload);
    }

    /// Allocates `count` despawned instances once per prototype.
    pub fn preload(&mut self, prototype: PrototypeId, count: u32) {
        let pool = self.pools.entry(prototype).or_default();
        if pool.preloaded {
            return;
        }
        pool.preloaded = true;

        for _ in 0..count {
            let Ok(index) = u32::try_from(self.slots.len()) else {
                warn!("pool slot space exhausted while preloading {prototype:?}");
                return;
            };
            self.slots.push(Slot {
                generation: 0,
                prototype,
                active: false,
                placement: Placement::default(),
                value: T::default(),
            });
            pool.despawned.push_back(EntityHandle::new(index, 0));
        }
    }

    /// Hands out the oldest despawned instance of the prototype, creating one
    /// when none is waiting.
    pub fn spawn(&mut self, prototype: PrototypeId, placement: Placement) -> EntityHandle {
        if !self.pools.contains_key(&prototype) {
            warn!("no pool registered for {prototype:?}, creating one on demand");
        }
        let pool = self.pools.entry(prototype).or_default();

        let handle = match pool.despawned.pop_front() {
            Some(stale) => {
                let slot = &mut self.slots[stale.index() as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.active = true;
                slot.placement = placement;
                EntityHandle::new(stale.index(), slot.generation)
            }
            None => {
                let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 0,
                    prototype,
                    active: true,
                    placement,
                    value: T::default(),
                });
                EntityHandle::new(index, 0)
            }
        };

        let _ = pool.spawned.insert(handle);
        trace!("spawned {handle:?} from {prototype:?}");
        handle
    }

    /// Returns a spawned instance to its pool, resetting its state.
    pub fn despawn(&mut self, handle: EntityHandle) -> Result<(), PoolError> {
        let Some(slot) = self
            .slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.generation == handle.generation())
        else {
            warn!("refusing to despawn untracked instance {handle:?}");
            return Err(PoolError::Untracked(handle));
        };

        if !slot.active {
            warn!("refusing to despawn {handle:?} twice");
            return Err(PoolError::AlreadyDespawned(handle));
        }

        let Some(pool) = self.pools.get_mut(&slot.prototype) else {
            warn!("instance {handle:?} belongs to no registered pool");
            return Err(PoolError::Untracked(handle));
        };
        if !pool.spawned.remove(&handle) {
            warn!("instance {handle:?} was not in its pool's spawned set");
            return Err(PoolError::Untracked(handle));
        }

        slot.active = false;
        slot.placement = Placement::default();
        slot.value = T::default();
        pool.despawned.push_back(handle);
        trace!("despawned {handle:?}");
        Ok(())
    }
}

impl<T> ObjectPool<T> {
    fn slot(&self, handle: EntityHandle) -> Option<&Slot<T>> {
        self.slots
            .get(handle.index() as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation())
    }

    fn slot_mut(&mut self, handle: EntityHandle) -> Option<&mut Slot<T>> {
        self.slots
            .get_mut(handle.index() as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation())
    }

    /// Reports whether the handle refers to a live instance.
    #[must_use]
    pub fn is_spawned(&self, handle: EntityHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Borrows a live instance.
    #[must_use]
    pub fn get(&self, handle: EntityHandle) -> Option<&T> {
        self.slot(handle).map(|slot| &slot.value)
    }

    /// Mutably borrows a live instance.
    pub fn get_mut(&mut self, handle: EntityHandle) -> Option<&mut T> {
        self.slot_mut(handle).map(|slot| &mut slot.value)
    }

    /// Transform the live instance was spawned with.
    #[must_use]
    pub fn placement(&self, handle: EntityHandle) -> Option<&Placement> {
        self.slot(handle).map(|slot| &slot.placement)
    }

    /// Prototype the live instance was spawned from.
    #[must_use]
    pub fn prototype_of(&self, handle: EntityHandle) -> Option<PrototypeId> {
        self.slot(handle).map(|slot| slot.prototype)
    }

    /// Iterates over live instances in handle order.
    pub fn iter_spawned(&self) -> impl Iterator<Item = (EntityHandle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active)
            .filter_map(|(index, slot)| {
                let index = u32::try_from(index).ok()?;
                Some((EntityHandle::new(index, slot.generation), &slot.value))
            })
    }

    /// Collects the handles of live instances in handle order.
    #[must_use]
    pub fn spawned_handles(&self) -> Vec<EntityHandle> {
        self.iter_spawned().map(|(handle, _)| handle).collect()
    }

    /// Number of live instances of the prototype.
    #[must_use]
    pub fn spawned_count(&self, prototype: PrototypeId) -> usize {
        self.pools
            .get(&prototype)
            .map_or(0, |pool| pool.spawned.len())
    }

    /// Number of instances of the prototype waiting for reuse.
    #[must_use]
    pub fn despawned_count(&self, prototype: PrototypeId) -> usize {
        self.pools
            .get(&prototype)
            .map_or(0, |pool| pool.despawned.len())
    }

    /// Total number of live instances across every prototype.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.pools.values().map(|pool| pool.spawned.len()).sum()
    }
}
