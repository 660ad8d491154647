// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! A single keyed pool of reusable host instances.

use crate::event::PoolEvent;
use crate::handle::ResourceHandle;
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use warren_core::{InstanceHost, InstanceId, PoolError, PrototypeId};

/// Capacity a pool falls back to when created with zero capacity.
pub const DEFAULT_CAPACITY: usize = 10;

/// A pool of instances manufactured from one prototype.
///
/// Pools are owned and driven exclusively by the
/// [`PoolRegistry`](crate::PoolRegistry); only read-only queries are
/// public. Every mutation publishes [`PoolEvent`]s so the registry can
/// keep its issued-instance bookkeeping in sync.
///
/// Invariant: `issued_count() + free_count() == capacity()` whenever no
/// external destruction is pending compensation; an externally
/// destroyed instance counts as issued until the next acquire backfills
/// it.
#[derive(Debug)]
pub struct ResourcePool {
    identifier: Arc<str>,
    prototype: PrototypeId,
    capacity: usize,
    expandable: bool,
    persistent: bool,
    free: VecDeque<InstanceId>,
    tracked: HashMap<InstanceId, ResourceHandle>,
    /// Instances the host destroyed behind our back since the last
    /// acquire; each one is replaced by a fresh manufacture.
    lost_since_acquire: usize,
    removed: bool,
    events: flume::Sender<PoolEvent>,
}

/// A read-only snapshot of one pool, for inspection tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// The pool identifier.
    pub identifier: String,
    /// The prototype the pool manufactures from.
    pub prototype: String,
    /// The current capacity ceiling.
    pub capacity: usize,
    /// Instances sitting in the free queue.
    pub free: usize,
    /// Instances currently checked out.
    pub issued: usize,
    /// Whether the pool doubles its capacity when exhausted.
    pub expandable: bool,
    /// Whether the pool outlives host context changes.
    pub persistent: bool,
}

impl ResourcePool {
    /// Builds the pool and pre-manufactures `capacity` instances.
    ///
    /// The `PoolCreated` event fires before manufacturing starts, so the
    /// pool is visible to listeners before its contents exist. A
    /// non-positive capacity is normalized to [`DEFAULT_CAPACITY`].
    pub(crate) fn create(
        identifier: Arc<str>,
        prototype: PrototypeId,
        capacity: usize,
        expandable: bool,
        persistent: bool,
        events: flume::Sender<PoolEvent>,
        host: &mut dyn InstanceHost,
    ) -> Self {
        let capacity = if capacity == 0 {
            DEFAULT_CAPACITY
        } else {
            capacity
        };

        let mut pool = Self {
            identifier,
            prototype,
            capacity,
            expandable,
            persistent,
            free: VecDeque::with_capacity(capacity),
            tracked: HashMap::with_capacity(capacity),
            lost_since_acquire: 0,
            removed: false,
            events,
        };

        pool.emit(PoolEvent::PoolCreated {
            identifier: pool.identifier.clone(),
        });

        for _ in 0..capacity {
            pool.manufacture_one(host);
        }

        pool
    }

    /// Checks an instance out of the pool.
    ///
    /// Stale free-queue entries left behind by external destructions are
    /// purged first and every destruction observed since the last
    /// acquire is compensated with a fresh manufacture, so capacity is
    /// preserved. If the queue is still empty and the pool is
    /// expandable, the capacity doubles before the dequeue. Returns
    /// `None` only when the pool is exhausted and not expandable.
    pub(crate) fn acquire(
        &mut self,
        activate: bool,
        host: &mut dyn InstanceHost,
    ) -> Option<InstanceId> {
        self.free.retain(|id| self.tracked.contains_key(id));

        for _ in 0..self.lost_since_acquire {
            self.manufacture_one(host);
        }
        self.lost_since_acquire = 0;

        if self.free.is_empty() && self.expandable {
            let batch = self.capacity;
            for _ in 0..batch {
                self.manufacture_one(host);
            }
            self.capacity *= 2;
            log::info!(
                "Pool '{}' exhausted; capacity grew to {}.",
                self.identifier,
                self.capacity
            );
        }

        let instance = self.free.pop_front()?;
        let Some(handle) = self.tracked.get_mut(&instance) else {
            // The retain above keeps the queue consistent with the map.
            unreachable!("pool '{}' dequeued an untracked instance", self.identifier);
        };
        handle.set_pooled(false);
        host.set_active(instance, activate);

        self.emit(PoolEvent::Obtained {
            identifier: self.identifier.clone(),
            instance,
        });
        Some(instance)
    }

    /// Checks up to `amount` instances out at once.
    ///
    /// A non-expandable pool never grows for a batch request: the amount
    /// is clamped to the current free count instead. An expandable pool
    /// may grow one doubling at a time while the batch drains it.
    pub(crate) fn acquire_multiple(
        &mut self,
        amount: usize,
        activate: bool,
        host: &mut dyn InstanceHost,
    ) -> Vec<InstanceId> {
        let amount = if self.expandable {
            amount
        } else {
            amount.min(self.free.len())
        };

        let mut issued = Vec::with_capacity(amount);
        for _ in 0..amount {
            match self.acquire(activate, host) {
                Some(instance) => issued.push(instance),
                None => break,
            }
        }
        issued
    }

    /// Returns an instance to the free queue.
    ///
    /// Releasing an instance that is already pooled is a silent no-op,
    /// so double releases are safe. An instance this pool never
    /// manufactured yields [`PoolError::NotTracked`]; the registry turns
    /// that into forwarding or a caller-visible error depending on who
    /// actually owns the instance.
    pub(crate) fn release(
        &mut self,
        instance: InstanceId,
        host: &mut dyn InstanceHost,
    ) -> Result<(), PoolError> {
        let Some(handle) = self.tracked.get_mut(&instance) else {
            return Err(PoolError::NotTracked { instance });
        };

        if handle.is_pooled() {
            return Ok(());
        }

        handle.set_pooled(true);
        if host.is_active(instance) {
            host.set_active(instance, false);
        }
        self.free.push_back(instance);

        self.emit(PoolEvent::Released {
            identifier: self.identifier.clone(),
            instance,
        });
        Ok(())
    }

    /// Tears the pool down, destroying every currently-free instance.
    ///
    /// Issued instances are not forcibly destroyed; they surface again
    /// when a caller releases them, at which point the registry reports
    /// the pool as gone. Calling this more than once is a no-op.
    pub(crate) fn remove(&mut self, host: &mut dyn InstanceHost) {
        if self.removed {
            return;
        }
        self.removed = true;

        while let Some(instance) = self.free.pop_front() {
            // Stale ids from external destructions have nothing left to destroy.
            if self.tracked.remove(&instance).is_none() {
                continue;
            }
            self.emit(PoolEvent::InstanceWillBeDestroyed {
                identifier: self.identifier.clone(),
                instance,
            });
            host.destroy(instance);
        }

        self.emit(PoolEvent::PoolWillBeDestroyed {
            identifier: self.identifier.clone(),
        });
        log::info!("Pool '{}' removed.", self.identifier);
    }

    /// Records that the host destroyed a tracked instance outside the
    /// pool's control.
    ///
    /// Pooled instances are supposed to be released, never destroyed, so
    /// this is a logged anomaly rather than an error. The instance is
    /// untracked and the next [`acquire`](Self::acquire) manufactures a
    /// replacement to preserve capacity.
    pub(crate) fn notify_destroyed(&mut self, instance: InstanceId) {
        if self.removed || self.tracked.remove(&instance).is_none() {
            return;
        }
        self.lost_since_acquire += 1;
        self.emit(PoolEvent::InstanceWillBeDestroyed {
            identifier: self.identifier.clone(),
            instance,
        });
        log::warn!(
            "Pool '{}': {instance} was destroyed externally. Pooled instances should be \
             released, not destroyed.",
            self.identifier
        );
    }

    fn manufacture_one(&mut self, host: &mut dyn InstanceHost) {
        let instance = host.manufacture(&self.prototype);
        self.tracked
            .insert(instance, ResourceHandle::new(instance, self.identifier.clone()));
        self.emit(PoolEvent::InstanceCreated {
            identifier: self.identifier.clone(),
            instance,
        });

        // Fresh instances go through the regular release path so they
        // start deactivated and enqueued like any returned instance.
        if self.release(instance, host).is_err() {
            unreachable!(
                "pool '{}' failed to enqueue a freshly tracked instance",
                self.identifier
            );
        }
    }

    fn emit(&self, event: PoolEvent) {
        if self.events.send(event).is_err() {
            log::error!(
                "Pool '{}': event receiver disconnected; registry bookkeeping will drift.",
                self.identifier
            );
        }
    }

    /// The pool identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// The prototype this pool manufactures from.
    #[must_use]
    pub fn prototype(&self) -> &PrototypeId {
        &self.prototype
    }

    /// The current capacity ceiling.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether the pool doubles its capacity when exhausted.
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.expandable
    }

    /// Whether the pool outlives host context changes.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Number of instances sitting in the free queue.
    #[must_use]
    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Number of instances currently checked out. An externally
    /// destroyed instance keeps counting as issued until the next
    /// acquire backfills it.
    #[must_use]
    pub fn issued_count(&self) -> usize {
        self.capacity.saturating_sub(self.free.len())
    }

    /// `true` if the free queue is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// `true` once the pool has been torn down.
    #[must_use]
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Returns a handle's bookkeeping record, if this pool tracks the
    /// instance.
    #[must_use]
    pub fn handle(&self, instance: InstanceId) -> Option<&ResourceHandle> {
        self.tracked.get(&instance)
    }

    /// Snapshots the pool for diagnostics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            identifier: self.identifier.to_string(),
            prototype: self.prototype.to_string(),
            capacity: self.capacity,
            free: self.free_count(),
            issued: self.issued_count(),
            expandable: self.expandable,
            persistent: self.persistent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeHost;
    use warren_core::EventBus;

    fn make_pool(
        capacity: usize,
        expandable: bool,
        host: &mut FakeHost,
    ) -> (ResourcePool, EventBus<PoolEvent>) {
        let bus = EventBus::new();
        let pool = ResourcePool::create(
            Arc::from("coins"),
            PrototypeId::from("prefabs/coin"),
            capacity,
            expandable,
            false,
            bus.sender(),
            host,
        );
        (pool, bus)
    }

    #[test]
    fn test_create_prefills_free_queue() {
        let mut host = FakeHost::new();
        let (pool, _bus) = make_pool(3, false, &mut host);

        assert_eq!(pool.capacity(), 3);
        assert_eq!(pool.free_count(), 3);
        assert_eq!(pool.issued_count(), 0);
        assert_eq!(host.alive_count(), 3);
    }

    #[test]
    fn test_zero_capacity_normalizes_to_default() {
        let mut host = FakeHost::new();
        let (pool, _bus) = make_pool(0, false, &mut host);
        assert_eq!(pool.capacity(), DEFAULT_CAPACITY);
        assert_eq!(pool.free_count(), DEFAULT_CAPACITY);
    }

    #[test]
    fn test_pool_created_fires_before_manufacturing() {
        let mut host = FakeHost::new();
        let (_pool, bus) = make_pool(1, false, &mut host);

        let events: Vec<_> = bus.drain().collect();
        assert!(matches!(events[0], PoolEvent::PoolCreated { .. }));
        assert!(matches!(events[1], PoolEvent::InstanceCreated { .. }));
    }

    #[test]
    fn test_acquire_release_round_trip() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(2, false, &mut host);

        let instance = pool.acquire(true, &mut host).expect("pool has capacity");
        assert!(host.is_active(instance));
        assert_eq!(pool.free_count(), 1);
        assert_eq!(pool.issued_count(), 1);

        pool.release(instance, &mut host).expect("own instance");
        assert!(!host.is_active(instance));
        assert_eq!(pool.free_count(), 2);

        // A second release before re-acquiring must not duplicate the
        // instance in the free queue.
        pool.release(instance, &mut host).expect("double release");
        assert_eq!(pool.free_count(), 2);
    }

    #[test]
    fn test_exhausted_fixed_pool_returns_none() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(2, false, &mut host);

        assert!(pool.acquire(false, &mut host).is_some());
        assert!(pool.acquire(false, &mut host).is_some());
        assert!(pool.acquire(false, &mut host).is_none());
        assert_eq!(pool.capacity(), 2);
    }

    #[test]
    fn test_expandable_pool_doubles_capacity() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(10, true, &mut host);

        for _ in 0..10 {
            assert!(pool.acquire(false, &mut host).is_some());
        }
        assert!(pool.is_empty());

        // The 11th acquire grows the pool instead of failing.
        assert!(pool.acquire(false, &mut host).is_some());
        assert_eq!(pool.capacity(), 20);
        assert_eq!(pool.issued_count() + pool.free_count(), pool.capacity());
    }

    #[test]
    fn test_acquire_multiple_clamps_without_growth() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(5, false, &mut host);

        let batch = pool.acquire_multiple(8, false, &mut host);
        assert_eq!(batch.len(), 5);
        assert_eq!(pool.capacity(), 5);
        assert!(pool.is_empty());
    }

    #[test]
    fn test_acquire_multiple_grows_expandable_pool() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(2, true, &mut host);

        let batch = pool.acquire_multiple(5, false, &mut host);
        assert_eq!(batch.len(), 5);
        assert_eq!(pool.capacity(), 8); // 2 -> 4 -> 8 while draining
        assert_eq!(pool.issued_count() + pool.free_count(), pool.capacity());
    }

    #[test]
    fn test_external_destruction_is_backfilled() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(5, false, &mut host);

        // The host destroys a free instance behind the pool's back.
        let doomed = InstanceId(1);
        host.destroy(doomed);
        pool.notify_destroyed(doomed);
        assert_eq!(host.alive_count(), 4);

        let issued = pool.acquire(false, &mut host).expect("backfill preserves capacity");
        assert_ne!(issued, doomed);
        assert_eq!(pool.capacity(), 5);
        assert_eq!(pool.free_count(), 4);
        assert_eq!(pool.issued_count(), 1);
        assert_eq!(host.alive_count(), 5);
    }

    #[test]
    fn test_release_of_foreign_instance_errors() {
        let mut host = FakeHost::new();
        let (mut pool, _bus) = make_pool(1, false, &mut host);

        let result = pool.release(InstanceId(999), &mut host);
        assert_eq!(
            result,
            Err(PoolError::NotTracked {
                instance: InstanceId(999)
            })
        );
    }

    #[test]
    fn test_remove_destroys_free_but_not_issued() {
        let mut host = FakeHost::new();
        let (mut pool, bus) = make_pool(3, false, &mut host);
        let kept = pool.acquire(false, &mut host).expect("pool has capacity");
        let _ = bus.drain().count();

        pool.remove(&mut host);
        assert!(pool.is_removed());
        assert_eq!(host.alive_count(), 1);
        assert_eq!(host.destroyed().len(), 2);
        assert!(host.is_alive(kept));

        // Idempotent: a second remove destroys nothing further and emits
        // no second teardown event.
        pool.remove(&mut host);
        assert_eq!(host.alive_count(), 1);
        let teardowns = bus
            .drain()
            .filter(|event| matches!(event, PoolEvent::PoolWillBeDestroyed { .. }))
            .count();
        assert_eq!(teardowns, 1);
    }
}
