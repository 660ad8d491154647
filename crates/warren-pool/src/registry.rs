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

//! The registry that owns every pool and routes instances back to them.

use crate::config::{CreationTrigger, PoolSpec};
use crate::event::PoolEvent;
use crate::pool::{PoolStats, ResourcePool};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use warren_core::{EventBus, InstanceHost, InstanceId, PoolError, PrototypeId};

/// Owner of the identifier→pool mapping and single writer for all pool
/// state.
///
/// The registry also tracks which pool every outstanding instance was
/// issued by, so callers can release an instance without remembering
/// where it came from. That reverse map is maintained exclusively by
/// draining the pool event channel after every mutating call, which
/// keeps `Obtained`/`Released` processing in emission order.
///
/// There is deliberately no global singleton: construct a registry and
/// hand it to whatever owns the application's resource lifecycle.
#[derive(Debug, Default)]
pub struct PoolRegistry {
    pools: HashMap<Arc<str>, ResourcePool>,
    /// Exactly the currently-issued instances, keyed to their pool.
    issued: HashMap<InstanceId, Arc<str>>,
    /// Every live pooled instance, keyed to the pool that manufactured
    /// it. Used to recover misrouted releases and to diagnose releases
    /// whose owning pool is gone.
    owners: HashMap<InstanceId, Arc<str>>,
    context_specs: HashMap<String, Vec<PoolSpec>>,
    custom_specs: HashMap<String, PoolSpec>,
    pooled_prototypes: HashSet<PrototypeId>,
    bus: EventBus<PoolEvent>,
}

impl PoolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new pool and registers it under `identifier`.
    ///
    /// Fails only on an empty prototype. If a pool already exists under
    /// the identifier it is returned unchanged with a warning; nothing
    /// is re-allocated. Pooling a prototype that another pool already
    /// manufactures is legal but logged as suspicious.
    pub fn create_pool(
        &mut self,
        identifier: &str,
        prototype: PrototypeId,
        capacity: usize,
        expandable: bool,
        persistent: bool,
        host: &mut dyn InstanceHost,
    ) -> Result<&ResourcePool, PoolError> {
        if prototype.is_empty() {
            return Err(PoolError::EmptyPrototype {
                identifier: identifier.to_string(),
            });
        }

        if self.pools.contains_key(identifier) {
            log::warn!("Pool identified by '{identifier}' already exists.");
            return Ok(&self.pools[identifier]);
        }

        if !self.pooled_prototypes.insert(prototype.clone()) {
            for (other, pool) in &self.pools {
                if pool.prototype() == &prototype {
                    log::warn!(
                        "Prototype '{prototype}' is already pooled by '{other}'. Make sure \
                         pooling the same prototype in different pools is intended."
                    );
                }
            }
        }

        let key: Arc<str> = Arc::from(identifier);
        let pool = ResourcePool::create(
            key.clone(),
            prototype,
            capacity,
            expandable,
            persistent,
            self.bus.sender(),
            host,
        );
        self.pools.insert(key, pool);
        self.pump_events();

        Ok(&self.pools[identifier])
    }

    /// Creates a pool whose specification was registered with
    /// [`CreationTrigger::Custom`]. Returns `None` with a warning if no
    /// such specification exists.
    pub fn create_deferred(
        &mut self,
        identifier: &str,
        host: &mut dyn InstanceHost,
    ) -> Option<&ResourcePool> {
        let Some(spec) = self.custom_specs.get(identifier).cloned() else {
            log::warn!("No pool is registered under the identifier '{identifier}'.");
            return None;
        };

        match self.create_pool(
            &spec.identifier,
            spec.prototype,
            spec.capacity,
            spec.expandable,
            spec.persistent,
            host,
        ) {
            Ok(pool) => Some(pool),
            Err(err) => {
                log::error!("Deferred creation of pool '{identifier}' failed: {err}");
                None
            }
        }
    }

    /// Registers an ordered list of authored pool specifications.
    ///
    /// `Immediate` entries create their pool on the spot. `ContextLoaded`
    /// and `Custom` entries are stored in their trigger tables; a
    /// duplicate identifier within a trigger group is warned about and
    /// the later entry ignored.
    pub fn load_specs(&mut self, specs: Vec<PoolSpec>, host: &mut dyn InstanceHost) {
        for spec in specs {
            match spec.trigger.clone() {
                CreationTrigger::Immediate => {
                    if let Err(err) = self.create_pool(
                        &spec.identifier,
                        spec.prototype,
                        spec.capacity,
                        spec.expandable,
                        spec.persistent,
                        host,
                    ) {
                        log::error!("Immediate pool '{}' not created: {err}", spec.identifier);
                    }
                }
                CreationTrigger::ContextLoaded(context) => {
                    let entries = self.context_specs.entry(context).or_default();
                    if entries.iter().any(|entry| entry.identifier == spec.identifier) {
                        log::warn!(
                            "A pool identified by '{}' is already registered.",
                            spec.identifier
                        );
                    } else {
                        entries.push(spec);
                    }
                }
                CreationTrigger::Custom => {
                    if self.custom_specs.contains_key(&spec.identifier) {
                        log::warn!(
                            "A pool identified by '{}' is already registered.",
                            spec.identifier
                        );
                    } else {
                        self.custom_specs.insert(spec.identifier.clone(), spec);
                    }
                }
            }
        }
    }

    /// Creates every pool registered for the named host context that
    /// does not already exist. Called by the host-integration layer when
    /// the context (a scene, screen, level) becomes active.
    pub fn context_loaded(&mut self, context: &str, host: &mut dyn InstanceHost) {
        let Some(specs) = self.context_specs.get(context) else {
            return;
        };
        let pending: Vec<PoolSpec> = specs
            .iter()
            .filter(|spec| !self.pools.contains_key(spec.identifier.as_str()))
            .cloned()
            .collect();

        for spec in pending {
            if let Err(err) = self.create_pool(
                &spec.identifier,
                spec.prototype,
                spec.capacity,
                spec.expandable,
                spec.persistent,
                host,
            ) {
                log::error!(
                    "Context-triggered pool '{}' not created: {err}",
                    spec.identifier
                );
            }
        }
    }

    /// Looks a pool up by identifier, warning when it does not exist.
    #[must_use]
    pub fn get_pool(&self, identifier: &str) -> Option<&ResourcePool> {
        let pool = self.pools.get(identifier);
        if pool.is_none() {
            log::warn!("Pool identified by '{identifier}' doesn't exist.");
        }
        pool
    }

    /// Looks a pool up by identifier without logging.
    #[must_use]
    pub fn try_get_pool(&self, identifier: &str) -> Option<&ResourcePool> {
        self.pools.get(identifier)
    }

    /// Resolves the pool that manufactured `instance`, if it still
    /// exists.
    #[must_use]
    pub fn pool_of(&self, instance: InstanceId) -> Option<&ResourcePool> {
        self.owners
            .get(&instance)
            .and_then(|identifier| self.pools.get(identifier.as_ref()))
    }

    /// Acquires an instance from the identified pool, warning when the
    /// identifier is unknown. `None` also covers an exhausted,
    /// non-expandable pool.
    pub fn get_instance(
        &mut self,
        identifier: &str,
        activate: bool,
        host: &mut dyn InstanceHost,
    ) -> Option<InstanceId> {
        let Some(pool) = self.pools.get_mut(identifier) else {
            log::warn!("Pool identified by '{identifier}' doesn't exist.");
            return None;
        };
        let instance = pool.acquire(activate, host);
        self.pump_events();
        instance
    }

    /// Like [`get_instance`](Self::get_instance) but silent on an
    /// unknown identifier.
    pub fn try_get_instance(
        &mut self,
        identifier: &str,
        activate: bool,
        host: &mut dyn InstanceHost,
    ) -> Option<InstanceId> {
        let instance = self.pools.get_mut(identifier)?.acquire(activate, host);
        self.pump_events();
        instance
    }

    /// Acquires up to `amount` instances from the identified pool.
    /// Unknown identifiers warn and yield an empty batch.
    pub fn get_multiple_instances(
        &mut self,
        identifier: &str,
        amount: usize,
        activate: bool,
        host: &mut dyn InstanceHost,
    ) -> Vec<InstanceId> {
        let Some(pool) = self.pools.get_mut(identifier) else {
            log::warn!("Pool identified by '{identifier}' doesn't exist.");
            return Vec::new();
        };
        let batch = pool.acquire_multiple(amount, activate, host);
        self.pump_events();
        batch
    }

    /// Returns an instance to its pool without the caller naming it.
    ///
    /// Routing goes through the issued-instance reverse map. An instance
    /// the registry never issued is tolerated with a warning, since the
    /// identifier-qualified release path bypasses this map. If the
    /// owning pool has been removed the instance is dropped from the
    /// books and [`PoolError::PoolGone`] is returned.
    pub fn release_instance(
        &mut self,
        instance: InstanceId,
        host: &mut dyn InstanceHost,
    ) -> Result<(), PoolError> {
        let Some(identifier) = self.issued.get(&instance).cloned() else {
            log::warn!("{instance} is not a pooled instance.");
            return Ok(());
        };

        let result = match self.pools.get_mut(identifier.as_ref()) {
            Some(pool) => pool.release(instance, host),
            None => {
                log::error!("{instance} belongs to pool '{identifier}', which no longer exists.");
                self.issued.remove(&instance);
                self.owners.remove(&instance);
                Err(PoolError::PoolGone {
                    instance,
                    identifier: identifier.to_string(),
                })
            }
        };
        self.pump_events();
        result
    }

    /// Returns an instance through a caller-named pool.
    ///
    /// Prefer [`release_instance`](Self::release_instance); this path
    /// exists for callers that still qualify releases by identifier. A
    /// release routed at the wrong pool is forwarded to the true owner
    /// with a logged correction.
    pub fn release_instance_to(
        &mut self,
        identifier: &str,
        instance: InstanceId,
        host: &mut dyn InstanceHost,
    ) -> Result<(), PoolError> {
        let released = match self.pools.get_mut(identifier) {
            Some(pool) => pool.release(instance, host),
            None => {
                log::warn!("Pool identified by '{identifier}' doesn't exist.");
                return Ok(());
            }
        };

        let result = match released {
            Err(PoolError::NotTracked { .. }) => self.forward_release(identifier, instance, host),
            other => other,
        };
        self.pump_events();
        result
    }

    /// Tears down the identified pool; warns if it does not exist.
    pub fn remove_pool(&mut self, identifier: &str, host: &mut dyn InstanceHost) {
        match self.pools.get_mut(identifier) {
            Some(pool) => {
                pool.remove(host);
                self.pump_events();
            }
            None => log::warn!("Pool identified by '{identifier}' doesn't exist."),
        }
    }

    /// Notifies the owning pool that the host destroyed an instance
    /// outside pool control, so capacity can be backfilled.
    pub fn instance_destroyed(&mut self, instance: InstanceId) {
        let Some(identifier) = self.owners.get(&instance).cloned() else {
            return;
        };
        if let Some(pool) = self.pools.get_mut(identifier.as_ref()) {
            pool.notify_destroyed(instance);
        }
        self.pump_events();
    }

    /// Number of live pools.
    #[must_use]
    pub fn pool_count(&self) -> usize {
        self.pools.len()
    }

    /// Snapshots every live pool for diagnostics.
    #[must_use]
    pub fn stats(&self) -> Vec<PoolStats> {
        self.pools.values().map(ResourcePool::stats).collect()
    }

    /// Routes a release that the asked pool rejected to the instance's
    /// true owner.
    fn forward_release(
        &mut self,
        asked: &str,
        instance: InstanceId,
        host: &mut dyn InstanceHost,
    ) -> Result<(), PoolError> {
        let Some(owner) = self.owners.get(&instance).cloned() else {
            log::error!("{instance} is not a pooled instance.");
            return Err(PoolError::NotPooled { instance });
        };

        let Some(pool) = self.pools.get_mut(owner.as_ref()) else {
            log::error!("{instance} belongs to pool '{owner}', which no longer exists.");
            self.issued.remove(&instance);
            self.owners.remove(&instance);
            return Err(PoolError::PoolGone {
                instance,
                identifier: owner.to_string(),
            });
        };

        log::warn!(
            "{instance} doesn't belong to pool '{asked}'. It is automatically returned to \
             '{owner}'."
        );
        pool.release(instance, host)
    }

    /// Applies every pending pool event in emission order.
    fn pump_events(&mut self) {
        let events: Vec<PoolEvent> = self.bus.drain().collect();
        for event in events {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: PoolEvent) {
        match event {
            PoolEvent::PoolCreated { identifier } => {
                log::info!("Pool '{identifier}' created.");
            }
            PoolEvent::InstanceCreated {
                identifier,
                instance,
            } => {
                self.owners.insert(instance, identifier);
            }
            PoolEvent::Obtained {
                identifier,
                instance,
            } => {
                if let Some(previous) = self.issued.insert(instance, identifier) {
                    // Two Obtained events without an intervening Released
                    // mean a pool handed the same instance out twice.
                    // That is an engine defect, not a user error.
                    panic!(
                        "{instance} was issued twice without a release; \
                         previously issued by pool '{previous}'"
                    );
                }
            }
            PoolEvent::Released { instance, .. } => {
                self.issued.remove(&instance);
            }
            PoolEvent::InstanceWillBeDestroyed { instance, .. } => {
                self.owners.remove(&instance);
                self.issued.remove(&instance);
            }
            PoolEvent::PoolWillBeDestroyed { identifier } => {
                self.pools.remove(identifier.as_ref());
                log::info!("Pool '{identifier}' dropped from the registry.");
            }
        }
    }
}
