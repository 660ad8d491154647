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

//! In-memory host fakes shared by the unit tests.

use std::collections::HashMap;
use warren_core::{InstanceHost, InstanceId, PrototypeId};

/// A host runtime that keeps instances in a map. Ids are issued
/// monotonically starting at 1.
pub(crate) struct FakeHost {
    next_id: u64,
    alive: HashMap<InstanceId, (PrototypeId, bool)>,
    destroyed: Vec<InstanceId>,
}

impl FakeHost {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 0,
            alive: HashMap::new(),
            destroyed: Vec::new(),
        }
    }

    pub(crate) fn alive_count(&self) -> usize {
        self.alive.len()
    }

    pub(crate) fn is_alive(&self, instance: InstanceId) -> bool {
        self.alive.contains_key(&instance)
    }

    pub(crate) fn destroyed(&self) -> &[InstanceId] {
        &self.destroyed
    }
}

impl InstanceHost for FakeHost {
    fn manufacture(&mut self, prototype: &PrototypeId) -> InstanceId {
        self.next_id += 1;
        let instance = InstanceId(self.next_id);
        self.alive.insert(instance, (prototype.clone(), false));
        instance
    }

    fn destroy(&mut self, instance: InstanceId) {
        self.alive.remove(&instance);
        self.destroyed.push(instance);
    }

    fn set_active(&mut self, instance: InstanceId, active: bool) {
        if let Some((_, flag)) = self.alive.get_mut(&instance) {
            *flag = active;
        }
    }

    fn is_active(&self, instance: InstanceId) -> bool {
        self.alive
            .get(&instance)
            .is_some_and(|(_, active)| *active)
    }
}

/// A misbehaving host that hands out the same identity for every
/// manufacture, used to provoke the double-issue protocol violation.
pub(crate) struct CollidingHost(pub(crate) FakeHost);

impl InstanceHost for CollidingHost {
    fn manufacture(&mut self, prototype: &PrototypeId) -> InstanceId {
        let _ = self.0.manufacture(prototype);
        InstanceId(1)
    }

    fn destroy(&mut self, instance: InstanceId) {
        self.0.destroy(instance);
    }

    fn set_active(&mut self, instance: InstanceId, active: bool) {
        self.0.set_active(instance, active);
    }

    fn is_active(&self, instance: InstanceId) -> bool {
        self.0.is_active(instance)
    }
}
