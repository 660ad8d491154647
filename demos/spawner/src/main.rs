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

// Warren spawner demo
// Drives the pool registry with an in-memory host: an authored spec list
// with all three creation triggers, a burst of acquires, identifier-less
// releases, and a stats printout.

use std::collections::HashMap;

use anyhow::Result;
use warren_core::{InstanceHost, InstanceId, PrototypeId};
use warren_pool::{CreationTrigger, PoolRegistry, PoolSpec};

/// A toy scene runtime: instances are entries in a map.
#[derive(Default)]
struct SceneHost {
    next_id: u64,
    instances: HashMap<InstanceId, bool>,
}

impl InstanceHost for SceneHost {
    fn manufacture(&mut self, prototype: &PrototypeId) -> InstanceId {
        self.next_id += 1;
        let instance = InstanceId(self.next_id);
        self.instances.insert(instance, false);
        log::debug!("host: manufactured {instance} from '{prototype}'");
        instance
    }

    fn destroy(&mut self, instance: InstanceId) {
        self.instances.remove(&instance);
        log::debug!("host: destroyed {instance}");
    }

    fn set_active(&mut self, instance: InstanceId, active: bool) {
        if let Some(flag) = self.instances.get_mut(&instance) {
            *flag = active;
        }
    }

    fn is_active(&self, instance: InstanceId) -> bool {
        self.instances.get(&instance).copied().unwrap_or(false)
    }
}

fn authored_specs() -> Vec<PoolSpec> {
    vec![
        PoolSpec {
            identifier: "coins".to_string(),
            prototype: "prefabs/coin".into(),
            capacity: 8,
            expandable: true,
            persistent: false,
            trigger: CreationTrigger::Immediate,
        },
        PoolSpec {
            identifier: "sparks".to_string(),
            prototype: "prefabs/spark".into(),
            capacity: 4,
            expandable: false,
            persistent: false,
            trigger: CreationTrigger::ContextLoaded("arena".to_string()),
        },
        PoolSpec {
            identifier: "boss".to_string(),
            prototype: "prefabs/boss".into(),
            capacity: 1,
            expandable: false,
            persistent: true,
            trigger: CreationTrigger::Custom,
        },
    ]
}

fn main() -> Result<()> {
    env_logger::init();

    let mut host = SceneHost::default();
    let mut registry = PoolRegistry::new();

    registry.load_specs(authored_specs(), &mut host);
    log::info!("after load: {} pool(s) live", registry.pool_count());

    // The arena becomes active; its deferred pools come up now.
    registry.context_loaded("arena", &mut host);

    // The boss pool waits for an explicit trigger.
    let _ = registry.create_deferred("boss", &mut host);

    // A burst larger than the coin pool's capacity forces growth.
    let coins = registry.get_multiple_instances("coins", 12, true, &mut host);
    log::info!("issued {} coins", coins.len());

    // Release without naming the pool; the registry routes each coin home.
    for coin in coins {
        registry.release_instance(coin, &mut host)?;
    }

    let mut stats = registry.stats();
    stats.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    for pool in &stats {
        println!(
            "{:<8} prototype={:<16} capacity={:<3} free={:<3} issued={}",
            pool.identifier, pool.prototype, pool.capacity, pool.free, pool.issued
        );
    }

    registry.remove_pool("sparks", &mut host);
    log::info!("after teardown: {} pool(s) live", registry.pool_count());

    Ok(())
}
