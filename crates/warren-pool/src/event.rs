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

//! Lifecycle notifications emitted by pools.
//!
//! Pools publish these onto the registry's event channel as a side
//! effect of their operations; the registry drains the channel after
//! every mutating call and keeps its reverse maps in sync. Each
//! acquire fires exactly one [`PoolEvent::Obtained`] and each effective
//! release exactly one [`PoolEvent::Released`], in FIFO order.

use std::sync::Arc;
use warren_core::InstanceId;

/// A pool lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolEvent {
    /// A pool began allocating. Emitted before any of its contents
    /// exist, so listeners must not assume the pool is populated yet.
    PoolCreated {
        /// The identifier of the new pool.
        identifier: Arc<str>,
    },
    /// A pool manufactured a fresh instance.
    InstanceCreated {
        /// The owning pool.
        identifier: Arc<str>,
        /// The freshly manufactured instance.
        instance: InstanceId,
    },
    /// An instance was issued to a caller.
    Obtained {
        /// The issuing pool.
        identifier: Arc<str>,
        /// The issued instance.
        instance: InstanceId,
    },
    /// An instance went back into its pool's free queue.
    Released {
        /// The owning pool.
        identifier: Arc<str>,
        /// The released instance.
        instance: InstanceId,
    },
    /// An instance is going away, either because its pool is tearing
    /// down or because the host destroyed it externally.
    InstanceWillBeDestroyed {
        /// The pool that tracked the instance.
        identifier: Arc<str>,
        /// The doomed instance.
        instance: InstanceId,
    },
    /// A pool is tearing down; its identifier mapping should be dropped.
    PoolWillBeDestroyed {
        /// The identifier of the dying pool.
        identifier: Arc<str>,
    },
}
