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

//! Per-instance bookkeeping records.

use std::sync::Arc;
use warren_core::InstanceId;

/// The bookkeeping record a pool keeps for one manufactured instance.
///
/// The pool owns the handle for as long as it tracks the instance. The
/// back-reference to the pool is a non-owning identifier resolved
/// through the registry, never a live pointer, so handles can never
/// keep a dead pool alive.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    instance: InstanceId,
    pool: Arc<str>,
    in_pool: bool,
}

impl ResourceHandle {
    /// Instances start out checked out; the manufacturing path releases
    /// them into the free queue immediately afterwards.
    pub(crate) fn new(instance: InstanceId, pool: Arc<str>) -> Self {
        Self {
            instance,
            pool,
            in_pool: false,
        }
    }

    /// The identity of the underlying host instance.
    #[must_use]
    pub fn instance(&self) -> InstanceId {
        self.instance
    }

    /// The identifier of the pool that manufactured this instance.
    #[must_use]
    pub fn pool_identifier(&self) -> &str {
        &self.pool
    }

    /// `true` while the instance sits in its pool's free queue.
    #[must_use]
    pub fn is_pooled(&self) -> bool {
        self.in_pool
    }

    pub(crate) fn set_pooled(&mut self, pooled: bool) {
        self.in_pool = pooled;
    }
}
