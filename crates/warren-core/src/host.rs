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

//! Contract between the pooling engine and the host runtime that owns
//! the actual resource instances.

use crate::instance::{InstanceId, PrototypeId};

/// The host-runtime collaborator that owns instance lifecycles.
///
/// The pooling engine never creates, destroys, or activates anything
/// itself; it asks the host through this trait and records the
/// identities the host hands back. The host in turn is expected to
/// notify the engine when it destroys a pooled instance outside the
/// engine's control (see `ResourcePool::notify_destroyed` in
/// `warren-pool`).
pub trait InstanceHost {
    /// Manufactures a fresh instance from `prototype` and returns its
    /// identity. Instances start out deactivated from the engine's point
    /// of view; the pool deactivates them explicitly on first release.
    fn manufacture(&mut self, prototype: &PrototypeId) -> InstanceId;

    /// Destroys an instance the engine is done with.
    fn destroy(&mut self, instance: InstanceId);

    /// Activates or deactivates an instance in the host scene.
    fn set_active(&mut self, instance: InstanceId, active: bool);

    /// Reports whether an instance is currently active.
    fn is_active(&self, instance: InstanceId) -> bool;
}
