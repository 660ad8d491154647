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

//! # Warren Pool
//!
//! Keyed pools of reusable, expensive-to-create host instances.
//!
//! A [`PoolRegistry`] owns every [`ResourcePool`] and is the single
//! writer for all pool state. Callers acquire instances by pool
//! identifier and can release them without remembering which pool they
//! came from; the registry tracks issued instances through the
//! [`PoolEvent`] channel. Pool construction can be immediate, bound to
//! a named host context becoming active, or deferred until an explicit
//! caller trigger (see [`CreationTrigger`]).

#![warn(missing_docs)]

pub mod config;
pub mod event;
pub mod handle;
pub mod pool;
pub mod registry;

#[cfg(test)]
pub(crate) mod testing;

pub use config::{load_spec_file, CreationTrigger, PoolSpec};
pub use event::PoolEvent;
pub use handle::ResourceHandle;
pub use pool::{PoolStats, ResourcePool, DEFAULT_CAPACITY};
pub use registry::PoolRegistry;
