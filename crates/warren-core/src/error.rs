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

//! Defines the error types for the pooling engine.

use crate::instance::InstanceId;
use std::fmt;

/// An error raised by pool or registry operations.
///
/// Not-found conditions (unknown identifiers, releases of instances the
/// registry never tracked) are absorbed with a log diagnostic and a safe
/// default instead of surfacing here; this enum covers the cases that
/// are genuine failures of the call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// A pool cannot be created from an empty prototype key.
    EmptyPrototype {
        /// The identifier the pool would have been registered under.
        identifier: String,
    },
    /// The instance is not tracked by the pool that was asked to release
    /// it. The registry recovers from this by routing the release to the
    /// true owner when one exists.
    NotTracked {
        /// The instance that was offered for release.
        instance: InstanceId,
    },
    /// The instance is not tracked by any pool, live or removed.
    NotPooled {
        /// The instance that was offered for release.
        instance: InstanceId,
    },
    /// The instance's recorded owning pool has been removed.
    PoolGone {
        /// The orphaned instance.
        instance: InstanceId,
        /// The identifier of the pool that no longer exists.
        identifier: String,
    },
    /// An authored pool specification list could not be read or parsed.
    Config {
        /// What went wrong while loading the specification.
        details: String,
    },
}

impl fmt::Display for PoolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PoolError::EmptyPrototype { identifier } => {
                write!(f, "Cannot create pool '{identifier}' from an empty prototype")
            }
            PoolError::NotTracked { instance } => {
                write!(f, "{instance} does not belong to this pool")
            }
            PoolError::NotPooled { instance } => {
                write!(f, "{instance} is not a pooled instance")
            }
            PoolError::PoolGone {
                instance,
                identifier,
            } => {
                write!(
                    f,
                    "{instance} belongs to pool '{identifier}', which no longer exists"
                )
            }
            PoolError::Config { details } => {
                write!(f, "Failed to load pool specification: {details}")
            }
        }
    }
}

impl std::error::Error for PoolError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_identifier() {
        let err = PoolError::PoolGone {
            instance: InstanceId(3),
            identifier: "coins".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "instance #3 belongs to pool 'coins', which no longer exists"
        );
    }
}
