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

//! Authored pool specifications.
//!
//! A project ships an ordered list of [`PoolSpec`]s describing which
//! pools exist, how large they start, and when they are created. The
//! list is handed to [`PoolRegistry::load_specs`](crate::PoolRegistry::load_specs)
//! at startup; [`load_spec_file`] reads it from JSON.

use crate::pool::DEFAULT_CAPACITY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use warren_core::{PoolError, PrototypeId};

/// When a specified pool is actually constructed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreationTrigger {
    /// As soon as the specification list is loaded.
    #[default]
    Immediate,
    /// When the named host context (a scene, screen, level) becomes
    /// active.
    ContextLoaded(String),
    /// When the caller explicitly asks via
    /// [`PoolRegistry::create_deferred`](crate::PoolRegistry::create_deferred).
    Custom,
}

/// One authored pool specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSpec {
    /// Identifier the pool is registered under.
    pub identifier: String,
    /// Prototype the pool manufactures from.
    pub prototype: PrototypeId,
    /// Initial capacity; defaults to [`DEFAULT_CAPACITY`].
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Whether the pool doubles its capacity when exhausted.
    #[serde(default)]
    pub expandable: bool,
    /// Whether the pool outlives host context changes.
    #[serde(default)]
    pub persistent: bool,
    /// When the pool is constructed.
    #[serde(default)]
    pub trigger: CreationTrigger,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

/// Reads an ordered pool specification list from a JSON file.
pub fn load_spec_file(path: impl AsRef<Path>) -> Result<Vec<PoolSpec>, PoolError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| PoolError::Config {
        details: format!("failed to read '{}': {err}", path.display()),
    })?;
    serde_json::from_slice(&bytes).map_err(|err| PoolError::Config {
        details: format!("failed to parse '{}': {err}", path.display()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_spec_fills_defaults() {
        let specs: Vec<PoolSpec> =
            serde_json::from_str(r#"[{"identifier": "coins", "prototype": "prefabs/coin"}]"#)
                .expect("minimal spec parses");

        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].capacity, DEFAULT_CAPACITY);
        assert!(!specs[0].expandable);
        assert!(!specs[0].persistent);
        assert_eq!(specs[0].trigger, CreationTrigger::Immediate);
    }

    #[test]
    fn test_spec_file_round_trip() {
        let specs = vec![
            PoolSpec {
                identifier: "coins".to_string(),
                prototype: "prefabs/coin".into(),
                capacity: 16,
                expandable: true,
                persistent: false,
                trigger: CreationTrigger::Immediate,
            },
            PoolSpec {
                identifier: "sparks".to_string(),
                prototype: "prefabs/spark".into(),
                capacity: 8,
                expandable: false,
                persistent: true,
                trigger: CreationTrigger::ContextLoaded("arena".to_string()),
            },
        ];

        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("pools.json");
        fs::write(&path, serde_json::to_vec_pretty(&specs).expect("serialize"))
            .expect("write spec file");

        let loaded = load_spec_file(&path).expect("load spec file");
        assert_eq!(loaded, specs);
    }

    #[test]
    fn test_missing_file_is_a_config_error() {
        let result = load_spec_file("/nonexistent/pools.json");
        assert!(matches!(result, Err(PoolError::Config { .. })));
    }
}
