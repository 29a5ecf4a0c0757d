// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
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

//! Dependency availability checks.
//!
//! Drivers often rely on an optional vendor library. A [DependencyProbe] answers whether such
//! a library is present in the current environment. Probes are consulted on every construction
//! attempt and their answers are never cached by this crate.

use std::collections::HashSet;
use std::env;

use log::trace;

/// Answers whether an optional dependency is available.
pub trait DependencyProbe: Send + Sync {
    /// Whether the dependency with the given identifier can be used.
    fn is_available(&self, dependency: &str) -> bool;
}

impl<F> DependencyProbe for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_available(&self, dependency: &str) -> bool {
        self(dependency)
    }
}

/// A probe with a fixed set of available dependencies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticProbe {
    available: HashSet<String>,
}

impl StaticProbe {
    /// Create a probe where nothing is available.
    #[inline]
    pub fn new() -> StaticProbe {
        StaticProbe::default()
    }

    /// Mark a dependency as available.
    pub fn add<S: Into<String>>(&mut self, dependency: S) {
        let _ = self.available.insert(dependency.into());
    }

    /// Mark a dependency as available (builder style).
    #[inline]
    pub fn with<S: Into<String>>(mut self, dependency: S) -> Self {
        self.add(dependency);
        self
    }
}

impl<S: Into<String>> FromIterator<S> for StaticProbe {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> StaticProbe {
        StaticProbe {
            available: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl DependencyProbe for StaticProbe {
    fn is_available(&self, dependency: &str) -> bool {
        self.available.contains(dependency)
    }
}

/// A probe reading a comma-separated list of dependencies from an environment variable.
///
/// The variable is re-read on every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvProbe {
    variable: String,
}

/// Default variable used by [EnvProbe].
pub const DEFAULT_PROBE_VARIABLE: &str = "BAREMETAL_AVAILABLE_DEPENDENCIES";

impl Default for EnvProbe {
    fn default() -> EnvProbe {
        EnvProbe::new(DEFAULT_PROBE_VARIABLE)
    }
}

impl EnvProbe {
    /// Create a probe using the given variable.
    pub fn new<S: Into<String>>(variable: S) -> EnvProbe {
        EnvProbe {
            variable: variable.into(),
        }
    }
}

impl DependencyProbe for EnvProbe {
    fn is_available(&self, dependency: &str) -> bool {
        match env::var(&self.variable) {
            Ok(value) => value
                .split(',')
                .map(str::trim)
                .any(|item| item == dependency),
            Err(e) => {
                trace!("Cannot read {}: {}", self.variable, e);
                false
            }
        }
    }
}
