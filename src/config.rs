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

//! Support for the drivers configuration file.
//!
//! The file is called `drivers.yaml` and is looked up in the following locations:
//!
//! 1. The path in the `BAREMETAL_DRIVERS_CONFIG` environment variable.
//! 2. The current directory.
//! 3. `~/.config/baremetal/`.
//! 4. `/etc/baremetal/`.
//!
//! Example:
//!
//! ```yaml
//! enabled_drivers:
//!   - fake_ipmitool
//!   - fake_drac
//! available_dependencies:
//!   - dracclient
//! fallbacks:
//!   boot: fake
//! ```

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde_derive::Deserialize;

use super::error::{Error, ErrorKind, Result};
use super::probe::StaticProbe;
use super::types::Fallbacks;

/// Environment variable with an explicit path to the configuration file.
pub const CONFIG_VARIABLE: &str = "BAREMETAL_DRIVERS_CONFIG";

const CONFIG_NAME: &str = "drivers.yaml";

/// Drivers configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Drivers to load. Empty means all known drivers.
    #[serde(default)]
    pub enabled_drivers: Vec<String>,
    /// Dependencies considered available by [probe](#method.probe).
    #[serde(default)]
    pub available_dependencies: Vec<String>,
    /// Fallback interfaces for slots that a driver does not declare.
    #[serde(default)]
    pub fallbacks: Fallbacks,
}

fn find_config() -> Option<PathBuf> {
    if let Ok(path) = env::var(CONFIG_VARIABLE) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        warn!("{} points to {:?} which is not a file", CONFIG_VARIABLE, path);
    }

    let current = Path::new(".").join(CONFIG_NAME);
    if current.is_file() {
        match current.canonicalize() {
            Ok(val) => return Some(val),
            Err(e) => warn!("Cannot canonicalize {:?}: {}", current, e),
        }
    }

    if let Some(mut home) = dirs::home_dir() {
        home.push(".config/baremetal");
        home.push(CONFIG_NAME);
        if home.is_file() {
            return Some(home);
        }
    } else {
        warn!("Cannot find home directory");
    }

    let abs = Path::new("/etc/baremetal").join(CONFIG_NAME);
    if abs.is_file() {
        Some(abs)
    } else {
        None
    }
}

impl Config {
    /// Find and load the configuration file.
    pub fn load() -> Result<Config> {
        let path = find_config().ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("{} was not found in any location", CONFIG_NAME),
            )
        })?;
        Config::from_file(path)
    }

    /// Load the configuration from a file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let path = path.as_ref();
        debug!("Loading drivers configuration from {:?}", path);
        let file = File::open(path).map_err(|e| {
            Error::new(
                ErrorKind::InvalidConfig,
                format!("Cannot read {:?}: {}", path, e),
            )
        })?;
        Ok(serde_yaml::from_reader(file)?)
    }

    /// Parse the configuration from a string.
    pub fn from_yaml<S: AsRef<str>>(value: S) -> Result<Config> {
        Ok(serde_yaml::from_str(value.as_ref())?)
    }

    /// Probe that treats the configured dependencies as available.
    pub fn probe(&self) -> StaticProbe {
        self.available_dependencies.iter().cloned().collect()
    }

    /// Whether the driver should be loaded.
    pub fn is_enabled(&self, driver: &str) -> bool {
        self.enabled_drivers.is_empty() || self.enabled_drivers.iter().any(|d| d == driver)
    }
}

#[cfg(test)]
mod test {
    use std::fs;

    use super::*;
    use crate::{CapabilitySlot, DependencyProbe};

    #[test]
    fn test_empty() {
        let cfg = Config::from_yaml("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.is_enabled("fake_ipmitool"));
        assert!(!cfg.probe().is_available("pysnmp"));
        assert_eq!(cfg.fallbacks.get(CapabilitySlot::Boot), Some("fake"));
    }

    #[test]
    fn test_full() {
        let cfg = Config::from_yaml(
            "enabled_drivers: [fake_snmp, fake_ucs]\n\
             available_dependencies: [pysnmp]\n\
             fallbacks:\n  boot: pxe\n",
        )
        .unwrap();
        assert!(cfg.is_enabled("fake_snmp"));
        assert!(!cfg.is_enabled("fake_drac"));
        assert!(cfg.probe().is_available("pysnmp"));
        assert!(!cfg.probe().is_available("UcsSdk"));
        assert_eq!(cfg.fallbacks.get(CapabilitySlot::Boot), Some("pxe"));
        assert_eq!(cfg.fallbacks.get(CapabilitySlot::Deploy), Some("fake"));
    }

    #[test]
    fn test_invalid() {
        let err = Config::from_yaml("enabled_driver: [fake_snmp]").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
        let err = Config::from_yaml("fallbacks:\n  bios: fake\n").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_from_file() {
        let path = env::temp_dir().join(format!("baremetal-drivers-{}.yaml", std::process::id()));
        fs::write(&path, "enabled_drivers: [fake_cimc]\n").unwrap();
        let cfg = Config::from_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(cfg.enabled_drivers, vec!["fake_cimc".to_string()]);

        let err = Config::from_file(&path).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }
}
