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

//! Registry of driver declarations.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, error, info, warn};
use static_assertions::assert_impl_all;

use super::bundle::{DriverBundle, HardwareTypeDescription};
#[cfg(feature = "catalog")]
use super::config::Config;
use super::declaration::HardwareTypeDeclaration;
use super::error::{Error, ErrorKind, Result};
use super::probe::DependencyProbe;

/// A collection of driver declarations keyed by the driver name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    declarations: BTreeMap<String, HardwareTypeDeclaration>,
}

assert_impl_all!(Registry: Send, Sync);

/// Outcome of loading all drivers of a registry.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Drivers that were composed successfully.
    pub loaded: Vec<DriverBundle>,
    /// Drivers skipped because of a missing dependency.
    pub skipped: Vec<Error>,
}

impl LoadReport {
    /// Loaded driver by its name.
    pub fn get(&self, driver: &str) -> Option<&DriverBundle> {
        self.loaded.iter().find(|b| b.driver() == driver)
    }

    /// Loaded drivers of the given hardware type.
    pub fn by_hardware_type<'r>(
        &'r self,
        hardware_type: &'r str,
    ) -> impl Iterator<Item = &'r DriverBundle> + 'r {
        self.loaded
            .iter()
            .filter(move |b| b.hardware_type() == hardware_type)
    }

    /// Whether the driver was skipped.
    pub fn is_skipped(&self, driver: &str) -> bool {
        self.skipped.iter().any(|e| e.driver() == Some(driver))
    }
}

impl Registry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Registry {
        Registry::default()
    }

    /// Registry with the built-in fake drivers enabled in the configuration.
    ///
    /// The configured fallbacks are applied to every declaration.
    #[cfg(feature = "catalog")]
    pub fn from_config(config: &Config) -> Result<Registry> {
        let known = super::catalog::fake_drivers();
        if let Some(unknown) = config
            .enabled_drivers
            .iter()
            .find(|name| !known.iter().any(|d| d.driver() == name.as_str()))
        {
            return Err(Error::new(
                ErrorKind::InvalidConfig,
                format!("Unknown driver {} in enabled_drivers", unknown),
            ));
        }

        let mut registry = Registry::new();
        for decl in known {
            if config.is_enabled(decl.driver()) {
                registry.register(decl.with_fallbacks(config.fallbacks.clone()))?;
            }
        }
        Ok(registry)
    }

    /// Add a declaration.
    ///
    /// Driver names must be unique, while several drivers can share a hardware type.
    pub fn register(&mut self, declaration: HardwareTypeDeclaration) -> Result<()> {
        if self.declarations.contains_key(declaration.driver()) {
            return Err(Error::new(
                ErrorKind::Conflict,
                format!("Driver {} is already registered", declaration.driver()),
            ));
        }

        debug!(
            "Registering driver {} of hardware type {}",
            declaration.driver(),
            declaration.hardware_type()
        );
        let _ = self
            .declarations
            .insert(declaration.driver().to_string(), declaration);
        Ok(())
    }

    /// Add a declaration (builder style).
    #[inline]
    pub fn with(mut self, declaration: HardwareTypeDeclaration) -> Result<Self> {
        self.register(declaration)?;
        Ok(self)
    }

    /// Number of registered drivers.
    #[inline]
    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    /// Whether the registry is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }

    /// Declaration by the driver name.
    #[inline]
    pub fn get(&self, driver: &str) -> Option<&HardwareTypeDeclaration> {
        self.declarations.get(driver)
    }

    /// Names of the registered drivers.
    pub fn drivers(&self) -> impl Iterator<Item = &str> {
        self.declarations.keys().map(String::as_str)
    }

    /// Distinct hardware type names.
    pub fn hardware_types(&self) -> BTreeSet<&str> {
        self.declarations
            .values()
            .map(|d| d.hardware_type())
            .collect()
    }

    /// Describe all registered drivers without constructing any of them.
    pub fn list_hardware_types(&self) -> Vec<(&str, HardwareTypeDescription)> {
        self.declarations
            .iter()
            .map(|(name, decl)| (name.as_str(), decl.describe_hardware_type()))
            .collect()
    }

    /// Compose a single driver.
    pub fn load_driver<P>(&self, driver: &str, probe: &P) -> Result<DriverBundle>
    where
        P: DependencyProbe + ?Sized,
    {
        self.declarations
            .get(driver)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::ResourceNotFound,
                    format!("No such driver: {}", driver),
                )
            })?
            .construct(probe)
    }

    /// Compose all drivers.
    ///
    /// Drivers with missing dependencies are skipped and reported in the result. A provider
    /// construction failure aborts the whole load.
    pub fn load<P>(&self, probe: &P) -> Result<LoadReport>
    where
        P: DependencyProbe + ?Sized,
    {
        let mut report = LoadReport::default();
        for decl in self.declarations.values() {
            match decl.construct(probe) {
                Ok(bundle) => {
                    if !bundle.is_usable() {
                        warn!(
                            "Driver {} does not provide both power and deploy interfaces",
                            bundle.driver()
                        );
                    }
                    report.loaded.push(bundle);
                }
                Err(e) if e.kind() == ErrorKind::DependencyUnavailable => {
                    warn!("Skipping driver {}: {}", decl.driver(), e.message());
                    report.skipped.push(e);
                }
                Err(e) => {
                    error!("Failed to load driver {}: {}", decl.driver(), e);
                    return Err(e);
                }
            }
        }

        info!(
            "Loaded {} driver(s), skipped {}",
            report.loaded.len(),
            report.skipped.len()
        );
        Ok(report)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{CapabilitySlot, DependencyCheck, ProviderFactory, StaticProbe};

    fn registry() -> Registry {
        Registry::new()
            .with(
                HardwareTypeDeclaration::new("one", "hw-a")
                    .with_stub(CapabilitySlot::Power, "fake")
                    .with_stub(CapabilitySlot::Deploy, "fake"),
            )
            .unwrap()
            .with(
                HardwareTypeDeclaration::new("two", "hw-a")
                    .with_stub(CapabilitySlot::Power, "vendor")
                    .with_stub(CapabilitySlot::Deploy, "fake")
                    .with_dependency(DependencyCheck::new("vendorsdk")),
            )
            .unwrap()
            .with(
                HardwareTypeDeclaration::new("three", "hw-b")
                    .with_stub(CapabilitySlot::Power, "fake"),
            )
            .unwrap()
    }

    #[test]
    fn test_duplicate_driver() {
        let mut reg = registry();
        let err = reg
            .register(HardwareTypeDeclaration::new("one", "hw-c"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_listing() {
        let reg = registry();
        assert_eq!(reg.drivers().collect::<Vec<_>>(), vec!["one", "three", "two"]);
        assert_eq!(
            reg.hardware_types().into_iter().collect::<Vec<_>>(),
            vec!["hw-a", "hw-b"]
        );
        let listed = reg.list_hardware_types();
        assert_eq!(listed.len(), 3);
        let (_, two) = listed.iter().find(|(name, _)| *name == "two").unwrap();
        assert_eq!(two.name, "hw-a");
        assert_eq!(two.interface(CapabilitySlot::Power), Some("vendor"));
    }

    #[test]
    fn test_load_skips_missing_dependencies() {
        let reg = registry();
        let report = reg.load(&StaticProbe::new()).unwrap();
        assert_eq!(report.loaded.len(), 2);
        assert!(report.get("one").is_some());
        assert!(report.get("three").is_some());
        assert!(report.is_skipped("two"));
        assert_eq!(report.skipped[0].dependency(), Some("vendorsdk"));
        assert_eq!(report.by_hardware_type("hw-a").count(), 1);

        let report = reg.load(&StaticProbe::new().with("vendorsdk")).unwrap();
        assert_eq!(report.loaded.len(), 3);
        assert!(report.skipped.is_empty());
        assert_eq!(report.by_hardware_type("hw-a").count(), 2);
    }

    #[test]
    fn test_load_fails_on_construction_error() {
        let reg = registry()
            .with(HardwareTypeDeclaration::new("broken", "hw-b").with_provider(
                CapabilitySlot::Power,
                "fake",
                ProviderFactory::new(|| Err("no credentials".into())),
            ))
            .unwrap();
        let err = reg.load(&StaticProbe::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ProviderConstructionError);
        assert_eq!(err.driver(), Some("broken"));
    }

    #[test]
    fn test_load_driver() {
        let reg = registry();
        let bundle = reg.load_driver("one", &StaticProbe::new()).unwrap();
        assert_eq!(bundle.driver(), "one");
        let err = reg.load_driver("four", &StaticProbe::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
        let err = reg.load_driver("two", &StaticProbe::new()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    }

    #[cfg(feature = "catalog")]
    #[test]
    fn test_from_config() {
        let cfg = Config::from_yaml(
            "enabled_drivers: [fake_snmp, fake_ipmitool]\nfallbacks: {boot: pxe}\n",
        )
        .unwrap();
        let reg = Registry::from_config(&cfg).unwrap();
        assert_eq!(
            reg.drivers().collect::<Vec<_>>(),
            vec!["fake_ipmitool", "fake_snmp"]
        );
        let desc = reg.get("fake_snmp").unwrap().describe_hardware_type();
        assert_eq!(desc.interface(CapabilitySlot::Boot), Some("pxe"));

        let report = reg.load(&cfg.probe()).unwrap();
        assert!(report.get("fake_ipmitool").is_some());
        assert!(report.is_skipped("fake_snmp"));
    }

    #[cfg(feature = "catalog")]
    #[test]
    fn test_from_config_optional_slot_fallbacks() {
        let cfg = Config::from_yaml(
            "enabled_drivers: [fake_snmp]\nfallbacks: {vendor: no-vendor, console: no-console}\n",
        )
        .unwrap();
        let reg = Registry::from_config(&cfg).unwrap();
        let desc = reg.get("fake_snmp").unwrap().describe_hardware_type();
        assert_eq!(desc.interface(CapabilitySlot::Power), Some("snmp"));
        assert_eq!(desc.interface(CapabilitySlot::Boot), Some("fake"));
        assert_eq!(desc.interface(CapabilitySlot::Vendor), Some("no-vendor"));
        assert_eq!(desc.interface(CapabilitySlot::Console), Some("no-console"));
        assert_eq!(desc.interface(CapabilitySlot::Raid), None);
    }

    #[cfg(feature = "catalog")]
    #[test]
    fn test_from_config_unknown_driver() {
        let cfg = Config::from_yaml("enabled_drivers: [fake_redfish]").unwrap();
        let err = Registry::from_config(&cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidConfig);
    }

    #[cfg(feature = "catalog")]
    #[test]
    fn test_from_config_all() {
        let reg = Registry::from_config(&Config::default()).unwrap();
        assert_eq!(reg.len(), 9);
        assert_eq!(
            reg.hardware_types().into_iter().collect::<Vec<_>>(),
            vec!["fake-hardware"]
        );
    }
}
