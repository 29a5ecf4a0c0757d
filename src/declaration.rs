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

//! Hardware type declarations and driver composition.

use std::collections::BTreeMap;

use log::{debug, trace};
use static_assertions::assert_impl_all;

use super::bundle::{DriverBundle, HardwareTypeDescription};
use super::error::{Error, Result};
use super::probe::DependencyProbe;
use super::provider::{CapabilityProvider, ProviderFactory};
use super::types::{CapabilitySlot, Fallbacks};

/// An optional dependency that must be available before a driver is composed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyCheck {
    dependency: String,
    reason: Option<String>,
}

impl DependencyCheck {
    /// Check for the given dependency identifier.
    pub fn new<S: Into<String>>(dependency: S) -> DependencyCheck {
        DependencyCheck {
            dependency: dependency.into(),
            reason: None,
        }
    }

    /// Use a custom reason when the dependency is missing.
    pub fn with_reason<S: Into<String>>(mut self, reason: S) -> DependencyCheck {
        self.reason = Some(reason.into());
        self
    }

    /// Dependency identifier passed to the probe.
    #[inline]
    pub fn dependency(&self) -> &str {
        &self.dependency
    }

    /// Reason reported when the dependency is missing.
    pub fn reason(&self) -> String {
        match self.reason {
            Some(ref reason) => reason.clone(),
            None => format!("Unable to import {} library", self.dependency),
        }
    }
}

#[derive(Debug, Clone)]
struct SlotDeclaration {
    interface: String,
    factory: Option<ProviderFactory>,
}

/// Static declaration of a driver: which providers it is composed of and what it requires.
///
/// A declaration is cheap to clone and can be described without satisfying any of its
/// dependencies.
///
/// ```rust
/// use baremetal_drivers::{CapabilitySlot, DependencyCheck, HardwareTypeDeclaration};
///
/// let decl = HardwareTypeDeclaration::new("fake_snmp", "fake-hardware")
///     .with_stub(CapabilitySlot::Power, "snmp")
///     .with_stub(CapabilitySlot::Deploy, "fake")
///     .with_dependency(DependencyCheck::new("pysnmp"));
///
/// let desc = decl.describe_hardware_type();
/// assert_eq!(desc.interface(CapabilitySlot::Management), Some("fake"));
///
/// let err = decl.construct(&|_: &str| false).unwrap_err();
/// assert_eq!(err.dependency(), Some("pysnmp"));
/// ```
#[derive(Debug, Clone)]
pub struct HardwareTypeDeclaration {
    driver: String,
    hardware_type: String,
    slots: BTreeMap<CapabilitySlot, SlotDeclaration>,
    dependencies: Vec<DependencyCheck>,
    fallbacks: Fallbacks,
}

assert_impl_all!(HardwareTypeDeclaration: Send, Sync);

impl HardwareTypeDeclaration {
    /// Start a declaration of a driver registered under the hardware type.
    pub fn new<S1, S2>(driver: S1, hardware_type: S2) -> HardwareTypeDeclaration
    where
        S1: Into<String>,
        S2: Into<String>,
    {
        HardwareTypeDeclaration {
            driver: driver.into(),
            hardware_type: hardware_type.into(),
            slots: BTreeMap::new(),
            dependencies: Vec::new(),
            fallbacks: Fallbacks::default(),
        }
    }

    /// Unique name of the driver.
    #[inline]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Name of the hardware type.
    #[inline]
    pub fn hardware_type(&self) -> &str {
        &self.hardware_type
    }

    /// Dependency checks in the order they are evaluated.
    #[inline]
    pub fn dependencies(&self) -> &[DependencyCheck] {
        &self.dependencies
    }

    /// Fallback identifiers used in the description.
    #[inline]
    pub fn fallbacks(&self) -> &Fallbacks {
        &self.fallbacks
    }

    /// Slots that are constructed by [construct](#method.construct).
    pub fn constructed_slots(&self) -> impl Iterator<Item = CapabilitySlot> + '_ {
        self.slots
            .iter()
            .filter(|(_, decl)| decl.factory.is_some())
            .map(|(slot, _)| *slot)
    }

    /// Declare a slot with the interface it advertises and the factory to build it.
    ///
    /// The advertised interface may differ from the identifier of the provider that the
    /// factory creates. Declaring the same slot again replaces the previous declaration.
    pub fn set_provider<S: Into<String>>(
        &mut self,
        slot: CapabilitySlot,
        interface: S,
        factory: ProviderFactory,
    ) {
        let _ = self.slots.insert(
            slot,
            SlotDeclaration {
                interface: interface.into(),
                factory: Some(factory),
            },
        );
    }

    /// Declare a slot with the interface it advertises and the factory to build it.
    #[inline]
    pub fn with_provider<S: Into<String>>(
        mut self,
        slot: CapabilitySlot,
        interface: S,
        factory: ProviderFactory,
    ) -> Self {
        self.set_provider(slot, interface, factory);
        self
    }

    /// Declare a slot backed by a [StubProvider](struct.StubProvider.html).
    pub fn with_stub<S: Into<String>>(self, slot: CapabilitySlot, interface: S) -> Self {
        let interface = interface.into();
        let factory = ProviderFactory::stub(slot, interface.clone());
        self.with_provider(slot, interface, factory)
    }

    /// Advertise an interface for a slot that is not constructed.
    pub fn set_interface<S: Into<String>>(&mut self, slot: CapabilitySlot, interface: S) {
        let _ = self.slots.insert(
            slot,
            SlotDeclaration {
                interface: interface.into(),
                factory: None,
            },
        );
    }

    /// Advertise an interface for a slot that is not constructed.
    #[inline]
    pub fn with_interface<S: Into<String>>(mut self, slot: CapabilitySlot, interface: S) -> Self {
        self.set_interface(slot, interface);
        self
    }

    /// Add a dependency check.
    pub fn add_dependency(&mut self, check: DependencyCheck) {
        self.dependencies.push(check);
    }

    /// Add a dependency check.
    #[inline]
    pub fn with_dependency(mut self, check: DependencyCheck) -> Self {
        self.add_dependency(check);
        self
    }

    /// Set fallback identifiers.
    pub fn set_fallbacks(&mut self, fallbacks: Fallbacks) {
        self.fallbacks = fallbacks;
    }

    /// Set fallback identifiers.
    #[inline]
    pub fn with_fallbacks(mut self, fallbacks: Fallbacks) -> Self {
        self.set_fallbacks(fallbacks);
        self
    }

    /// Describe the hardware type without constructing anything.
    ///
    /// The result always contains the `boot`, `deploy`, `management` and `power` slots.
    /// Undeclared slots are filled from the fallbacks, including any other slot that has a
    /// fallback configured. Never evaluates dependency checks.
    pub fn describe_hardware_type(&self) -> HardwareTypeDescription {
        let mut interfaces: BTreeMap<CapabilitySlot, String> = self
            .slots
            .iter()
            .map(|(slot, decl)| (*slot, decl.interface.clone()))
            .collect();

        for (slot, fallback) in self.fallbacks.iter() {
            let _ = interfaces
                .entry(slot)
                .or_insert_with(|| fallback.to_string());
        }

        HardwareTypeDescription {
            name: self.hardware_type.clone(),
            interfaces,
        }
    }

    /// Compose the driver.
    ///
    /// Dependency checks run first, in order, and no provider is created if any of them fails.
    /// Each call creates new providers.
    pub fn construct<P>(&self, probe: &P) -> Result<DriverBundle>
    where
        P: DependencyProbe + ?Sized,
    {
        let factories = self
            .slots
            .iter()
            .filter_map(|(slot, decl)| decl.factory.clone().map(|f| (*slot, f)));
        construct(
            &self.driver,
            &self.hardware_type,
            factories,
            &self.dependencies,
            probe,
        )
    }
}

/// Compose a driver from provider factories.
///
/// All `checks` are evaluated against the `probe` in order. The first missing dependency
/// results in an error of kind `DependencyUnavailable` and no factory is invoked. Otherwise
/// every factory is invoked once; a failing factory results in an error of kind
/// `ProviderConstructionError` and the providers created so far are dropped.
///
/// If a slot is repeated in `factories`, the last factory wins.
pub fn construct<P, I>(
    driver: &str,
    hardware_type: &str,
    factories: I,
    checks: &[DependencyCheck],
    probe: &P,
) -> Result<DriverBundle>
where
    P: DependencyProbe + ?Sized,
    I: IntoIterator<Item = (CapabilitySlot, ProviderFactory)>,
{
    for check in checks {
        if !probe.is_available(check.dependency()) {
            let reason = check.reason();
            debug!(
                "Dependency {} of driver {} is not available: {}",
                check.dependency(),
                driver,
                reason
            );
            return Err(Error::dependency_unavailable(
                driver,
                check.dependency(),
                reason,
            ));
        }
        trace!("Dependency {} of driver {} is available", check.dependency(), driver);
    }

    let factories: BTreeMap<CapabilitySlot, ProviderFactory> = factories.into_iter().collect();
    let mut slots: BTreeMap<CapabilitySlot, Box<dyn CapabilityProvider>> = BTreeMap::new();
    for (slot, factory) in factories {
        let provider = factory
            .create()
            .map_err(|e| Error::provider_construction(slot, e).with_driver(driver))?;
        if provider.slot() != slot {
            let cause = format!(
                "factory returned a {} provider {}",
                provider.slot(),
                provider.identifier()
            );
            return Err(Error::provider_construction(slot, cause.into()).with_driver(driver));
        }
        trace!(
            "Constructed {} interface {} for driver {}",
            slot,
            provider.identifier(),
            driver
        );
        let _ = slots.insert(slot, provider);
    }

    debug!(
        "Composed driver {} of hardware type {} with interfaces {:?}",
        driver,
        hardware_type,
        slots.keys().collect::<Vec<_>>()
    );
    Ok(DriverBundle::new(
        driver.to_string(),
        hardware_type.to_string(),
        slots,
    ))
}
