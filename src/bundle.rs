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

//! Composed drivers and their descriptions.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};
use static_assertions::assert_impl_all;

use super::provider::CapabilityProvider;
use super::types::CapabilitySlot;

/// A driver composed from capability providers.
///
/// Bundles are immutable: once constructed, no slot can be replaced.
#[derive(Debug)]
pub struct DriverBundle {
    driver: String,
    hardware_type: String,
    slots: BTreeMap<CapabilitySlot, Box<dyn CapabilityProvider>>,
    loaded_at: DateTime<Utc>,
}

assert_impl_all!(DriverBundle: Send, Sync);

/// Static description of a hardware type.
///
/// Derived from a declaration without constructing anything.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HardwareTypeDescription {
    /// Name of the hardware type.
    pub name: String,
    /// Interface identifier for every described slot.
    pub interfaces: BTreeMap<CapabilitySlot, String>,
}

impl DriverBundle {
    pub(crate) fn new(
        driver: String,
        hardware_type: String,
        slots: BTreeMap<CapabilitySlot, Box<dyn CapabilityProvider>>,
    ) -> DriverBundle {
        DriverBundle {
            driver,
            hardware_type,
            slots,
            loaded_at: Utc::now(),
        }
    }

    /// Unique name of the driver.
    #[inline]
    pub fn driver(&self) -> &str {
        &self.driver
    }

    /// Hardware type this bundle is registered under.
    ///
    /// Several bundles may share the same hardware type.
    #[inline]
    pub fn hardware_type(&self) -> &str {
        &self.hardware_type
    }

    /// When the bundle was constructed.
    #[inline]
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    /// Provider for the slot, if the bundle supports it.
    #[inline]
    pub fn get(&self, slot: CapabilitySlot) -> Option<&dyn CapabilityProvider> {
        self.slots.get(&slot).map(|p| &**p)
    }

    /// Whether the bundle supports the slot.
    #[inline]
    pub fn supports(&self, slot: CapabilitySlot) -> bool {
        self.slots.contains_key(&slot)
    }

    /// Populated slots in a stable order.
    pub fn slots(&self) -> impl Iterator<Item = CapabilitySlot> + '_ {
        self.slots.keys().copied()
    }

    /// Identifiers of the constructed providers.
    pub fn capability_map(&self) -> BTreeMap<CapabilitySlot, String> {
        self.slots
            .iter()
            .map(|(slot, provider)| (*slot, provider.identifier().to_string()))
            .collect()
    }

    /// Whether all slots required for provisioning are populated.
    pub fn is_usable(&self) -> bool {
        CapabilitySlot::ALL
            .iter()
            .filter(|slot| slot.is_required())
            .all(|slot| self.supports(*slot))
    }

    /// Power interface provider.
    #[inline]
    pub fn power(&self) -> Option<&dyn CapabilityProvider> {
        self.get(CapabilitySlot::Power)
    }

    /// Deploy interface provider.
    #[inline]
    pub fn deploy(&self) -> Option<&dyn CapabilityProvider> {
        self.get(CapabilitySlot::Deploy)
    }

    /// Boot interface provider.
    #[inline]
    pub fn boot(&self) -> Option<&dyn CapabilityProvider> {
        self.get(CapabilitySlot::Boot)
    }

    /// Management interface provider.
    #[inline]
    pub fn management(&self) -> Option<&dyn CapabilityProvider> {
        self.get(CapabilitySlot::Management)
    }
}

impl HardwareTypeDescription {
    /// Interface identifier for the slot.
    #[inline]
    pub fn interface(&self, slot: CapabilitySlot) -> Option<&str> {
        self.interfaces.get(&slot).map(String::as_str)
    }
}
