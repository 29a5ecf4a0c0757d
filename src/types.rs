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

//! Types shared by declarations and bundles.

use std::collections::BTreeMap;

use serde_derive::{Deserialize, Serialize};

/// Identifier used for the fake interfaces.
pub const FAKE_INTERFACE: &str = "fake";

protocol_enum! {
    /// Role (hardware interface) that a driver may fill.
    enum CapabilitySlot {
        /// Power control.
        Power = "power",
        /// Booting the deploy or instance image.
        Boot = "boot",
        /// Deploying an image.
        Deploy = "deploy",
        /// Serial console.
        Console = "console",
        /// Boot device and sensor management.
        Management = "management",
        /// Hardware inspection.
        Inspect = "inspect",
        /// RAID configuration.
        Raid = "raid",
        /// Vendor-specific passthrough.
        Vendor = "vendor"
    }
}

impl CapabilitySlot {
    /// Slots that every hardware type description must mention.
    pub const DESCRIBED: &'static [CapabilitySlot] = &[
        CapabilitySlot::Boot,
        CapabilitySlot::Deploy,
        CapabilitySlot::Management,
        CapabilitySlot::Power,
    ];

    /// Whether a bundle is unusable without this slot.
    #[inline]
    pub fn is_required(&self) -> bool {
        matches!(self, CapabilitySlot::Power | CapabilitySlot::Deploy)
    }

    /// Whether the slot is always present in a hardware type description.
    #[inline]
    pub fn is_always_described(&self) -> bool {
        CapabilitySlot::DESCRIBED.contains(self)
    }
}

/// Fallback interface identifiers for slots that a declaration leaves unset.
///
/// Slots from [CapabilitySlot::DESCRIBED] always have a fallback and default to the `fake`
/// interface. Any other slot is filled only when a fallback is configured for it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Fallbacks(BTreeMap<CapabilitySlot, String>);

impl Default for Fallbacks {
    fn default() -> Fallbacks {
        Fallbacks(
            CapabilitySlot::DESCRIBED
                .iter()
                .map(|slot| (*slot, FAKE_INTERFACE.to_string()))
                .collect(),
        )
    }
}

impl Fallbacks {
    /// Fallback identifier for the slot.
    ///
    /// Slots that must always be described use `fake` when not configured.
    pub fn get(&self, slot: CapabilitySlot) -> Option<&str> {
        match self.0.get(&slot) {
            Some(value) => Some(value.as_str()),
            None if slot.is_always_described() => Some(FAKE_INTERFACE),
            None => None,
        }
    }

    /// Slots with a fallback and their identifiers, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (CapabilitySlot, &str)> + '_ {
        CapabilitySlot::ALL
            .iter()
            .filter_map(move |slot| self.get(*slot).map(|value| (*slot, value)))
    }

    /// Set a fallback identifier.
    pub fn set<S: Into<String>>(&mut self, slot: CapabilitySlot, value: S) {
        let _ = self.0.insert(slot, value.into());
    }

    /// Set a fallback identifier (builder style).
    #[inline]
    pub fn with<S: Into<String>>(mut self, slot: CapabilitySlot, value: S) -> Self {
        self.set(slot, value);
        self
    }
}
