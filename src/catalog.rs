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

//! Built-in fake drivers.
//!
//! These drivers combine vendor interfaces with fake deploy and boot so that the registration
//! machinery can be exercised without real hardware. All of them are registered under the
//! `fake-hardware` hardware type.
//!
//! Only the OneView driver constructs a boot interface; the others advertise the configured
//! boot fallback.

use super::declaration::{DependencyCheck, HardwareTypeDeclaration};
use super::provider::ProviderFactory;
use super::types::{CapabilitySlot, FAKE_INTERFACE};

/// Hardware type of all built-in fake drivers.
pub const FAKE_HARDWARE: &str = "fake-hardware";

fn fake_driver(driver: &str) -> HardwareTypeDeclaration {
    HardwareTypeDeclaration::new(driver, FAKE_HARDWARE)
        .with_stub(CapabilitySlot::Deploy, FAKE_INTERFACE)
}

fn requires(library: &str, display_name: &str) -> DependencyCheck {
    DependencyCheck::new(library).with_reason(format!("Unable to import {} library", display_name))
}

fn ipmitool(driver: &str, console: &str) -> HardwareTypeDeclaration {
    fake_driver(driver)
        .with_stub(CapabilitySlot::Power, "ipmitool")
        .with_stub(CapabilitySlot::Console, console)
        .with_stub(CapabilitySlot::Vendor, "ipmitool")
        .with_stub(CapabilitySlot::Management, "ipmitool")
}

/// Fake driver with IPMI power and the shellinabox console.
pub fn fake_ipmitool() -> HardwareTypeDeclaration {
    ipmitool("fake_ipmitool", "ipmitool-shellinabox")
}

/// Fake driver with IPMI power and the socat console.
pub fn fake_ipmitool_socat() -> HardwareTypeDeclaration {
    ipmitool("fake_ipmitool_socat", "ipmitool-socat")
}

/// Fake iLO driver.
pub fn fake_ilo() -> HardwareTypeDeclaration {
    fake_driver("fake_ilo")
        .with_stub(CapabilitySlot::Power, "ilo")
        .with_stub(CapabilitySlot::Management, "ilo")
        .with_stub(CapabilitySlot::Inspect, "ilo")
        .with_dependency(requires("proliantutils", "proliantutils"))
}

/// Fake DRAC driver.
///
/// Advertises the fake deploy interface but constructs the iSCSI one.
pub fn fake_drac() -> HardwareTypeDeclaration {
    fake_driver("fake_drac")
        .with_stub(CapabilitySlot::Power, "idrac")
        .with_provider(
            CapabilitySlot::Deploy,
            FAKE_INTERFACE,
            ProviderFactory::stub(CapabilitySlot::Deploy, "iscsi"),
        )
        .with_stub(CapabilitySlot::Management, "idrac")
        .with_stub(CapabilitySlot::Raid, "idrac")
        .with_stub(CapabilitySlot::Vendor, "idrac")
        .with_stub(CapabilitySlot::Inspect, "idrac")
        .with_dependency(requires("dracclient", "python-dracclient"))
}

/// Fake SNMP driver.
pub fn fake_snmp() -> HardwareTypeDeclaration {
    fake_driver("fake_snmp")
        .with_stub(CapabilitySlot::Power, "snmp")
        .with_interface(CapabilitySlot::Management, FAKE_INTERFACE)
        .with_dependency(requires("pysnmp", "pysnmp"))
}

/// Fake iRMC driver.
pub fn fake_irmc() -> HardwareTypeDeclaration {
    fake_driver("fake_irmc")
        .with_stub(CapabilitySlot::Power, "irmc")
        .with_stub(CapabilitySlot::Management, "irmc")
        .with_stub(CapabilitySlot::Inspect, "irmc")
        .with_dependency(requires("scciclient", "python-scciclient"))
}

/// Fake UCS driver.
pub fn fake_ucs() -> HardwareTypeDeclaration {
    fake_driver("fake_ucs")
        .with_stub(CapabilitySlot::Power, "ucsm")
        .with_stub(CapabilitySlot::Management, "ucsm")
        .with_dependency(requires("UcsSdk", "UcsSdk"))
}

/// Fake CIMC driver.
pub fn fake_cimc() -> HardwareTypeDeclaration {
    fake_driver("fake_cimc")
        .with_stub(CapabilitySlot::Power, "cimc")
        .with_stub(CapabilitySlot::Management, "cimc")
        .with_dependency(requires("ImcSdk", "ImcSdk"))
}

/// Fake OneView driver.
pub fn fake_oneview() -> HardwareTypeDeclaration {
    fake_driver("fake_oneview")
        .with_stub(CapabilitySlot::Power, "oneview")
        .with_stub(CapabilitySlot::Management, "oneview")
        .with_stub(CapabilitySlot::Boot, FAKE_INTERFACE)
        .with_stub(CapabilitySlot::Inspect, FAKE_INTERFACE)
        .with_dependency(requires("hpOneView.oneview_client", "hpOneView"))
}

/// All built-in fake drivers.
pub fn fake_drivers() -> Vec<HardwareTypeDeclaration> {
    vec![
        fake_ipmitool(),
        fake_ipmitool_socat(),
        fake_ilo(),
        fake_drac(),
        fake_snmp(),
        fake_irmc(),
        fake_ucs(),
        fake_cimc(),
        fake_oneview(),
    ]
}
