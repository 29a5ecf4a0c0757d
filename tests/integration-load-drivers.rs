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

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use baremetal_drivers::{
    CapabilitySlot, DependencyCheck, ErrorKind, HardwareTypeDeclaration, ProviderFactory,
    Registry, StaticProbe, StubProvider,
};

static INIT: Once = Once::new();

fn set_up() {
    INIT.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

fn counting(slot: CapabilitySlot, calls: &Arc<AtomicUsize>) -> ProviderFactory {
    let calls = Arc::clone(calls);
    ProviderFactory::new(move || {
        let _ = calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(StubProvider::new(slot, "fake")))
    })
}

#[test]
fn test_power_and_deploy_only() {
    set_up();
    let decl = HardwareTypeDeclaration::new("driverName", "fake-hardware")
        .with_stub(CapabilitySlot::Power, "fake")
        .with_stub(CapabilitySlot::Deploy, "fake");
    let bundle = decl.construct(&StaticProbe::new()).expect("Cannot construct");
    assert_eq!(
        bundle.slots().collect::<Vec<_>>(),
        vec![CapabilitySlot::Power, CapabilitySlot::Deploy]
    );
}

#[test]
fn test_unavailable_sdk() {
    set_up();
    let calls = Arc::new(AtomicUsize::new(0));
    let decl = HardwareTypeDeclaration::new("driverName", "fake-hardware")
        .with_provider(CapabilitySlot::Power, "vendor", counting(CapabilitySlot::Power, &calls))
        .with_provider(
            CapabilitySlot::Management,
            "vendor",
            counting(CapabilitySlot::Management, &calls),
        )
        .with_dependency(DependencyCheck::new("sdkX"));
    let err = decl
        .construct(&|dep: &str| dep != "sdkX")
        .expect_err("Construction must fail");
    assert_eq!(err.kind(), ErrorKind::DependencyUnavailable);
    assert_eq!(err.driver(), Some("driverName"));
    assert_eq!(err.dependency(), Some("sdkX"));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_throwing_factory() {
    set_up();
    let decl = HardwareTypeDeclaration::new("driverName", "fake-hardware").with_provider(
        CapabilitySlot::Power,
        "vendor",
        ProviderFactory::new(|| Err("cannot reach the BMC".into())),
    );
    let err = decl
        .construct(&StaticProbe::new())
        .expect_err("Construction must fail");
    assert_eq!(err.kind(), ErrorKind::ProviderConstructionError);
    assert_eq!(err.slot(), Some(CapabilitySlot::Power));
}

#[test]
fn test_boot_fallback_in_description() {
    set_up();
    let desc = HardwareTypeDeclaration::new("driverName", "fake-hardware")
        .with_stub(CapabilitySlot::Power, "fake")
        .describe_hardware_type();
    assert_eq!(desc.interface(CapabilitySlot::Boot), Some("fake"));
    for slot in CapabilitySlot::DESCRIBED {
        assert!(desc.interfaces.contains_key(slot));
    }
}

#[test]
fn test_catalog_listing_without_dependencies() {
    set_up();
    let registry = Registry::from_config(&Default::default()).expect("Cannot build registry");
    let listed = registry.list_hardware_types();
    assert_eq!(listed.len(), 9);
    for (driver, desc) in &listed {
        assert_eq!(desc.name, "fake-hardware", "{}", driver);
        assert!(desc.interface(CapabilitySlot::Power).is_some());
    }

    let report = registry.load(&StaticProbe::new()).expect("Cannot load");
    assert_eq!(
        report.loaded.iter().map(|b| b.driver()).collect::<Vec<_>>(),
        vec!["fake_ipmitool", "fake_ipmitool_socat"]
    );
    assert_eq!(report.skipped.len(), 7);
    assert!(report
        .skipped
        .iter()
        .all(|e| e.kind() == ErrorKind::DependencyUnavailable));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_construction() {
    set_up();
    let registry =
        Arc::new(Registry::from_config(&Default::default()).expect("Cannot build registry"));
    let probe = Arc::new(StaticProbe::new().with("dracclient").with("pysnmp"));

    let tasks: Vec<_> = registry
        .drivers()
        .map(|name| {
            let name = name.to_string();
            let registry = Arc::clone(&registry);
            let probe = Arc::clone(&probe);
            tokio::task::spawn_blocking(move || {
                registry
                    .load_driver(&name, &*probe)
                    .map(|b| b.driver().to_string())
                    .map_err(|e| e.kind())
            })
        })
        .collect();

    let mut loaded = Vec::new();
    for task in tasks {
        if let Ok(name) = task.await.expect("Task panicked") {
            loaded.push(name);
        }
    }
    loaded.sort();
    assert_eq!(
        loaded,
        vec!["fake_drac", "fake_ipmitool", "fake_ipmitool_socat", "fake_snmp"]
    );
}
