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

#[cfg(feature = "catalog")]
fn main() {
    env_logger::init();

    let config = baremetal_drivers::Config::load().unwrap_or_else(|e| {
        log::warn!("Using the default configuration: {}", e);
        baremetal_drivers::Config::default()
    });
    let registry =
        baremetal_drivers::Registry::from_config(&config).expect("Invalid driver configuration");

    println!("Declared drivers:");
    for (driver, desc) in registry.list_hardware_types() {
        println!(
            "{} ({}): {}",
            driver,
            desc.name,
            serde_json::to_string(&desc.interfaces).expect("Cannot serialize interfaces")
        );
    }

    let probe = baremetal_drivers::EnvProbe::default();
    let report = registry.load(&probe).expect("Cannot load drivers");
    println!("Loaded drivers:");
    for bundle in &report.loaded {
        println!("{} at {}: {:?}", bundle.driver(), bundle.loaded_at(), bundle.capability_map());
    }
    for e in &report.skipped {
        println!("Skipped {}: {}", e.driver().unwrap_or_default(), e.message());
    }
}

#[cfg(not(feature = "catalog"))]
fn main() {
    panic!("This example cannot run with 'catalog' feature disabled");
}
