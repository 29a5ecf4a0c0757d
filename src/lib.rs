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

//! Composition and registration of bare metal drivers.
//!
//! A driver is a named bundle of hardware interfaces (power, boot, deploy, console,
//! management, inspect, RAID and vendor passthrough). Drivers are declared statically with
//! [HardwareTypeDeclaration], which can be described without any of its optional
//! dependencies and composed into a [DriverBundle] once they are available.
//!
//! # Example
//!
//! ```rust
//! use baremetal_drivers::{Registry, StaticProbe};
//!
//! # #[cfg(feature = "catalog")]
//! # fn example() -> baremetal_drivers::Result<()> {
//! let registry = Registry::from_config(&Default::default())?;
//! for (driver, desc) in registry.list_hardware_types() {
//!     println!("{} -> {} {:?}", driver, desc.name, desc.interfaces);
//! }
//!
//! let report = registry.load(&StaticProbe::new().with("pysnmp"))?;
//! let snmp = report.get("fake_snmp").expect("fake_snmp is loaded");
//! assert_eq!(snmp.power().unwrap().identifier(), "snmp");
//! # Ok(()) }
//! # #[cfg(feature = "catalog")]
//! # fn main() { example().unwrap(); }
//! # #[cfg(not(feature = "catalog"))]
//! # fn main() {}
//! ```
//!
//! # Features
//!
//! * `catalog` (default) - built-in fake drivers and loading a registry from
//!   the [configuration file](config/index.html).

#![crate_name = "baremetal_drivers"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
// Taken from https://github.com/rust-unofficial/patterns/
#![deny(
    dead_code,
    improper_ctypes,
    missing_debug_implementations,
    missing_docs,
    no_mangle_generic_items,
    non_shorthand_field_patterns,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unsafe_code,
    unused,
    unused_allocation,
    unused_comparisons,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    unused_results,
    while_true
)]

#[macro_use]
mod utils;

mod bundle;
#[cfg(feature = "catalog")]
pub mod catalog;
pub mod config;
mod declaration;
mod error;
mod probe;
mod provider;
mod registry;
mod types;

pub use crate::bundle::{DriverBundle, HardwareTypeDescription};
pub use crate::config::Config;
pub use crate::declaration::{construct, DependencyCheck, HardwareTypeDeclaration};
pub use crate::error::{BoxError, Error, ErrorKind, Result};
pub use crate::probe::{DependencyProbe, EnvProbe, StaticProbe, DEFAULT_PROBE_VARIABLE};
pub use crate::provider::{CapabilityProvider, ProviderFactory, ProviderResult, StubProvider};
pub use crate::registry::{LoadReport, Registry};
pub use crate::types::{CapabilitySlot, Fallbacks, FAKE_INTERFACE};
