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

//! Capability providers and their factories.

use std::fmt::{self, Debug};
use std::sync::Arc;

use super::error::BoxError;
use super::types::CapabilitySlot;

/// An implementation of one hardware interface.
///
/// The composer never looks inside providers, it only creates and stores them.
pub trait CapabilityProvider: Debug + Send + Sync {
    /// Slot this provider implements.
    fn slot(&self) -> CapabilitySlot;

    /// Short identifier of the implementation, e.g. `ipmitool` or `fake`.
    fn identifier(&self) -> &str;
}

/// Result of a provider factory.
pub type ProviderResult = ::std::result::Result<Box<dyn CapabilityProvider>, BoxError>;

/// Zero-argument constructor of a capability provider.
///
/// Factories are shared between clones of a declaration and may be called from several
/// threads at once.
#[derive(Clone)]
pub struct ProviderFactory(Arc<dyn Fn() -> ProviderResult + Send + Sync>);

impl ProviderFactory {
    /// Create a factory from a function.
    pub fn new<F>(func: F) -> ProviderFactory
    where
        F: Fn() -> ProviderResult + Send + Sync + 'static,
    {
        ProviderFactory(Arc::new(func))
    }

    /// Create a factory producing a [StubProvider] with the given identifier.
    pub fn stub<S: Into<String>>(slot: CapabilitySlot, identifier: S) -> ProviderFactory {
        let identifier = identifier.into();
        ProviderFactory::new(move || Ok(Box::new(StubProvider::new(slot, identifier.clone()))))
    }

    /// Invoke the factory.
    #[inline]
    pub fn create(&self) -> ProviderResult {
        (self.0)()
    }
}

impl Debug for ProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("ProviderFactory")
    }
}

/// A provider that only carries its slot and identifier.
///
/// Used by the fake drivers, where no real hardware is behind the interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StubProvider {
    slot: CapabilitySlot,
    identifier: String,
}

impl StubProvider {
    /// Create a stub provider.
    pub fn new<S: Into<String>>(slot: CapabilitySlot, identifier: S) -> StubProvider {
        StubProvider {
            slot,
            identifier: identifier.into(),
        }
    }
}

impl CapabilityProvider for StubProvider {
    fn slot(&self) -> CapabilitySlot {
        self.slot
    }

    fn identifier(&self) -> &str {
        &self.identifier
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_stub_factory() {
        let factory = ProviderFactory::stub(CapabilitySlot::Console, "ipmitool-socat");
        let first = factory.create().unwrap();
        let second = factory.create().unwrap();
        assert_eq!(first.slot(), CapabilitySlot::Console);
        assert_eq!(first.identifier(), "ipmitool-socat");
        assert_eq!(second.identifier(), "ipmitool-socat");
    }

    #[test]
    fn test_factory_is_invoked_every_time() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let factory = ProviderFactory::new(move || {
            let _ = counter.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubProvider::new(CapabilitySlot::Power, "fake")))
        });
        let cloned = factory.clone();
        let _ = factory.create().unwrap();
        let _ = cloned.create().unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failing_factory() {
        let factory = ProviderFactory::new(|| Err("boom".into()));
        assert_eq!(factory.create().unwrap_err().to_string(), "boom");
    }
}
