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

//! Error and Result implementations.

use std::fmt;

use super::types::CapabilitySlot;

/// Boxed error returned by provider factories.
pub type BoxError = Box<dyn ::std::error::Error + Send + Sync + 'static>;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// An optional dependency of the hardware type is not available.
    ///
    /// The registry skips such hardware types instead of failing.
    DependencyUnavailable,

    /// A capability provider failed to construct.
    ///
    /// Usually indicates a configuration bug.
    ProviderConstructionError,

    /// Configuration is missing or invalid.
    InvalidConfig,

    /// Invalid value passed to one of paremeters.
    InvalidInput,

    /// Requested driver was not found.
    ResourceNotFound,

    /// Conflict in the request.
    Conflict,
}

/// Error from composing or loading a driver.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    driver: Option<String>,
    dependency: Option<String>,
    slot: Option<CapabilitySlot>,
    source: Option<BoxError>,
}

/// Result of a driver operation.
pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            message: message.into(),
            driver: None,
            dependency: None,
            slot: None,
            source: None,
        }
    }

    /// A dependency required by the driver is not available.
    pub fn dependency_unavailable<D, N, R>(driver: D, dependency: N, reason: R) -> Error
    where
        D: Into<String>,
        N: Into<String>,
        R: Into<String>,
    {
        Error {
            driver: Some(driver.into()),
            dependency: Some(dependency.into()),
            ..Error::new(ErrorKind::DependencyUnavailable, reason)
        }
    }

    /// A provider factory for the given slot has failed.
    pub fn provider_construction(slot: CapabilitySlot, cause: BoxError) -> Error {
        Error {
            slot: Some(slot),
            ..Error::new(
                ErrorKind::ProviderConstructionError,
                format!("cannot construct {} interface: {}", slot, cause),
            )
        }
        .with_source(cause)
    }

    /// Attach the driver name to the error.
    #[inline]
    pub(crate) fn with_driver<S: Into<String>>(mut self, driver: S) -> Error {
        self.driver = Some(driver.into());
        self
    }

    #[inline]
    fn with_source(mut self, source: BoxError) -> Error {
        self.source = Some(source);
        self
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Error message (also known as reason).
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Name of the driver that failed to load (if known).
    #[inline]
    pub fn driver(&self) -> Option<&str> {
        self.driver.as_deref()
    }

    /// Identifier of the missing dependency (for `DependencyUnavailable`).
    #[inline]
    pub fn dependency(&self) -> Option<&str> {
        self.dependency.as_deref()
    }

    /// Capability slot that failed (for `ProviderConstructionError`).
    #[inline]
    pub fn slot(&self) -> Option<CapabilitySlot> {
        self.slot
    }
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::DependencyUnavailable => "Required dependency is not available",
            ErrorKind::ProviderConstructionError => "Failed to construct a capability provider",
            ErrorKind::InvalidConfig => "Configuration is missing or invalid",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::ResourceNotFound => "Requested driver was not found",
            ErrorKind::Conflict => "Request cannot be fulfilled due to a conflict",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if let Some(ref driver) = self.driver {
            write!(f, " (driver {})", driver)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl ::std::error::Error for Error {
    fn source(&self) -> Option<&(dyn ::std::error::Error + 'static)> {
        match self.source {
            Some(ref e) => Some(&**e),
            None => None,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(value: serde_yaml::Error) -> Error {
        Error::new(
            ErrorKind::InvalidConfig,
            format!("Cannot parse configuration: {}", value),
        )
    }
}
