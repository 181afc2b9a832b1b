//! Optional at-most-one-session-per-package guard.
//!
//! Without a registry, two clients can install the same package at once and
//! both `pkg` processes fight over the dpkg lock. When enabled, the second
//! open is refused up front instead.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::PackageName;
use crate::ports::CoreError;

/// Set of package names with an active stream.
#[derive(Debug, Clone, Default)]
pub struct SessionRegistry {
    active: Arc<Mutex<HashSet<String>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `package` for one session.
    ///
    /// The claim is held by the returned lease and released when it drops.
    pub fn try_acquire(&self, package: &PackageName) -> Result<SessionLease, CoreError> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !active.insert(package.as_str().to_string()) {
            return Err(CoreError::Conflict(format!(
                "an operation on {package} is already running"
            )));
        }

        Ok(SessionLease {
            registry: self.clone(),
            package: package.as_str().to_string(),
        })
    }

    pub fn is_active(&self, package: &str) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(package)
    }

    pub fn active_count(&self) -> usize {
        self.active.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

/// Proof that a session owns its package name.
#[derive(Debug)]
pub struct SessionLease {
    registry: SessionRegistry,
    package: String,
}

impl Drop for SessionLease {
    fn drop(&mut self) {
        self.registry
            .active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.package);
    }
}
