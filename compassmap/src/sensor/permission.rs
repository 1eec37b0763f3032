//! Permission gate consulted before the first sensor subscription.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

use super::traits::{PermissionGate, SensorFuture};

/// A device capability guarded by a user permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Capability {
    /// Foreground location access (also covers the compass on most platforms).
    Location,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::Location => write!(f, "location"),
        }
    }
}

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

/// Permission gate with a fixed answer.
///
/// Used by headless hosts, where there is nobody to prompt, and by tests.
#[derive(Debug)]
pub struct StaticPermissionGate {
    status: PermissionStatus,
    requests: AtomicUsize,
}

impl StaticPermissionGate {
    /// Gate that grants every request.
    pub fn granted() -> Self {
        Self::new(PermissionStatus::Granted)
    }

    /// Gate that denies every request.
    pub fn denied() -> Self {
        Self::new(PermissionStatus::Denied)
    }

    fn new(status: PermissionStatus) -> Self {
        Self {
            status,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of times the gate has been consulted.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

impl PermissionGate for StaticPermissionGate {
    fn request(&self, capability: Capability) -> SensorFuture<'_, PermissionStatus> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        let status = self.status;
        Box::pin(async move {
            tracing::debug!(%capability, ?status, "Permission request answered");
            status
        })
    }
}
