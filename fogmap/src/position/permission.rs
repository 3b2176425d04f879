//! Location permission capability.

use crate::BoxFuture;

/// Grants or denies access to the location sensor.
///
/// Implementations typically show a platform prompt; the adapter awaits a
/// single yes/no answer on every activation.
pub trait PermissionGate: Send + Sync {
    fn request(&self) -> BoxFuture<'_, bool>;
}

/// A permission gate with a fixed answer.
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission {
    granted: bool,
}

impl StaticPermission {
    pub fn granted() -> Self {
        Self { granted: true }
    }

    pub fn denied() -> Self {
        Self { granted: false }
    }
}

impl PermissionGate for StaticPermission {
    fn request(&self) -> BoxFuture<'_, bool> {
        let granted = self.granted;
        Box::pin(async move { granted })
    }
}
