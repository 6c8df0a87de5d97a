//! Target identities resolved by output sinks.

use serde::{Deserialize, Serialize};

/// Opaque identity of whatever lies under the pointer (a window, a page
/// element handle). The pipeline only compares identities, never
/// dereferences them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub u64);

impl std::fmt::Display for TargetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "target#{}", self.0)
    }
}
