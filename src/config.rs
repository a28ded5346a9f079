//! Transition configuration.

/// Configuration for [`Transitions`](crate::Transitions).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StateConfig {
    /// Record `initialized_at`, `loaded_at` and `changed_at` from the wall
    /// clock. Off by default, so transitions stay deterministic values.
    pub stamp_lifecycle: bool,

    /// Reject hosts that are neither a mapping nor a sequence in every
    /// embedded operation. `set_at` always rejects them.
    pub strict_hosts: bool,
}

impl StateConfig {
    /// Turn lifecycle timestamps on or off.
    pub fn with_stamp_lifecycle(mut self, enabled: bool) -> Self {
        self.stamp_lifecycle = enabled;
        self
    }

    /// Turn strict host checking on or off.
    pub fn with_strict_hosts(mut self, enabled: bool) -> Self {
        self.strict_hosts = enabled;
        self
    }
}
