//! Entry point for entity-state transitions.
//!
//! Every operation comes in two forms:
//!
//! - bare: the prior container is passed as `Option<EntityState>` and the next
//!   container is returned;
//! - embedded (`*_at`): the container lives inside a JSON `host` at address
//!   `at`. The container is decoded, the bare form applied, and the result
//!   written back into a new host.

use crate::config::StateConfig;
use crate::error::{Result, StateError};
use crate::path::{read_at, remove_at, write_at, Path};
use crate::state::EntityState;
use crate::types::{Lifecycle, Timestamp};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace, warn};

/// Stateless, configured set of entity-state transitions.
#[derive(Clone, Debug, Default)]
pub struct Transitions {
    config: StateConfig,
}

impl Transitions {
    pub fn new(config: StateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StateConfig {
        &self.config
    }

    // --- Lifecycle ---

    /// A fresh container.
    pub fn initialize(&self) -> EntityState {
        self.stamp(EntityState::new(), &[Lifecycle::Initialized])
    }

    /// `host` with a fresh container at `at`.
    pub fn initialize_at(&self, host: Value, at: &str) -> Result<Value> {
        let at = Path::parse(at)?;
        self.check_host(&host, false)?;
        debug!(at = %at, "initializing embedded entity state");
        embed(host, &at, &self.initialize())
    }

    /// Replace the canonical data, keeping only the prior container's staged
    /// edits.
    pub fn load(&self, data: Value, prior: Option<EntityState>) -> EntityState {
        let changes = prior.as_ref().map_or(0, |s| s.path_change.len());
        debug!(changes, "loading entity state");
        let state = prior.unwrap_or_default().load(data);
        self.stamp(state, &[Lifecycle::Initialized, Lifecycle::Loaded])
    }

    pub fn load_at(&self, data: Value, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| Ok(self.load(data, prior)))
    }

    /// Drop the container.
    pub fn clear(&self, state: Option<EntityState>) -> Option<EntityState> {
        if state.is_some() {
            debug!("clearing entity state");
        }
        None
    }

    /// `host` with `at` made undefined.
    pub fn clear_at(&self, host: Value, at: &str) -> Result<Value> {
        let at = Path::parse(at)?;
        self.check_host(&host, false)?;
        debug!(at = %at, "clearing embedded entity state");
        Ok(remove_at(host, &at))
    }

    /// Forget staged edits and path errors.
    pub fn clean(&self, state: Option<EntityState>) -> EntityState {
        let state = self.or_initialize(state);
        debug!(changes = state.path_change.len(), "cleaning entity state");
        state.clean()
    }

    pub fn clean_at(&self, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| Ok(self.clean(prior)))
    }

    // --- Per-path edits ---

    /// Write `value` into the canonical data at `path`.
    ///
    /// Fails with `InvalidArgument` when `path` is empty or malformed.
    pub fn set(&self, path: &str, value: Value, state: Option<EntityState>) -> Result<EntityState> {
        let path = Path::parse(path)?;
        trace!(path = %path, "setting data");
        let state = self.or_initialize(state).set(&path, value);
        Ok(self.stamp(state, &[Lifecycle::Changed]))
    }

    /// Embedded [`set`](Self::set). The host must be a mapping or a sequence.
    pub fn set_at(&self, path: &str, value: Value, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, true, |prior| self.set(path, value, prior))
    }

    /// Stage an unsaved edit at `path`.
    pub fn stage(&self, path: &str, value: Value, state: Option<EntityState>) -> Result<EntityState> {
        let path = Path::parse(path)?;
        trace!(path = %path, "staging edit");
        let state = self.or_initialize(state).stage(&path, value);
        Ok(self.stamp(state, &[Lifecycle::Changed]))
    }

    pub fn stage_at(&self, path: &str, value: Value, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| self.stage(path, value, prior))
    }

    /// Drop the staged edit at `path` and its remembered initial value.
    pub fn revert(&self, path: &str, state: Option<EntityState>) -> Result<EntityState> {
        let path = Path::parse(path)?;
        trace!(path = %path, "reverting edit");
        Ok(self.or_initialize(state).revert(&path))
    }

    pub fn revert_at(&self, path: &str, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| self.revert(path, prior))
    }

    /// Store a whole-record error payload as is.
    pub fn error(&self, payload: Value, state: Option<EntityState>) -> EntityState {
        trace!("recording error");
        self.or_initialize(state).with_error(payload)
    }

    pub fn error_at(&self, payload: Value, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| Ok(self.error(payload, prior)))
    }

    /// Store an error payload for `path` as is.
    pub fn path_error(
        &self,
        path: &str,
        payload: Value,
        state: Option<EntityState>,
    ) -> Result<EntityState> {
        let path = Path::parse(path)?;
        trace!(path = %path, "recording path error");
        Ok(self.or_initialize(state).with_path_error(&path, payload))
    }

    pub fn path_error_at(&self, path: &str, payload: Value, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| self.path_error(path, payload, prior))
    }

    // --- Composition ---

    /// Drop edits, initial values and errors at or under `prefix`.
    pub fn clean_path(&self, prefix: &str, state: EntityState) -> Result<EntityState> {
        let prefix = Path::parse(prefix)?;
        debug!(prefix = %prefix, "cleaning entity state sub-tree");
        Ok(state.clean_path(&prefix))
    }

    pub fn clean_path_at(&self, prefix: &str, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| {
            self.clean_path(prefix, self.or_initialize(prior))
        })
    }

    /// Re-root every path-scoped entry under `prefix`.
    pub fn indent(&self, prefix: &str, state: EntityState) -> Result<EntityState> {
        let prefix = Path::parse(prefix)?;
        debug!(prefix = %prefix, "indenting entity state");
        Ok(state.indent(&prefix))
    }

    pub fn indent_at(&self, prefix: &str, host: Value, at: &str) -> Result<Value> {
        self.update_at(host, at, false, |prior| {
            self.indent(prefix, self.or_initialize(prior))
        })
    }

    /// Canonical data with staged edits folded over it.
    pub fn data_with_changes(&self, state: &EntityState) -> Value {
        state.data_with_changes()
    }

    /// Decode the container at `at`; `None` when nothing (or `null`) is there.
    pub fn extract(&self, host: &Value, at: &str) -> Result<Option<EntityState>> {
        let at = Path::parse(at)?;
        decode(host, &at)
    }

    // --- Internals ---

    fn or_initialize(&self, state: Option<EntityState>) -> EntityState {
        state.unwrap_or_else(|| self.initialize())
    }

    fn stamp(&self, state: EntityState, events: &[Lifecycle]) -> EntityState {
        if !self.config.stamp_lifecycle {
            return state;
        }
        let now = Timestamp::now();
        events.iter().fold(state, |state, event| state.stamp(*event, now))
    }

    fn check_host(&self, host: &Value, strict: bool) -> Result<()> {
        if host.is_object() || host.is_array() {
            return Ok(());
        }
        if strict || self.config.strict_hosts {
            warn!("rejecting host that is neither a mapping nor a sequence");
            return Err(StateError::invalid_argument(
                "host must be a mapping or a sequence",
            ));
        }
        warn!("host is not a mapping or sequence; it will be replaced");
        Ok(())
    }

    fn update_at<F>(&self, host: Value, at: &str, strict: bool, apply: F) -> Result<Value>
    where
        F: FnOnce(Option<EntityState>) -> Result<EntityState>,
    {
        let at = Path::parse(at)?;
        self.check_host(&host, strict)?;
        let prior = decode(&host, &at)?;
        let next = apply(prior)?;
        embed(host, &at, &next)
    }
}

fn decode(host: &Value, at: &Path) -> Result<Option<EntityState>> {
    match read_at(host, at) {
        None | Some(Value::Null) => Ok(None),
        Some(value @ Value::Object(_)) => EntityState::deserialize(value)
            .map(Some)
            .map_err(|e| StateError::Decode {
                at: at.to_string(),
                reason: e.to_string(),
            }),
        Some(_) => Err(StateError::Decode {
            at: at.to_string(),
            reason: "expected a mapping".to_string(),
        }),
    }
}

fn embed(host: Value, at: &Path, state: &EntityState) -> Result<Value> {
    let encoded = serde_json::to_value(state)?;
    Ok(write_at(host, at, encoded))
}
