//! The entity-state container and its per-record transitions.

use crate::path::{read_at, write_at, Path};
use crate::types::{Lifecycle, Mode, Timestamp};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Path-scoped bookkeeping, keyed by canonical address.
///
/// Entries keep the order in which their address was first inserted;
/// re-inserting an address keeps its position.
pub type PathMap<V> = IndexMap<String, V>;

/// A record plus everything currently happening to it.
///
/// Transitions consume the container and return the next one; nothing is
/// changed in place. The serde form uses camelCase keys so a container can
/// live inside a JSON host structure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EntityState {
    /// Last loaded canonical snapshot.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub data: Option<Value>,

    /// Unsaved edits.
    pub path_change: PathMap<Value>,

    /// Value of each address when first staged this session.
    /// `None` means nothing was there.
    pub path_initial: PathMap<Option<Value>>,

    /// Address-scoped error payloads.
    pub path_error: PathMap<Value>,

    /// Address-scoped view modes.
    pub path_mode: PathMap<Mode>,

    /// Address-scoped load-in-flight markers.
    pub path_loading: PathMap<bool>,

    /// Address-scoped save-in-flight markers.
    pub path_updating: PathMap<bool>,

    /// Whole-record error payload.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "present")]
    pub error: Option<Value>,

    /// Whole-record view mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,

    /// Whole-record load in flight.
    pub loading: bool,

    /// Whole-record save in flight.
    pub updating: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub initialized_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub changed_at: Option<Timestamp>,

    /// Other keys stored next to the container in a host, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A field that is present deserializes to `Some`, even when it is `null`.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl EntityState {
    /// A fresh container: no data, empty path maps, no flags.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the canonical data.
    ///
    /// Everything except unsaved edits starts over: errors, modes, flags,
    /// remembered initial values and timestamps are dropped.
    pub fn load(self, data: Value) -> Self {
        Self {
            data: Some(data),
            path_change: self.path_change,
            ..Self::new()
        }
    }

    /// Write `value` straight into the canonical data at `path`.
    pub fn set(mut self, path: &Path, value: Value) -> Self {
        let data = self.data.take().unwrap_or(Value::Null);
        self.data = Some(write_at(data, path, value));
        self
    }

    /// Record an unsaved edit at `path`.
    ///
    /// The first stage of an address in a session remembers the value the
    /// data held there; later stages only replace the edit.
    pub fn stage(mut self, path: &Path, value: Value) -> Self {
        let key = path.to_string();
        if !self.path_initial.contains_key(&key) {
            let initial = self
                .data
                .as_ref()
                .and_then(|data| read_at(data, path))
                .cloned();
            self.path_initial.insert(key.clone(), initial);
        }
        self.path_change.insert(key, value);
        self
    }

    /// Drop the staged edit at `path` together with its remembered initial value.
    pub fn revert(mut self, path: &Path) -> Self {
        let key = path.to_string();
        self.path_change.shift_remove(&key);
        self.path_initial.shift_remove(&key);
        self
    }

    /// Set the whole-record error payload.
    pub fn with_error(mut self, payload: Value) -> Self {
        self.error = Some(payload);
        self
    }

    /// Set the error payload for `path`.
    pub fn with_path_error(mut self, path: &Path, payload: Value) -> Self {
        self.path_error.insert(path.to_string(), payload);
        self
    }

    /// Forget staged edits and path errors; data and everything else stay.
    pub fn clean(mut self) -> Self {
        self.path_change.clear();
        self.path_error.clear();
        self
    }

    pub fn with_mode(mut self, mode: Option<Mode>) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    pub fn with_updating(mut self, updating: bool) -> Self {
        self.updating = updating;
        self
    }

    /// Set or remove (`None`) the view mode for `path`.
    pub fn with_path_mode(mut self, path: &Path, mode: Option<Mode>) -> Self {
        let key = path.to_string();
        match mode {
            Some(mode) => self.path_mode.insert(key, mode),
            None => self.path_mode.shift_remove(&key),
        };
        self
    }

    /// Mark or unmark (`false` removes the entry) a load in flight for `path`.
    pub fn with_path_loading(mut self, path: &Path, loading: bool) -> Self {
        toggle(&mut self.path_loading, path, loading);
        self
    }

    /// Mark or unmark (`false` removes the entry) a save in flight for `path`.
    pub fn with_path_updating(mut self, path: &Path, updating: bool) -> Self {
        toggle(&mut self.path_updating, path, updating);
        self
    }

    /// Record a lifecycle timestamp.
    pub fn stamp(mut self, event: Lifecycle, at: Timestamp) -> Self {
        match event {
            Lifecycle::Initialized => self.initialized_at = Some(at),
            Lifecycle::Loaded => self.loaded_at = Some(at),
            Lifecycle::Changed => self.changed_at = Some(at),
        }
        self
    }

    /// Whether any edit is staged.
    pub fn is_dirty(&self) -> bool {
        !self.path_change.is_empty()
    }

    /// Whether an edit is staged at exactly `path`.
    pub fn is_changed(&self, path: &Path) -> bool {
        self.path_change.contains_key(&path.to_string())
    }

    /// The staged edit at `path`.
    pub fn change(&self, path: &Path) -> Option<&Value> {
        self.path_change.get(&path.to_string())
    }

    /// The value `path` held when it was first staged.
    pub fn initial_value(&self, path: &Path) -> Option<&Value> {
        self.path_initial
            .get(&path.to_string())
            .and_then(Option::as_ref)
    }

    /// Whether any load or save is in flight, for the record or any address.
    pub fn is_busy(&self) -> bool {
        self.loading
            || self.updating
            || self.path_loading.values().any(|v| *v)
            || self.path_updating.values().any(|v| *v)
    }
}

fn toggle(map: &mut PathMap<bool>, path: &Path, on: bool) {
    let key = path.to_string();
    if on {
        map.insert(key, true);
    } else {
        map.shift_remove(&key);
    }
}
