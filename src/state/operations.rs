//! Composition of path-scoped bookkeeping.
//!
//! Merging staged edits over canonical data, discarding bookkeeping for a
//! sub-tree, and re-rooting bookkeeping under a prefix.

use super::container::{EntityState, PathMap};
use crate::path::{read_at, write_at, Path};
use serde_json::{Map, Value};

/// Fold staged edits over `data`, in the order they were first staged.
///
/// Later writes to the same or an overlapping address win.
pub fn apply_changes(data: Value, changes: &PathMap<Value>) -> Value {
    changes.iter().fold(data, |data, (key, value)| match Path::parse(key) {
        Ok(path) => write_at(data, &path, value.clone()),
        Err(e) => {
            tracing::warn!(address = %key, error = %e, "skipping staged edit with malformed address");
            data
        }
    })
}

/// Whether `key` addresses `prefix` or something beneath it.
fn is_under(key: &str, prefix: &Path) -> bool {
    match Path::parse(key) {
        Ok(path) => path.starts_with(prefix),
        Err(_) => key.starts_with(&prefix.to_string()),
    }
}

fn indented(key: String, prefix: &Path) -> String {
    match Path::parse(&key) {
        Ok(path) => prefix.join(&path).to_string(),
        Err(_) => format!("{}.{}", prefix, key),
    }
}

fn rekey<V>(map: PathMap<V>, prefix: &Path) -> PathMap<V> {
    map.into_iter()
        .map(|(key, value)| (indented(key, prefix), value))
        .collect()
}

impl EntityState {
    /// Drop edits, initial values and errors at or under `prefix`.
    ///
    /// Matching is by whole segments: `company` covers `company.location`
    /// and `company[0]`, `comp` covers neither.
    pub fn clean_path(mut self, prefix: &Path) -> Self {
        self.path_error.retain(|key, _| !is_under(key, prefix));
        self.path_change.retain(|key, _| !is_under(key, prefix));
        self.path_initial.retain(|key, _| !is_under(key, prefix));
        self
    }

    /// Re-root every path-scoped entry under `prefix`.
    ///
    /// Used before the record's bookkeeping is merged into a larger structure
    /// that holds this record at `prefix`.
    pub fn indent(self, prefix: &Path) -> Self {
        Self {
            path_change: rekey(self.path_change, prefix),
            path_initial: rekey(self.path_initial, prefix),
            path_error: rekey(self.path_error, prefix),
            path_mode: rekey(self.path_mode, prefix),
            path_loading: rekey(self.path_loading, prefix),
            path_updating: rekey(self.path_updating, prefix),
            ..self
        }
    }

    /// Canonical data with staged edits folded over it.
    ///
    /// Missing data starts from an empty mapping; `null` data is returned as
    /// is. The container itself is left untouched.
    pub fn data_with_changes(&self) -> Value {
        match &self.data {
            Some(Value::Null) => Value::Null,
            data => {
                let base = data.clone().unwrap_or_else(|| Value::Object(Map::new()));
                apply_changes(base, &self.path_change)
            }
        }
    }

    /// The value currently shown at `path`, staged edits included.
    pub fn value_at(&self, path: &Path) -> Option<Value> {
        read_at(&self.data_with_changes(), path).cloned()
    }
}
