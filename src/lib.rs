//! # Entity State
//!
//! Immutable containers for "a record plus everything currently happening to
//! it": canonical data, unsaved edits, errors, view modes and in-flight
//! markers, all addressed by path into the record.
//!
//! ## Core Concepts
//!
//! - **Addresses**: dotted paths such as `company.location` or `items[0].name`
//! - **Containers**: [`EntityState`], replaced rather than mutated by every transition
//! - **Embedding**: a container can live at an address inside a larger JSON structure
//! - **Staged edits**: changes kept beside the data until they are saved
//!
//! ## Example
//!
//! ```
//! use entity_state::Transitions;
//! use serde_json::json;
//!
//! let t = Transitions::default();
//!
//! let user = t.load(json!({"id": 1, "email": "old@example.com"}), None);
//! let user = t.stage("email", json!("new@example.com"), Some(user))?;
//!
//! assert_eq!(t.data_with_changes(&user)["email"], "new@example.com");
//! assert_eq!(user.data.as_ref().unwrap()["email"], "old@example.com");
//!
//! // The same container embedded in a larger structure
//! let page = t.load_at(json!({"id": 1}), json!({"title": "Profile"}), "activeUser")?;
//! let page = t.stage_at("email", json!("x@example.com"), page, "activeUser")?;
//! assert_eq!(page["activeUser"]["pathChange"]["email"], "x@example.com");
//! # Ok::<(), entity_state::StateError>(())
//! ```

pub mod config;
pub mod error;
pub mod path;
pub mod state;
pub mod transitions;
pub mod types;

// Re-exports
pub use config::StateConfig;
pub use error::{Result, StateError};
pub use path::{read_at, remove_at, write_at, Path, Seg};
pub use state::{apply_changes, EntityState, PathMap};
pub use transitions::Transitions;
pub use types::{Lifecycle, Mode, Timestamp};
