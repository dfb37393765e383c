//! History Synchronizer boundary.
//!
//! Reads and writes browser session-history entries and surfaces popstate
//! transitions. [`HistoryEntry`] values ride in the history state as JSON
//! so back/forward navigation can restore scroll positions.

use serde::{Deserialize, Serialize};

use crate::swap::ScrollPosition;

/// State recorded in the session history for every intercepted navigation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
	/// Route path of the entry.
	pub path: String,
	/// Window scroll offset recorded for this entry.
	#[serde(default)]
	pub scroll: ScrollPosition,
}

impl HistoryEntry {
	/// Creates an entry positioned at the top of the page.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			scroll: ScrollPosition::TOP,
		}
	}

	/// Sets the recorded scroll offset.
	pub fn with_scroll(mut self, scroll: ScrollPosition) -> Self {
		self.scroll = scroll;
		self
	}

	/// Serializes the entry for storage in the history state.
	pub fn to_state(&self) -> String {
		serde_json::to_string(self).unwrap_or_default()
	}

	/// Reads an entry back from a history state string.
	///
	/// Returns `None` for state this crate did not write (foreign
	/// pushState calls, initial load without a replace).
	pub fn from_state(state: &str) -> Option<Self> {
		serde_json::from_str(state).ok()
	}
}

/// Boundary to the platform history stack.
///
/// These are the only mutations the pipeline makes outside its own data
/// structures and the content region.
pub trait HistoryBackend {
	/// Pushes a new entry onto the session history.
	fn push(&self, entry: &HistoryEntry);

	/// Replaces the entry at the current history position in place.
	fn replace(&self, entry: &HistoryEntry);

	/// Reads the entry stored at the current history position, if any.
	fn current(&self) -> Option<HistoryEntry>;

	/// Returns the path of the current location.
	fn current_path(&self) -> String;
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod browser {
	use wasm_bindgen::JsCast;
	use wasm_bindgen::JsValue;
	use wasm_bindgen::closure::Closure;

	use super::{HistoryBackend, HistoryEntry};
	use crate::warn_log;

	/// [`HistoryBackend`] backed by `window.history`.
	#[derive(Debug, Clone, Copy, Default)]
	pub struct BrowserHistory;

	impl BrowserHistory {
		/// Creates the backend.
		pub fn new() -> Self {
			Self
		}

		fn history() -> Option<web_sys::History> {
			web_sys::window().and_then(|w| w.history().ok())
		}
	}

	impl HistoryBackend for BrowserHistory {
		fn push(&self, entry: &HistoryEntry) {
			let Some(history) = Self::history() else { return };
			let state = JsValue::from_str(&entry.to_state());
			if let Err(err) = history.push_state_with_url(&state, "", Some(&entry.path)) {
				warn_log!("history.pushState for '{}' failed: {:?}", entry.path, err);
			}
		}

		fn replace(&self, entry: &HistoryEntry) {
			let Some(history) = Self::history() else { return };
			let state = JsValue::from_str(&entry.to_state());
			if let Err(err) = history.replace_state_with_url(&state, "", Some(&entry.path)) {
				warn_log!("history.replaceState for '{}' failed: {:?}", entry.path, err);
			}
		}

		fn current(&self) -> Option<HistoryEntry> {
			let state = Self::history()?.state().ok()?;
			HistoryEntry::from_state(&state.as_string()?)
		}

		fn current_path(&self) -> String {
			web_sys::window()
				.and_then(|w| w.location().pathname().ok())
				.unwrap_or_else(|| "/".to_string())
		}
	}

	/// Attaches a `popstate` listener on the window.
	///
	/// The callback receives the deserialized [`HistoryEntry`] carried by
	/// the popped position, or `None` when the position has no usable state.
	/// The listener closure is kept alive with `forget` for the lifetime of
	/// the page.
	pub fn attach_popstate_listener<F>(callback: F) -> Result<(), JsValue>
	where
		F: Fn(Option<HistoryEntry>) + 'static,
	{
		let window =
			web_sys::window().ok_or_else(|| JsValue::from_str("no window available"))?;

		let closure = Closure::<dyn FnMut(web_sys::PopStateEvent)>::new(
			move |event: web_sys::PopStateEvent| {
				let entry = event
					.state()
					.as_string()
					.and_then(|raw| HistoryEntry::from_state(&raw));
				callback(entry);
			},
		);
		window.add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref())?;
		closure.forget();
		Ok(())
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use browser::{BrowserHistory, attach_popstate_listener};

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_entry_state_round_trip() {
		let entry = HistoryEntry::new("/about").with_scroll(ScrollPosition::new(0.0, 480.0));
		let state = entry.to_state();
		assert_eq!(HistoryEntry::from_state(&state), Some(entry));
	}

	#[test]
	fn test_entry_scroll_defaults_to_top() {
		let entry = HistoryEntry::from_state(r#"{"path":"/docs"}"#).unwrap();
		assert_eq!(entry.path, "/docs");
		assert_eq!(entry.scroll, ScrollPosition::TOP);
	}

	#[test]
	fn test_foreign_state_is_rejected() {
		assert_eq!(HistoryEntry::from_state("42"), None);
		assert_eq!(HistoryEntry::from_state("{\"other\":true}"), None);
		assert_eq!(HistoryEntry::from_state(""), None);
	}
}
