//! Manifest Store.
//!
//! Holds the parsed route manifest after its one-time load and exposes
//! read-only lookup by exact route path. The store is immutable for the
//! lifetime of the page; an empty store is valid and means interception
//! degrades to "never intercept".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ManifestError;

/// A single manifest entry: where to fetch the content fragment for a
/// route and, optionally, the document title to apply after a swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteEntry {
	/// URL of the content fragment for this route.
	pub content_ref: String,
	/// Document title applied after a successful swap.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub title: Option<String>,
}

impl RouteEntry {
	/// Creates an entry without a title.
	pub fn new(content_ref: impl Into<String>) -> Self {
		Self {
			content_ref: content_ref.into(),
			title: None,
		}
	}

	/// Sets the document title for this entry.
	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = Some(title.into());
		self
	}
}

/// Immutable mapping from route path to [`RouteEntry`].
#[derive(Debug, Clone, Default)]
pub struct ManifestStore {
	routes: HashMap<String, RouteEntry>,
}

impl ManifestStore {
	/// Creates an empty store.
	pub fn empty() -> Self {
		Self::default()
	}

	/// Parses a manifest from its JSON wire format.
	///
	/// The wire format maps route paths to camelCase entries:
	///
	/// ```json
	/// { "/about": { "contentRef": "/frag/about.html", "title": "About" } }
	/// ```
	pub fn from_json(json: &str) -> Result<Self, ManifestError> {
		let routes: HashMap<String, RouteEntry> = serde_json::from_str(json)?;
		Ok(Self { routes })
	}

	/// Builds a store from already-parsed entries.
	pub fn from_entries(entries: impl IntoIterator<Item = (String, RouteEntry)>) -> Self {
		Self {
			routes: entries.into_iter().collect(),
		}
	}

	/// Looks up the entry for an exact route path.
	pub fn get(&self, path: &str) -> Option<&RouteEntry> {
		self.routes.get(path)
	}

	/// Returns true if the exact route path is in the manifest.
	pub fn contains(&self, path: &str) -> bool {
		self.routes.contains_key(path)
	}

	/// Returns the number of routes.
	pub fn len(&self) -> usize {
		self.routes.len()
	}

	/// Returns true if the store holds no routes.
	pub fn is_empty(&self) -> bool {
		self.routes.is_empty()
	}
}
