//! Bootstrap.
//!
//! Loads the route manifest, wires the browser boundaries into a
//! [`Navigator`](crate::navigator::Navigator), and installs the click and
//! popstate listeners. If the manifest cannot be loaded the site degrades to
//! plain navigation: no listener is installed and every link keeps its
//! native behavior.

/// Bootstrap configuration.
///
/// The defaults match a generated static site: the manifest at
/// `/contents.json`, interception delegated from `body`, content swapped
/// inside `main`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
	/// URL the route manifest is fetched from.
	pub manifest_url: String,
	/// Selector of the element the click listener is delegated from.
	pub root_selector: String,
	/// Selector of the content region that swaps receive.
	pub content_selector: String,
}

impl Default for LaunchOptions {
	fn default() -> Self {
		Self {
			manifest_url: "/contents.json".to_string(),
			root_selector: "body".to_string(),
			content_selector: "main".to_string(),
		}
	}
}

impl LaunchOptions {
	/// Creates the default options.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the manifest URL.
	pub fn manifest_url(mut self, url: impl Into<String>) -> Self {
		self.manifest_url = url.into();
		self
	}

	/// Sets the interception root selector.
	pub fn root_selector(mut self, selector: impl Into<String>) -> Self {
		self.root_selector = selector.into();
		self
	}

	/// Sets the content-region selector.
	pub fn content_selector(mut self, selector: impl Into<String>) -> Self {
		self.content_selector = selector.into();
		self
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod wasm {
	use std::rc::Rc;

	use web_sys::Element;

	use super::LaunchOptions;
	use crate::error::LaunchError;
	use crate::fetch::HttpContentSource;
	use crate::history::{BrowserHistory, HistoryBackend, HistoryEntry, attach_popstate_listener};
	use crate::intercept::attach_click_interceptor;
	use crate::manifest::ManifestStore;
	use crate::navigator::Navigator;
	use crate::swap::BrowserPage;
	use crate::{error_log, info_log};

	/// The navigator wired to the real browser boundaries.
	pub type BrowserNavigator = Navigator<BrowserPage, BrowserHistory, HttpContentSource>;

	async fn load_manifest(url: &str) -> Option<ManifestStore> {
		let body = match reqwest::get(url).await {
			Ok(response) => match response.error_for_status() {
				Ok(response) => response.text().await,
				Err(err) => Err(err),
			},
			Err(err) => Err(err),
		};
		let body = match body {
			Ok(body) => body,
			Err(err) => {
				error_log!("Manifest request to '{}' failed: {}", url, err);
				return None;
			}
		};
		match ManifestStore::from_json(&body) {
			Ok(store) => Some(store),
			Err(err) => {
				error_log!("Manifest at '{}' rejected: {}", url, err);
				None
			}
		}
	}

	fn query(document: &web_sys::Document, selector: &str) -> Result<Element, LaunchError> {
		document
			.query_selector(selector)
			.map_err(|err| LaunchError::Dom(format!("{err:?}")))?
			.ok_or_else(|| LaunchError::MissingElement(selector.to_string()))
	}

	/// Boots navigation interception for the current page.
	///
	/// Returns `Ok(None)` when the manifest could not be loaded; the page
	/// then keeps fully native navigation. Errors are wiring failures only
	/// (missing elements, DOM setup), which also leave native navigation
	/// intact.
	pub async fn launch(options: LaunchOptions) -> Result<Option<Rc<BrowserNavigator>>, LaunchError> {
		#[cfg(feature = "console_error_panic_hook")]
		console_error_panic_hook::set_once();

		let Some(store) = load_manifest(&options.manifest_url).await else {
			return Ok(None);
		};

		let document = web_sys::window()
			.and_then(|w| w.document())
			.ok_or_else(|| LaunchError::Dom("no document available".to_string()))?;
		let root = query(&document, &options.root_selector)?;
		let content_region = query(&document, &options.content_selector)?;

		let history = BrowserHistory::new();
		// Give the landing page an entry of our own so popping back to it
		// restores state like any intercepted navigation.
		history.replace(&HistoryEntry::new(history.current_path()));

		let route_count = store.len();
		let navigator = Rc::new(Navigator::new(
			Rc::new(store),
			HttpContentSource::new(),
			BrowserPage::new(content_region),
			history,
		));

		attach_click_interceptor(root.as_ref(), Rc::clone(&navigator))
			.map_err(|err| LaunchError::Dom(format!("{err:?}")))?;

		let pop_navigator = Rc::clone(&navigator);
		attach_popstate_listener(move |entry| {
			let navigator = Rc::clone(&pop_navigator);
			wasm_bindgen_futures::spawn_local(async move {
				navigator.handle_pop(entry).await;
			});
		})
		.map_err(|err| LaunchError::Dom(format!("{err:?}")))?;

		info_log!("Navigation interception active for {} routes", route_count);
		Ok(Some(navigator))
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use wasm::{BrowserNavigator, launch};
