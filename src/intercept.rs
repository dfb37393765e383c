//! Navigation Interceptor.
//!
//! Classifies click events into navigation intents. The decision logic is a
//! pure function over a [`ClickDescriptor`] so it can be exercised without
//! a browser; the WASM glue builds descriptors from live mouse events and
//! installs the single delegated listener.

use crate::manifest::ManifestStore;

/// Where a navigation intent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOrigin {
	/// An intercepted in-app link click.
	Click,
	/// A browser back/forward transition.
	Popstate,
	/// A programmatic call into the navigator.
	Programmatic,
}

/// A navigation request, created per event and consumed synchronously.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
	/// Route path to navigate to.
	pub target_path: String,
	/// What produced the intent.
	pub origin: NavigationOrigin,
}

impl NavigationIntent {
	/// Creates an intent.
	pub fn new(target_path: impl Into<String>, origin: NavigationOrigin) -> Self {
		Self {
			target_path: target_path.into(),
			origin,
		}
	}
}

/// Resolved target of the anchor nearest to a click.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTarget {
	/// Origin of the resolved URL (`scheme://host[:port]`).
	pub origin: String,
	/// Path component of the resolved URL.
	pub path: String,
	/// Fragment identifier including the leading `#`, or empty.
	pub hash: String,
}

impl AnchorTarget {
	/// Creates a resolved anchor target without a fragment.
	pub fn new(origin: impl Into<String>, path: impl Into<String>) -> Self {
		Self {
			origin: origin.into(),
			path: path.into(),
			hash: String::new(),
		}
	}

	/// Sets the fragment identifier.
	pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
		self.hash = hash.into();
		self
	}
}

/// Everything the classifier needs to know about one click event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickDescriptor {
	/// Resolved target of the nearest ancestor anchor, if the click hit one.
	pub anchor: Option<AnchorTarget>,
	/// Origin of the current page.
	pub page_origin: String,
	/// Path of the current location.
	pub current_path: String,
	/// The anchor carries a non-self `target` attribute.
	pub opens_new_context: bool,
	/// The anchor carries a `download` attribute.
	pub download: bool,
	/// The click used the primary button.
	pub primary_button: bool,
	/// Ctrl/Meta/Shift/Alt was held during the click.
	pub modifier: bool,
	/// An earlier handler already prevented the default action.
	pub default_prevented: bool,
}

impl ClickDescriptor {
	/// Creates a descriptor for a plain primary-button click that hit no
	/// anchor; the glue (or a test) fills in the rest.
	pub fn new(page_origin: impl Into<String>, current_path: impl Into<String>) -> Self {
		Self {
			anchor: None,
			page_origin: page_origin.into(),
			current_path: current_path.into(),
			opens_new_context: false,
			download: false,
			primary_button: true,
			modifier: false,
			default_prevented: false,
		}
	}

	/// Sets the resolved anchor target.
	pub fn with_anchor(mut self, anchor: AnchorTarget) -> Self {
		self.anchor = Some(anchor);
		self
	}
}

/// Classifies a click as interceptable or not.
///
/// Returns the [`NavigationIntent`] to run when every interception
/// condition holds; `None` means the browser keeps the click. Native
/// handling is the universal fallback, not an error path, so an empty
/// store simply never intercepts.
pub fn classify(click: &ClickDescriptor, store: &ManifestStore) -> Option<NavigationIntent> {
	let anchor = click.anchor.as_ref()?;

	if !click.primary_button || click.modifier || click.default_prevented {
		return None;
	}
	if click.opens_new_context || click.download {
		return None;
	}
	if anchor.origin != click.page_origin {
		return None;
	}
	// In-page fragment jumps stay with the browser.
	if !anchor.hash.is_empty() && anchor.path == click.current_path {
		return None;
	}
	if !store.contains(&anchor.path) {
		return None;
	}

	Some(NavigationIntent::new(
		anchor.path.clone(),
		NavigationOrigin::Click,
	))
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod listener {
	use std::rc::Rc;

	use wasm_bindgen::JsCast;
	use wasm_bindgen::JsValue;
	use wasm_bindgen::closure::Closure;
	use web_sys::{Element, HtmlAnchorElement, MouseEvent, Url};

	use super::{AnchorTarget, ClickDescriptor, classify};
	use crate::fetch::ContentSource;
	use crate::history::HistoryBackend;
	use crate::navigator::Navigator;
	use crate::swap::HostPage;

	/// Builds a [`ClickDescriptor`] from a live mouse event.
	pub fn describe_click(event: &MouseEvent) -> ClickDescriptor {
		let (page_origin, current_path) = match web_sys::window() {
			Some(window) => {
				let location = window.location();
				(
					location.origin().unwrap_or_default(),
					location.pathname().unwrap_or_else(|_| "/".to_string()),
				)
			}
			None => (String::new(), "/".to_string()),
		};

		let mut descriptor = ClickDescriptor::new(page_origin, current_path);
		descriptor.primary_button = event.button() == 0;
		descriptor.modifier =
			event.ctrl_key() || event.meta_key() || event.shift_key() || event.alt_key();
		descriptor.default_prevented = event.default_prevented();

		let anchor = event
			.target()
			.and_then(|target| target.dyn_into::<Element>().ok())
			.and_then(|element| element.closest("a[href]").ok().flatten())
			.and_then(|element| element.dyn_into::<HtmlAnchorElement>().ok());

		if let Some(anchor) = anchor {
			let target_attr = anchor.target();
			descriptor.opens_new_context = !target_attr.is_empty() && target_attr != "_self";
			descriptor.download = anchor.has_attribute("download");
			// href() is already resolved against the document base.
			if let Ok(url) = Url::new(&anchor.href()) {
				descriptor.anchor = Some(AnchorTarget {
					origin: url.origin(),
					path: url.pathname(),
					hash: url.hash(),
				});
			}
		}

		descriptor
	}

	/// Attaches the single delegated capturing click listener to `root`.
	///
	/// Interceptable clicks get their default suppressed and are handed to
	/// the navigator; everything else is left untouched for the browser.
	/// The listener closure is kept alive with `forget` for the lifetime of
	/// the page.
	pub fn attach_click_interceptor<P, H, S>(
		root: &web_sys::EventTarget,
		navigator: Rc<Navigator<P, H, S>>,
	) -> Result<(), JsValue>
	where
		P: HostPage + 'static,
		H: HistoryBackend + 'static,
		S: ContentSource + 'static,
	{
		let closure = Closure::<dyn FnMut(MouseEvent)>::new(move |event: MouseEvent| {
			let descriptor = describe_click(&event);
			if let Some(intent) = classify(&descriptor, navigator.store()) {
				event.prevent_default();
				let navigator = Rc::clone(&navigator);
				wasm_bindgen_futures::spawn_local(async move {
					navigator.navigate(intent).await;
				});
			}
		});
		root.add_event_listener_with_callback_and_bool(
			"click",
			closure.as_ref().unchecked_ref(),
			true,
		)?;
		closure.forget();
		Ok(())
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use listener::{attach_click_interceptor, describe_click};
