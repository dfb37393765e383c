//! DOM Swap Engine.
//!
//! Applies fetched content to the live page: replaces the content region's
//! subtree, updates the document title, and manages the scroll position.
//! The browser implementation sits behind the [`HostPage`] trait so the
//! pipeline can run against a fake page in native tests.

use serde::{Deserialize, Serialize};

/// A window scroll offset in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
	/// Horizontal offset.
	pub x: f64,
	/// Vertical offset.
	pub y: f64,
}

impl ScrollPosition {
	/// Top of the page.
	pub const TOP: Self = Self { x: 0.0, y: 0.0 };

	/// Creates a scroll offset.
	pub fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// Boundary to the live page.
///
/// The swap sequence must not fail: malformed content is handled upstream
/// as a fetch failure and whatever arrives here is injected verbatim.
pub trait HostPage {
	/// Replaces the content region's subtree with `html`.
	fn swap_content(&self, html: &str);

	/// Sets the document title.
	fn set_title(&self, title: &str);

	/// Reads the current window scroll offset.
	fn scroll_position(&self) -> ScrollPosition;

	/// Scrolls the window to the given offset.
	fn scroll_to(&self, position: ScrollPosition);

	/// Forces a real browser navigation to `path`.
	///
	/// This is the fallback exit out of the SPA pipeline; in the browser it
	/// assigns `location.href` and the page unloads.
	fn navigate_native(&self, path: &str);
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod browser {
	use web_sys::Element;

	use super::{HostPage, ScrollPosition};
	use crate::error_log;

	/// [`HostPage`] backed by the real document.
	#[derive(Debug)]
	pub struct BrowserPage {
		content_region: Element,
	}

	impl BrowserPage {
		/// Wraps the designated content-region element.
		pub fn new(content_region: Element) -> Self {
			Self { content_region }
		}

		fn window() -> Option<web_sys::Window> {
			web_sys::window()
		}
	}

	impl HostPage for BrowserPage {
		fn swap_content(&self, html: &str) {
			self.content_region.set_inner_html(html);
		}

		fn set_title(&self, title: &str) {
			if let Some(document) = Self::window().and_then(|w| w.document()) {
				document.set_title(title);
			}
		}

		fn scroll_position(&self) -> ScrollPosition {
			match Self::window() {
				Some(window) => ScrollPosition::new(
					window.page_x_offset().unwrap_or(0.0),
					window.page_y_offset().unwrap_or(0.0),
				),
				None => ScrollPosition::TOP,
			}
		}

		fn scroll_to(&self, position: ScrollPosition) {
			if let Some(window) = Self::window() {
				window.scroll_to_with_x_and_y(position.x, position.y);
			}
		}

		fn navigate_native(&self, path: &str) {
			let Some(window) = Self::window() else { return };
			if let Err(err) = window.location().set_href(path) {
				error_log!("Native fallback navigation to '{}' failed: {:?}", path, err);
			}
		}
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use browser::BrowserPage;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_scroll_position_top() {
		assert_eq!(ScrollPosition::TOP, ScrollPosition::new(0.0, 0.0));
		assert_eq!(ScrollPosition::default(), ScrollPosition::TOP);
	}

	#[test]
	fn test_scroll_position_serde() {
		let position = ScrollPosition::new(12.0, 340.5);
		let json = serde_json::to_string(&position).unwrap();
		assert_eq!(json, r#"{"x":12.0,"y":340.5}"#);
		assert_eq!(
			serde_json::from_str::<ScrollPosition>(&json).unwrap(),
			position
		);
	}
}
