//! Browser-boundary smoke tests, run with `wasm-pack test --headless`.

#![cfg(all(target_family = "wasm", target_os = "unknown"))]

use wasm_bindgen_test::*;

use fragment_nav::{
	BrowserHistory, BrowserPage, HistoryBackend, HistoryEntry, HostPage, ScrollPosition,
	describe_click,
};

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn test_browser_history_state_round_trip() {
	let history = BrowserHistory::new();
	let entry = HistoryEntry::new("/about").with_scroll(ScrollPosition::new(0.0, 120.0));

	history.replace(&entry);

	assert_eq!(history.current(), Some(entry));
	assert_eq!(history.current_path(), "/about");
}

#[wasm_bindgen_test]
fn test_browser_page_swaps_content_region() {
	let document = web_sys::window().unwrap().document().unwrap();
	let region = document.create_element("main").unwrap();
	let page = BrowserPage::new(region.clone());

	page.swap_content("<h1>Hello</h1>");

	assert_eq!(region.inner_html(), "<h1>Hello</h1>");
}

#[wasm_bindgen_test]
fn test_describe_click_without_anchor() {
	let event = web_sys::MouseEvent::new("click").unwrap();
	let descriptor = describe_click(&event);

	assert!(descriptor.anchor.is_none());
	assert!(descriptor.primary_button);
	assert!(!descriptor.modifier);
}
