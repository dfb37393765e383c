//! Navigation state machine.
//!
//! Drives every navigation intent through the fetch/swap pipeline and
//! keeps the browser history in step:
//!
//! ```text
//! IDLE -> INTERCEPTED -> FETCHING -> { APPLIED -> IDLE | FALLBACK }
//! ```
//!
//! `FALLBACK` leaves the SPA pipeline entirely: the page performs a native
//! navigation and never returns to `IDLE` in-page. A superseded navigation
//! touches neither the DOM nor the history; the newest intent owns the
//! pipeline (last-intent-wins).

use std::cell::Cell;
use std::rc::Rc;

use crate::fetch::{ContentFetcher, ContentResult, ContentSource, InFlightRequest};
use crate::history::{HistoryBackend, HistoryEntry};
use crate::intercept::{NavigationIntent, NavigationOrigin};
use crate::manifest::ManifestStore;
use crate::swap::{HostPage, ScrollPosition};
use crate::warn_log;

/// Phase of the navigation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavPhase {
	/// No navigation in progress.
	Idle,
	/// An intent was accepted for interception.
	Intercepted,
	/// The content fetch is in flight.
	Fetching,
	/// The swap completed; transient before returning to idle.
	Applied,
	/// Interception gave up; a native navigation is taking over.
	Fallback,
}

/// Owns the fetch/swap pipeline and the history reconciliation.
pub struct Navigator<P, H, S> {
	store: Rc<ManifestStore>,
	fetcher: ContentFetcher<S>,
	page: P,
	history: H,
	phase: Cell<NavPhase>,
}

impl<P, H, S> Navigator<P, H, S>
where
	P: HostPage,
	H: HistoryBackend,
	S: ContentSource,
{
	/// Creates a navigator over the given boundaries.
	pub fn new(store: Rc<ManifestStore>, source: S, page: P, history: H) -> Self {
		Self {
			store,
			fetcher: ContentFetcher::new(source),
			page,
			history,
			phase: Cell::new(NavPhase::Idle),
		}
	}

	/// Returns the manifest store the navigator classifies against.
	pub fn store(&self) -> &ManifestStore {
		&self.store
	}

	/// Returns the current phase of the state machine.
	pub fn phase(&self) -> NavPhase {
		self.phase.get()
	}

	/// Returns the in-flight request, if a fetch is pending.
	pub fn in_flight(&self) -> Option<InFlightRequest> {
		self.fetcher.in_flight()
	}

	/// Runs a click-origin or programmatic intent through the pipeline.
	///
	/// On success this pushes a history entry for the new path and swaps;
	/// on failure it falls back to a native navigation so the user's
	/// committed navigation still happens.
	pub async fn navigate(&self, intent: NavigationIntent) {
		self.run(intent, None).await;
	}

	/// Reconciles a back/forward transition with the fetch/swap pipeline.
	///
	/// The browser has already moved the history position, so nothing is
	/// pushed; `entry` is the popped state, or `None` when the position
	/// carries no usable state (then one is synthesized from the current
	/// location). On success the entry's recorded scroll is restored.
	pub async fn handle_pop(&self, entry: Option<HistoryEntry>) {
		let entry = entry.unwrap_or_else(|| HistoryEntry::new(self.history.current_path()));
		let intent = NavigationIntent::new(entry.path.clone(), NavigationOrigin::Popstate);
		self.run(intent, Some(entry.scroll)).await;
	}

	async fn run(&self, intent: NavigationIntent, restore: Option<ScrollPosition>) {
		let origin = intent.origin;
		let path = intent.target_path;
		self.phase.set(NavPhase::Intercepted);

		self.phase.set(NavPhase::Fetching);
		match self.fetcher.fetch_content(&path, &self.store).await {
			ContentResult::Content(html) => {
				if origin != NavigationOrigin::Popstate {
					self.record_departure();
					self.history.push(&HistoryEntry::new(&path));
				}
				self.apply(&path, &html, restore.unwrap_or(ScrollPosition::TOP));
				self.phase.set(NavPhase::Applied);
				self.phase.set(NavPhase::Idle);
			}
			ContentResult::MissingEntry => {
				// Unknown path: let a real navigation resolve it.
				self.fall_back(&path);
			}
			ContentResult::Failed(err) => {
				warn_log!("Content fetch for '{}' failed ({}), falling back", path, err);
				self.fall_back(&path);
			}
			ContentResult::Superseded => {
				// A newer intent owns the pipeline; drop this one silently.
			}
		}
	}

	/// Re-records the entry being departed with its final scroll position
	/// so a later pop back to it can restore where the user was.
	fn record_departure(&self) {
		let departed = HistoryEntry::new(self.history.current_path())
			.with_scroll(self.page.scroll_position());
		self.history.replace(&departed);
	}

	fn apply(&self, path: &str, html: &str, scroll: ScrollPosition) {
		self.page.swap_content(html);
		if let Some(title) = self.store.get(path).and_then(|entry| entry.title.as_deref()) {
			self.page.set_title(title);
		}
		self.page.scroll_to(scroll);
	}

	fn fall_back(&self, path: &str) {
		self.phase.set(NavPhase::Fallback);
		self.page.navigate_native(path);
	}
}
