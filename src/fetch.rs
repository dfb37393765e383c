//! Content Fetcher.
//!
//! Retrieves content fragments for manifest routes with last-intent-wins
//! cancellation: at most one request is in flight at a time, and starting a
//! new one cancels the previous request. Cancellation is prompt, not just a
//! discard on arrival: superseding wakes the losing request, whose transport
//! future is dropped on its next poll. Dropping the future aborts the
//! underlying browser request on the reqwest wasm backend.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::FetchError;
use crate::manifest::ManifestStore;

/// Future returned by [`ContentSource::fetch`].
pub type SourceFuture<'a> = Pin<Box<dyn Future<Output = Result<String, FetchError>> + 'a>>;

/// Async boundary that retrieves a content fragment by URL.
///
/// The fetcher drops the returned future as soon as `token` is cancelled,
/// which is how transport-level abort happens for drop-aware backends.
/// Sources whose transport needs an explicit cancel call can observe the
/// token themselves.
pub trait ContentSource {
	/// Fetches the body at `url` on behalf of the request owning `token`.
	fn fetch<'a>(&'a self, url: &'a str, token: &'a CancelToken) -> SourceFuture<'a>;
}

impl<S: ContentSource + ?Sized> ContentSource for Rc<S> {
	fn fetch<'a>(&'a self, url: &'a str, token: &'a CancelToken) -> SourceFuture<'a> {
		(**self).fetch(url, token)
	}
}

/// Token handed out per request; superseded tokens turn stale.
///
/// The token is a generation check against a counter shared with the
/// fetcher. Bumping the counter cancels every token issued before the bump
/// and wakes the superseded request so it stops polling its transport.
#[derive(Debug, Clone)]
pub struct CancelToken {
	issued: u64,
	live: Rc<Cell<u64>>,
	waker: Rc<RefCell<Option<Waker>>>,
}

impl CancelToken {
	/// Returns true once a newer request has superseded this one.
	pub fn is_cancelled(&self) -> bool {
		self.live.get() != self.issued
	}

	fn register(&self, waker: &Waker) {
		*self.waker.borrow_mut() = Some(waker.clone());
	}

	fn wake(&self) {
		if let Some(waker) = self.waker.borrow_mut().take() {
			waker.wake();
		}
	}
}

/// The single in-flight request slot.
#[derive(Debug, Clone)]
pub struct InFlightRequest {
	/// Route path the request is for.
	pub target_path: String,
	/// Cancellation token of the request.
	pub token: CancelToken,
}

/// Outcome of a content fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentResult {
	/// The fragment body, ready to swap in.
	Content(String),
	/// The path is not in the manifest; the caller falls back natively.
	MissingEntry,
	/// Network, status, or body failure; the caller falls back natively.
	Failed(FetchError),
	/// A newer intent superseded this request; discard silently.
	Superseded,
}

/// Runs a source future until it resolves or its token is cancelled.
///
/// `None` means cancelled; the inner future is dropped at that point, which
/// releases the transport.
struct CancellableFetch<'a> {
	token: CancelToken,
	inner: SourceFuture<'a>,
}

impl Future for CancellableFetch<'_> {
	type Output = Option<Result<String, FetchError>>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.get_mut();
		if this.token.is_cancelled() {
			return Poll::Ready(None);
		}
		match this.inner.as_mut().poll(cx) {
			Poll::Ready(outcome) => Poll::Ready(Some(outcome)),
			Poll::Pending => {
				this.token.register(cx.waker());
				Poll::Pending
			}
		}
	}
}

/// Fetches content fragments with at-most-one-concurrent-request semantics.
pub struct ContentFetcher<S> {
	source: S,
	generation: Rc<Cell<u64>>,
	in_flight: RefCell<Option<InFlightRequest>>,
}

impl<S: ContentSource> ContentFetcher<S> {
	/// Creates a fetcher over the given source.
	pub fn new(source: S) -> Self {
		Self {
			source,
			generation: Rc::new(Cell::new(0)),
			in_flight: RefCell::new(None),
		}
	}

	/// Returns the in-flight request, if a fetch is pending.
	pub fn in_flight(&self) -> Option<InFlightRequest> {
		self.in_flight.borrow().clone()
	}

	/// Supersedes any in-flight request and claims the slot for `path`.
	///
	/// The superseded request is woken so it drops its transport promptly.
	fn begin(&self, path: &str) -> CancelToken {
		let next = self.generation.get() + 1;
		self.generation.set(next);
		let token = CancelToken {
			issued: next,
			live: Rc::clone(&self.generation),
			waker: Rc::new(RefCell::new(None)),
		};
		let previous = self.in_flight.borrow_mut().replace(InFlightRequest {
			target_path: path.to_string(),
			token: token.clone(),
		});
		if let Some(previous) = previous {
			previous.token.wake();
		}
		token
	}

	/// Clears the slot if `token` still owns it.
	fn finish(&self, token: &CancelToken) {
		if !token.is_cancelled() {
			*self.in_flight.borrow_mut() = None;
		}
	}

	/// Looks up `path` in the store and retrieves its content fragment.
	///
	/// The lookup happens before any request is issued: a miss returns
	/// [`ContentResult::MissingEntry`] without touching the in-flight slot.
	/// Only the most recent call's outcome is ever surfaced as `Content` or
	/// `Failed`; earlier calls resolve to [`ContentResult::Superseded`] as
	/// soon as they are overtaken, dropping their transport, and must not
	/// be applied.
	pub async fn fetch_content(&self, path: &str, store: &ManifestStore) -> ContentResult {
		let Some(entry) = store.get(path) else {
			return ContentResult::MissingEntry;
		};

		let token = self.begin(path);
		let outcome = CancellableFetch {
			token: token.clone(),
			inner: self.source.fetch(&entry.content_ref, &token),
		}
		.await;
		// A completion can race the supersede within one poll.
		let outcome = match outcome {
			Some(outcome) if !token.is_cancelled() => outcome,
			_ => return ContentResult::Superseded,
		};
		self.finish(&token);

		match outcome {
			Ok(body) => ContentResult::Content(body),
			Err(err) => ContentResult::Failed(err),
		}
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
mod http {
	use super::{CancelToken, ContentSource, SourceFuture};
	use crate::error::FetchError;

	/// [`ContentSource`] backed by the browser fetch API.
	///
	/// Cancellation is drop-based: the fetcher drops this source's future
	/// when its token is superseded and reqwest aborts the browser request.
	#[derive(Debug, Clone, Default)]
	pub struct HttpContentSource {
		client: reqwest::Client,
	}

	impl HttpContentSource {
		/// Creates the source.
		pub fn new() -> Self {
			Self::default()
		}
	}

	impl ContentSource for HttpContentSource {
		fn fetch<'a>(&'a self, url: &'a str, _token: &'a CancelToken) -> SourceFuture<'a> {
			let request = self.client.get(url);
			Box::pin(async move {
				let response = request
					.send()
					.await
					.map_err(|err| FetchError::Network(err.to_string()))?;
				let status = response.status();
				if !status.is_success() {
					return Err(FetchError::Status(status.as_u16()));
				}
				response
					.text()
					.await
					.map_err(|err| FetchError::Body(err.to_string()))
			})
		}
	}
}

#[cfg(all(target_family = "wasm", target_os = "unknown"))]
pub use http::HttpContentSource;

#[cfg(test)]
mod tests {
	use super::*;
	use crate::manifest::RouteEntry;

	struct StaticSource {
		outcome: Result<String, FetchError>,
	}

	impl StaticSource {
		fn ok(body: &str) -> Self {
			Self {
				outcome: Ok(body.to_string()),
			}
		}

		fn err(err: FetchError) -> Self {
			Self { outcome: Err(err) }
		}
	}

	impl ContentSource for StaticSource {
		fn fetch<'a>(&'a self, _url: &'a str, _token: &'a CancelToken) -> SourceFuture<'a> {
			let outcome = self.outcome.clone();
			Box::pin(async move { outcome })
		}
	}

	fn store_with(path: &str, content_ref: &str) -> ManifestStore {
		ManifestStore::from_entries([(path.to_string(), RouteEntry::new(content_ref))])
	}

	#[test]
	fn test_begin_supersedes_previous_token() {
		let fetcher = ContentFetcher::new(StaticSource::ok("body"));

		let first = fetcher.begin("/a");
		assert!(!first.is_cancelled());

		let second = fetcher.begin("/b");
		assert!(first.is_cancelled());
		assert!(!second.is_cancelled());
		assert_eq!(fetcher.in_flight().unwrap().target_path, "/b");
	}

	#[test]
	fn test_finish_ignores_stale_token() {
		let fetcher = ContentFetcher::new(StaticSource::ok("body"));

		let stale = fetcher.begin("/a");
		let _current = fetcher.begin("/b");

		fetcher.finish(&stale);
		assert!(fetcher.in_flight().is_some());
	}

	#[tokio::test]
	async fn test_fetch_content_success_clears_slot() {
		let fetcher = ContentFetcher::new(StaticSource::ok("<h1>About</h1>"));
		let store = store_with("/about", "/frag/about.html");

		let result = fetcher.fetch_content("/about", &store).await;
		assert_eq!(result, ContentResult::Content("<h1>About</h1>".to_string()));
		assert!(fetcher.in_flight().is_none());
	}

	#[tokio::test]
	async fn test_fetch_content_missing_entry() {
		let fetcher = ContentFetcher::new(StaticSource::ok("body"));
		let store = ManifestStore::empty();

		let result = fetcher.fetch_content("/missing", &store).await;
		assert_eq!(result, ContentResult::MissingEntry);
		assert!(fetcher.in_flight().is_none());
	}

	#[tokio::test]
	async fn test_fetch_content_failure() {
		let fetcher = ContentFetcher::new(StaticSource::err(FetchError::Status(500)));
		let store = store_with("/about", "/frag/about.html");

		let result = fetcher.fetch_content("/about", &store).await;
		assert_eq!(result, ContentResult::Failed(FetchError::Status(500)));
		assert!(fetcher.in_flight().is_none());
	}

	#[tokio::test]
	async fn test_superseded_fetch_is_discarded() {
		use std::collections::HashMap;
		use tokio::sync::oneshot;

		#[derive(Default)]
		struct GatedSource {
			gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
		}

		impl ContentSource for GatedSource {
			fn fetch<'a>(&'a self, url: &'a str, _token: &'a CancelToken) -> SourceFuture<'a> {
				let gate = self.gates.borrow_mut().remove(url);
				let body = format!("content of {url}");
				Box::pin(async move {
					if let Some(gate) = gate {
						let _ = gate.await;
					}
					Ok(body)
				})
			}
		}

		let source = GatedSource::default();
		let (release_a, gate_a) = oneshot::channel();
		source.gates.borrow_mut().insert("/frag/a.html".to_string(), gate_a);

		let fetcher = Rc::new(ContentFetcher::new(source));
		let store = Rc::new(ManifestStore::from_entries([
			("/a".to_string(), RouteEntry::new("/frag/a.html")),
			("/b".to_string(), RouteEntry::new("/frag/b.html")),
		]));

		let local = tokio::task::LocalSet::new();
		local
			.run_until(async {
				let slow = {
					let fetcher = Rc::clone(&fetcher);
					let store = Rc::clone(&store);
					tokio::task::spawn_local(async move {
						fetcher.fetch_content("/a", &store).await
					})
				};
				// Let the first request claim the slot before superseding it.
				tokio::task::yield_now().await;

				let fast = fetcher.fetch_content("/b", &store).await;
				assert_eq!(fast, ContentResult::Content("content of /frag/b.html".to_string()));

				// The loser resolves without its gate ever opening.
				assert_eq!(slow.await.unwrap(), ContentResult::Superseded);
				assert!(release_a.is_closed());

				// The slot belongs to no one once the winner completed.
				assert!(fetcher.in_flight().is_none());
			})
			.await;
	}

	#[tokio::test]
	async fn test_superseding_drops_the_losing_transfer() {
		struct DropSentinel {
			url: String,
			dropped: Rc<RefCell<Vec<String>>>,
		}

		impl Drop for DropSentinel {
			fn drop(&mut self) {
				self.dropped.borrow_mut().push(self.url.clone());
			}
		}

		// Futures never resolve on their own; they only report being dropped.
		#[derive(Default)]
		struct HangingSource {
			dropped: Rc<RefCell<Vec<String>>>,
		}

		impl ContentSource for HangingSource {
			fn fetch<'a>(&'a self, url: &'a str, _token: &'a CancelToken) -> SourceFuture<'a> {
				let sentinel = DropSentinel {
					url: url.to_string(),
					dropped: Rc::clone(&self.dropped),
				};
				Box::pin(async move {
					let _sentinel = sentinel;
					std::future::pending().await
				})
			}
		}

		let source = HangingSource::default();
		let dropped = Rc::clone(&source.dropped);
		let fetcher = Rc::new(ContentFetcher::new(source));
		let store = Rc::new(ManifestStore::from_entries([
			("/a".to_string(), RouteEntry::new("/frag/a.html")),
			("/b".to_string(), RouteEntry::new("/frag/b.html")),
		]));

		let local = tokio::task::LocalSet::new();
		local
			.run_until(async {
				let slow = {
					let fetcher = Rc::clone(&fetcher);
					let store = Rc::clone(&store);
					tokio::task::spawn_local(async move {
						fetcher.fetch_content("/a", &store).await
					})
				};
				tokio::task::yield_now().await;
				assert!(dropped.borrow().is_empty());

				// Superseding wakes the loser; its transport is dropped even
				// though the replacement transfer is itself still hanging.
				let replacement = {
					let fetcher = Rc::clone(&fetcher);
					let store = Rc::clone(&store);
					tokio::task::spawn_local(async move {
						fetcher.fetch_content("/b", &store).await
					})
				};
				assert_eq!(slow.await.unwrap(), ContentResult::Superseded);
				assert_eq!(*dropped.borrow(), vec!["/frag/a.html".to_string()]);

				replacement.abort();
			})
			.await;
	}
}
