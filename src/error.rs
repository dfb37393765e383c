//! Error types for manifest loading, content retrieval, and bootstrap.

use thiserror::Error;

/// Error type for manifest parsing.
#[derive(Debug, Error)]
pub enum ManifestError {
	/// The manifest body is not valid manifest JSON.
	#[error("invalid manifest: {0}")]
	Parse(#[from] serde_json::Error),
}

/// Error type for content retrieval.
///
/// Every variant maps to the same outcome for the user: the navigator
/// falls back to a native navigation instead of applying a swap.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
	/// The request never produced a response.
	#[error("network error: {0}")]
	Network(String),
	/// The server answered with a non-success status.
	#[error("unexpected status {0}")]
	Status(u16),
	/// The response body could not be read as text.
	#[error("unreadable body: {0}")]
	Body(String),
}

/// Error type for bootstrap wiring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LaunchError {
	/// A configured selector matched no element.
	#[error("no element matches selector '{0}'")]
	MissingElement(String),
	/// A DOM API call failed during setup.
	#[error("DOM setup failed: {0}")]
	Dom(String),
}
