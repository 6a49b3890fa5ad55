//! HTTP seam for the two provider calls a callback makes.
//!
//! The authenticator never talks to an HTTP stack directly. It asks a
//! [`ProviderHttpClient`] for a per-call handle and hands that handle to the `oauth2` crate
//! (code exchange) or drives it itself (userinfo). Each handle reports the last response
//! status into a [`StatusCell`], which is all error classification needs from the transport.

// crates.io
use oauth2::{AsyncHttpClient, HttpClientError};
#[cfg(feature = "reqwest")] use oauth2::{HttpRequest, HttpResponse};
// self
use crate::_prelude::*;

/// Transport that can issue the code exchange and userinfo requests.
///
/// Implementations are shared behind `Arc` by every clone of an authenticator, and every
/// provider call gets its own handle, so concurrent callbacks never see each other's
/// statuses.
pub trait ProviderHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Error emitted by the underlying HTTP stack.
	type TransportError: 'static + Send + Sync + StdError;

	/// Per-call handle driven by `oauth2` and by the userinfo lookup.
	type Handle: for<'c> AsyncHttpClient<
			'c,
			Error = HttpClientError<Self::TransportError>,
			Future: 'c + Send,
		>
		+ 'static
		+ Send
		+ Sync;

	/// Returns a handle that writes each response status into `status`.
	///
	/// Handles clear the cell before dispatching and set it as soon as a status line
	/// arrives, including for error statuses.
	fn handle(&self, status: StatusCell) -> Self::Handle;
}

/// Last HTTP status observed by one provider call.
#[derive(Clone, Debug, Default)]
pub struct StatusCell(Arc<Mutex<Option<u16>>>);
impl StatusCell {
	/// Records the status of the response currently being processed.
	pub fn set(&self, status: u16) {
		*self.0.lock() = Some(status);
	}

	/// Forgets any previously recorded status.
	pub fn clear(&self) {
		*self.0.lock() = None;
	}

	/// Returns the recorded status, if a response arrived.
	pub fn get(&self) -> Option<u16> {
		*self.0.lock()
	}
}

/// reqwest-backed [`ProviderHttpClient`].
///
/// Provider endpoints answer directly, so [`ReqwestHttpClient::new`] disables redirect
/// following. Clients passed to [`ReqwestHttpClient::with_client`] are used as-is.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHttpClient(ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Builds a client with redirects disabled.
	pub fn new() -> Result<Self, crate::error::ConfigError> {
		let client =
			ReqwestClient::builder().redirect(reqwest::redirect::Policy::none()).build()?;

		Ok(Self(client))
	}

	/// Wraps a caller-configured reqwest client.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Underlying reqwest client.
	pub fn client(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl ProviderHttpClient for ReqwestHttpClient {
	type Handle = ReqwestHandle;
	type TransportError = ReqwestError;

	fn handle(&self, status: StatusCell) -> Self::Handle {
		ReqwestHandle { client: self.0.clone(), status }
	}
}

/// Handle returned by [`ReqwestHttpClient`] for a single provider call.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug)]
pub struct ReqwestHandle {
	client: ReqwestClient,
	status: StatusCell,
}
#[cfg(feature = "reqwest")]
impl<'c> AsyncHttpClient<'c> for ReqwestHandle {
	type Error = HttpClientError<ReqwestError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'c + Send + Sync>>;

	fn call(&'c self, request: HttpRequest) -> Self::Future {
		Box::pin(async move {
			self.status.clear();

			let response =
				self.client.execute(request.try_into().map_err(Box::new)?).await.map_err(Box::new)?;
			let status = response.status();

			self.status.set(status.as_u16());

			let headers = response.headers().clone();
			let body = response.bytes().await.map_err(Box::new)?;
			let mut converted = HttpResponse::new(body.to_vec());

			*converted.status_mut() = status;
			*converted.headers_mut() = headers;

			Ok(converted)
		})
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn status_cell_is_shared_between_clones() {
		let cell = StatusCell::default();
		let writer = cell.clone();

		assert_eq!(cell.get(), None);

		writer.set(401);

		assert_eq!(cell.get(), Some(401));

		writer.clear();

		assert_eq!(cell.get(), None);
	}

	#[cfg(feature = "reqwest")]
	#[test]
	fn handles_report_into_their_own_cell() {
		let client = ReqwestHttpClient::new().expect("Default reqwest client should build.");
		let first = StatusCell::default();
		let second = StatusCell::default();
		let first_handle = client.handle(first.clone());
		let _second_handle = client.handle(second.clone());

		first_handle.status.set(200);

		assert_eq!(first.get(), Some(200));
		assert_eq!(second.get(), None);
	}
}
