//! Institutional OpenID Connect login for shared computing platforms: exchange a callback code,
//! read the verified email, and turn it into a canonical platform username behind
//! domain, remapping, and group allow-list checks.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod obs;
pub mod policy;
pub mod provider;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		flows::Authenticator,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		policy::AuthorizationPolicy,
		provider::ProviderDescriptor,
	};

	/// Authenticator type alias used by reqwest-backed integration tests.
	pub type ReqwestTestAuthenticator =
		Authenticator<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Redirect URI registered by test authenticators.
	pub const TEST_REDIRECT_URI: &str = "https://hub.example.edu/hub/oauth2_callback";

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs an [`Authenticator`] backed by the insecure test transport, the default
	/// provider strategy, and the provided policy.
	pub fn build_reqwest_test_authenticator(
		descriptor: ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
		policy: AuthorizationPolicy,
	) -> ReqwestTestAuthenticator {
		let redirect_uri =
			Url::parse(TEST_REDIRECT_URI).expect("Test redirect URI should parse successfully.");

		Authenticator::with_http_client(
			descriptor,
			client_id,
			redirect_uri,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_client_secret(client_secret)
		.with_policy(policy)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _, tokio as _};
