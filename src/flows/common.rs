//! Shared helpers for flow implementations (scope formatting, token form assembly).

// self
use crate::{auth::ScopeSet, provider::ProviderStrategy};

/// Joins normalized scopes with the provider's delimiter when building requests.
pub(crate) fn format_scope(scope: &ScopeSet, delimiter: char) -> Option<String> {
	if scope.is_empty() {
		return None;
	}
	if delimiter == ' ' {
		return Some(scope.normalized());
	}

	let mut buf = String::new();

	for (idx, value) in scope.iter().enumerate() {
		if idx > 0 {
			buf.push(delimiter);
		}

		buf.push_str(value);
	}

	Some(buf)
}

/// Collects the strategy's extra token-request parameters.
///
/// Fields owned by the authorization-code grant itself are dropped so strategies cannot
/// override the code or redirect URI.
pub(crate) fn extra_token_params(strategy: &dyn ProviderStrategy) -> Vec<(String, String)> {
	const RESERVED: [&str; 5] =
		["grant_type", "code", "redirect_uri", "client_id", "client_secret"];

	strategy
		.token_params()
		.into_iter()
		.filter(|(key, _)| !RESERVED.contains(&key.as_str()))
		.collect()
}
