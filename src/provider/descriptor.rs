//! Provider descriptor data structures shared by all flows.
//!
//! The module exposes validated metadata and builder utilities so identity providers can
//! be described in a transport-agnostic way.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Endpoint labels used by strategies and observability.
pub mod endpoint;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use endpoint::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Authorize endpoint of the default institutional provider.
pub const DEFAULT_AUTHORIZATION_ENDPOINT: &str = "https://oidc.mit.edu/authorize";
/// Token endpoint of the default institutional provider.
pub const DEFAULT_TOKEN_ENDPOINT: &str = "https://oidc.mit.edu/token";
/// Userinfo endpoint of the default institutional provider.
pub const DEFAULT_USERINFO_ENDPOINT: &str = "https://oidc.mit.edu/userinfo";

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint users are redirected to when logging in.
	pub authorization: Url,
	/// Token endpoint used for the authorization-code exchange.
	pub token: Url,
	/// Userinfo endpoint queried with the freshly issued access token.
	pub userinfo: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Returns the URL registered for an endpoint kind.
	pub fn endpoint(&self, kind: EndpointKind) -> &Url {
		match kind {
			EndpointKind::Authorization => &self.endpoints.authorization,
			EndpointKind::Token => &self.endpoints.token,
			EndpointKind::Userinfo => &self.endpoints.userinfo,
		}
	}
}
