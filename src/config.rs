//! Authenticator configuration loaded from `OAUTH_*` environment variables and optional files.
//!
//! Environment variables use the `OAUTH_` prefix followed by the upper-cased field name
//! (`OAUTH_CLIENT_ID`, `OAUTH_REQUIRED_GROUP`, ...). `OAUTH_ALLOWED_USERS` and
//! `OAUTH_SCOPES` are comma-separated lists. The username map is a table and is only read
//! from a configuration file passed to [`AuthenticatorConfig::load`]; environment values
//! override file values.

// std
use std::path::{Path, PathBuf};
// self
use crate::{
	_prelude::*,
	auth::{EmailDomain, ProviderId, ScopeSet},
	error::ConfigError,
	flows::Authenticator,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	policy::{
		AuthorizationPolicy, DEFAULT_GROUP_FILE, ExplicitAllowList, GroupDatabase, GroupFile,
		GroupMembership, UsernameMap,
	},
	provider::{
		ClientAuthMethod, DEFAULT_AUTHORIZATION_ENDPOINT, DEFAULT_TOKEN_ENDPOINT,
		DEFAULT_USERINFO_ENDPOINT, EndpointKind, ProviderDescriptor, parse_endpoint,
	},
};
#[cfg(feature = "reqwest")] use crate::flows::ReqwestAuthenticator;

/// Prefix shared by every environment variable the authenticator reads.
pub const ENV_PREFIX: &str = "OAUTH";

/// Settings needed to build an [`Authenticator`] and its [`AuthorizationPolicy`].
#[derive(Clone, Deserialize)]
pub struct AuthenticatorConfig {
	/// OAuth 2.0 client identifier registered with the provider.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: String,
	/// Redirect URI registered with the provider (the platform's callback route).
	pub callback_url: Url,
	/// Institutional email domain; defaults to `mit.edu`.
	#[serde(default)]
	pub email_domain: EmailDomain,
	/// Group whose direct members may log in; unset or empty disables the check.
	#[serde(default)]
	pub required_group: Option<String>,
	/// Explicit set of usernames allowed to log in.
	#[serde(default)]
	pub allowed_users: Option<Vec<String>>,
	/// Group database file consulted for `required_group`.
	#[serde(default = "default_group_file")]
	pub group_file: PathBuf,
	/// Raw local part to canonical username table.
	#[serde(default)]
	pub username_map: UsernameMap,
	/// Requested scopes; `email` is always added.
	#[serde(default = "default_scopes")]
	pub scopes: Vec<String>,
	/// Identifier used for the provider descriptor in logs.
	#[serde(default = "default_provider_id")]
	pub provider_id: String,
	/// Provider authorize endpoint.
	#[serde(default = "default_authorize_url")]
	pub authorize_url: String,
	/// Provider token endpoint.
	#[serde(default = "default_token_url")]
	pub token_url: String,
	/// Provider userinfo endpoint.
	#[serde(default = "default_userinfo_url")]
	pub userinfo_url: String,
	/// Client authentication method used at the token endpoint.
	#[serde(default = "default_client_auth_method")]
	pub client_auth_method: ClientAuthMethod,
}
impl AuthenticatorConfig {
	/// Loads configuration from `OAUTH_*` environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_sources(None, None)
	}

	/// Loads configuration from an optional file, overridden by `OAUTH_*` environment variables.
	///
	/// The file format is inferred from its extension (TOML, JSON, YAML, ...).
	pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
		Self::from_sources(path, None)
	}

	/// Loads configuration from an optional file and an explicit variable map instead of the
	/// process environment. Keys use the same `OAUTH_*` names.
	pub fn from_sources(
		path: Option<&Path>,
		vars: Option<::config::Map<String, String>>,
	) -> Result<Self, ConfigError> {
		let mut builder = ::config::Config::builder();

		if let Some(path) = path {
			builder = builder.add_source(::config::File::from(path));
		}

		let config = builder
			.add_source(
				::config::Environment::with_prefix(ENV_PREFIX)
					.try_parsing(true)
					.list_separator(",")
					.with_list_parse_key("allowed_users")
					.with_list_parse_key("scopes")
					.source(vars),
			)
			.build()?
			.try_deserialize()?;

		Ok(config)
	}

	/// Required group name, with empty values treated as unset.
	pub fn required_group(&self) -> Option<&str> {
		self.required_group.as_deref().map(str::trim).filter(|group| !group.is_empty())
	}

	/// Builds the provider descriptor from the configured endpoints.
	pub fn descriptor(&self) -> Result<ProviderDescriptor, ConfigError> {
		let id = ProviderId::new(&self.provider_id)
			.map_err(|e| ConfigError::invalid_value("provider_id", e))?;
		let descriptor = ProviderDescriptor::builder(id)
			.authorization_endpoint(parse_endpoint(EndpointKind::Authorization, &self.authorize_url)?)
			.token_endpoint(parse_endpoint(EndpointKind::Token, &self.token_url)?)
			.userinfo_endpoint(parse_endpoint(EndpointKind::Userinfo, &self.userinfo_url)?)
			.preferred_client_auth_method(self.client_auth_method)
			.build()?;

		Ok(descriptor)
	}

	/// Normalized scope set, always containing `email`.
	pub fn scope(&self) -> Result<ScopeSet, ConfigError> {
		Ok(ScopeSet::new(&self.scopes)?.with_email())
	}

	/// Builds the policy, reading group membership from [`AuthenticatorConfig::group_file`].
	pub fn policy(&self) -> Result<AuthorizationPolicy, ConfigError> {
		self.policy_with(GroupFile::new(&self.group_file))
	}

	/// Builds the policy with a caller-provided group database.
	///
	/// The group allow-list is always installed, so an unset `required_group` is logged as a
	/// disabled check on every decision.
	pub fn policy_with<G>(&self, groups: G) -> Result<AuthorizationPolicy, ConfigError>
	where
		G: 'static + GroupDatabase,
	{
		let mut policy = AuthorizationPolicy::new(self.email_domain.clone())
			.with_username_map(self.username_map.clone());

		if let Some(allowed) = self.allowed_users() {
			let allow_list = ExplicitAllowList::from_names(allowed)
				.map_err(|e| ConfigError::invalid_value("allowed_users", e))?;

			policy = policy.with_allow_list(allow_list);
		}

		Ok(policy.with_allow_list(GroupMembership::new(
			self.required_group().map(str::to_owned),
			groups,
		)))
	}

	/// Assembles an authenticator around a caller-provided transport + mapper pair.
	pub fn authenticator_with<C, M>(
		&self,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Result<Authenticator<C, M>, ConfigError>
	where
		C: ?Sized + ProviderHttpClient,
		M: ?Sized + TransportErrorMapper<C::TransportError>,
	{
		Ok(Authenticator::with_http_client(
			self.descriptor()?,
			&self.client_id,
			self.callback_url.clone(),
			http_client,
			mapper,
		)
		.with_client_secret(&self.client_secret)
		.with_scope(self.scope()?)
		.with_policy(self.policy()?))
	}

	/// Non-blank entries of `allowed_users`; `None` when nothing usable is configured.
	fn allowed_users(&self) -> Option<Vec<&str>> {
		let names = self
			.allowed_users
			.as_ref()?
			.iter()
			.map(|name| name.trim())
			.filter(|name| !name.is_empty())
			.collect::<Vec<_>>();

		if names.is_empty() { None } else { Some(names) }
	}
}
impl Debug for AuthenticatorConfig {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthenticatorConfig")
			.field("client_id", &self.client_id)
			.field("client_secret", &"<redacted>")
			.field("callback_url", &self.callback_url)
			.field("email_domain", &self.email_domain)
			.field("required_group", &self.required_group)
			.field("allowed_users", &self.allowed_users)
			.field("group_file", &self.group_file)
			.field("username_map", &self.username_map)
			.field("scopes", &self.scopes)
			.field("provider_id", &self.provider_id)
			.field("authorize_url", &self.authorize_url)
			.field("token_url", &self.token_url)
			.field("userinfo_url", &self.userinfo_url)
			.field("client_auth_method", &self.client_auth_method)
			.finish()
	}
}

#[cfg(feature = "reqwest")]
impl ReqwestAuthenticator {
	/// Builds a reqwest-backed authenticator from configuration.
	pub fn from_config(config: &AuthenticatorConfig) -> Result<Self> {
		Ok(config.authenticator_with(
			crate::http::ReqwestHttpClient::new()?,
			Arc::new(crate::oauth::ReqwestTransportErrorMapper),
		)?)
	}
}

fn default_group_file() -> PathBuf {
	PathBuf::from(DEFAULT_GROUP_FILE)
}

fn default_scopes() -> Vec<String> {
	vec![crate::auth::EMAIL_SCOPE.to_owned()]
}

fn default_provider_id() -> String {
	"mit-oidc".into()
}

fn default_authorize_url() -> String {
	DEFAULT_AUTHORIZATION_ENDPOINT.into()
}

fn default_token_url() -> String {
	DEFAULT_TOKEN_ENDPOINT.into()
}

fn default_userinfo_url() -> String {
	DEFAULT_USERINFO_ENDPOINT.into()
}

fn default_client_auth_method() -> ClientAuthMethod {
	ClientAuthMethod::ClientSecretPost
}

#[cfg(test)]
mod tests {
	// std
	use std::{env, fs, process};
	// self
	use super::*;
	use crate::{
		auth::{Profile, Username},
		policy::{GroupRecord, MemoryGroupDatabase},
	};

	fn vars(pairs: &[(&str, &str)]) -> ::config::Map<String, String> {
		let mut map = ::config::Map::new();

		map.insert("OAUTH_CLIENT_ID".into(), "client-123".into());
		map.insert("OAUTH_CLIENT_SECRET".into(), "s3cr3t".into());
		map.insert("OAUTH_CALLBACK_URL".into(), "https://hub.example.edu/hub/oauth2_callback".into());

		for (key, value) in pairs {
			map.insert((*key).into(), (*value).into());
		}

		map
	}

	fn load(pairs: &[(&str, &str)]) -> AuthenticatorConfig {
		AuthenticatorConfig::from_sources(None, Some(vars(pairs)))
			.expect("Configuration fixture should load.")
	}

	#[test]
	fn defaults_follow_institutional_provider() {
		let config = load(&[]);

		assert_eq!(config.email_domain.as_ref(), "mit.edu");
		assert_eq!(config.required_group(), None);
		assert_eq!(config.group_file, PathBuf::from("/etc/group"));
		assert_eq!(config.client_auth_method, ClientAuthMethod::ClientSecretPost);

		let descriptor = config.descriptor().expect("Default descriptor should validate.");

		assert_eq!(descriptor.endpoints.userinfo.as_str(), DEFAULT_USERINFO_ENDPOINT);
		assert_eq!(config.scope().expect("Default scopes should be valid.").normalized(), "email");
	}

	#[test]
	fn missing_required_values_fail() {
		let mut map = vars(&[]);

		map.remove("OAUTH_CLIENT_SECRET");

		let err = AuthenticatorConfig::from_sources(None, Some(map))
			.expect_err("A missing client secret must be rejected.");

		assert!(matches!(err, ConfigError::Load(_)));
	}

	#[test]
	fn comma_separated_lists_are_split() {
		let config = load(&[
			("OAUTH_ALLOWED_USERS", "alice,robert"),
			("OAUTH_SCOPES", "openid,profile"),
			("OAUTH_REQUIRED_GROUP", "staff"),
		]);

		assert_eq!(config.allowed_users, Some(vec!["alice".into(), "robert".into()]));
		assert_eq!(config.required_group(), Some("staff"));
		assert_eq!(
			config.scope().expect("Scopes should be valid.").normalized(),
			"email openid profile"
		);
	}

	#[test]
	fn blank_group_is_unset() {
		assert_eq!(load(&[("OAUTH_REQUIRED_GROUP", "")]).required_group(), None);
	}

	#[test]
	fn policy_combines_allow_lists_and_group() {
		let config =
			load(&[("OAUTH_ALLOWED_USERS", "alice,carol"), ("OAUTH_REQUIRED_GROUP", "staff")]);
		let groups =
			MemoryGroupDatabase::from_records([GroupRecord::new("staff", ["alice", "robert"])]);
		let policy = config.policy_with(groups).expect("Policy fixture should build.");

		assert_eq!(policy.allow_list_labels().collect::<Vec<_>>(), vec!["explicit", "group"]);
		assert_eq!(
			policy.decide(&Profile::with_email("alice@mit.edu")),
			Some(Username::new("alice").expect("Username fixture should be valid."))
		);
		assert_eq!(policy.decide(&Profile::with_email("carol@mit.edu")), None);
		assert_eq!(policy.decide(&Profile::with_email("robert@mit.edu")), None);
	}

	#[test]
	fn allowed_users_are_trimmed_not_validated() {
		let config = load(&[("OAUTH_ALLOWED_USERS", " alice , de la cruz ,")]);
		let policy =
			config.policy_with(MemoryGroupDatabase::default()).expect("Policy fixture should build.");

		assert_eq!(
			policy.decide(&Profile::with_email("de la cruz@mit.edu")).as_deref(),
			Some("de la cruz")
		);
		assert!(policy.decide(&Profile::with_email("alice@mit.edu")).is_some());
		assert_eq!(policy.decide(&Profile::with_email("bob@mit.edu")), None);
	}

	#[test]
	fn insecure_endpoints_are_rejected() {
		let config = load(&[("OAUTH_TOKEN_URL", "http://oidc.example.edu/token")]);

		assert!(matches!(config.descriptor(), Err(ConfigError::Descriptor(_))));
	}

	#[test]
	fn file_values_are_layered_under_environment() {
		let path = env::temp_dir().join(format!(
			"oauth2_gatekeeper_config_{}_{}.toml",
			process::id(),
			OffsetDateTime::now_utc().unix_timestamp_nanos(),
		));

		fs::write(
			&path,
			"email_domain = \"example.edu\"\nrequired_group = \"from-file\"\n\n[username_map]\njdoe = \"john\"\n",
		)
		.expect("Failed to write configuration fixture.");

		let result = AuthenticatorConfig::from_sources(
			Some(&path),
			Some(vars(&[("OAUTH_REQUIRED_GROUP", "from-env")])),
		);

		fs::remove_file(&path).unwrap_or_else(|e| {
			panic!("Failed to remove temporary configuration file {}: {e}", path.display())
		});

		let config = result.expect("Layered configuration should load.");

		assert_eq!(config.email_domain.as_ref(), "example.edu");
		assert_eq!(config.required_group(), Some("from-env"));
		assert_eq!(config.username_map.get("jdoe").map(|name| name.as_ref()), Some("john"));
	}

	#[test]
	fn debug_redacts_client_secret() {
		let rendered = format!("{:?}", load(&[]));

		assert!(rendered.contains("<redacted>"));
		assert!(!rendered.contains("s3cr3t"));
	}
}
