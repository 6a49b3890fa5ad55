#![cfg(all(feature = "reqwest", feature = "test"))]

// crates.io
use httpmock::prelude::*;
// self
use oauth2_gatekeeper::{
	_preludet::*,
	auth::ProviderId,
	error::TransientError,
	flows::CALLBACK_PATH,
	policy::{
		AuthorizationPolicy, GroupMembership, GroupRecord, MemoryGroupDatabase, UsernameMap,
	},
	provider::{ClientAuthMethod, ProviderDescriptor},
	url,
};

const CLIENT_ID: &str = "client-it";
const CLIENT_SECRET: &str = "secret-it";
const TOKEN_BODY: &str =
	"{\"access_token\":\"access-success\",\"token_type\":\"bearer\",\"expires_in\":3600}";

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id = ProviderId::new("mock-oidc")
		.expect("Provider identifier should be valid for authenticate test.");

	ProviderDescriptor::builder(provider_id)
		.authorization_endpoint(
			Url::parse(&server.url("/authorize"))
				.expect("Mock authorization endpoint should parse successfully."),
		)
		.token_endpoint(
			Url::parse(&server.url("/token"))
				.expect("Mock token endpoint should parse successfully."),
		)
		.userinfo_endpoint(
			Url::parse(&server.url("/userinfo"))
				.expect("Mock userinfo endpoint should parse successfully."),
		)
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.expect("Provider descriptor should build successfully.")
}

/// `TEST_REDIRECT_URI` as it appears in the form-encoded token request.
fn redirect_uri_form_field() -> String {
	let encoded: String =
		url::form_urlencoded::byte_serialize(TEST_REDIRECT_URI.as_bytes()).collect();

	assert_eq!(encoded, "https%3A%2F%2Fhub.example.edu%2Fhub%2Foauth2_callback");

	format!("redirect_uri={encoded}")
}

fn build_authenticator(
	server: &MockServer,
	policy: AuthorizationPolicy,
) -> ReqwestTestAuthenticator {
	build_reqwest_test_authenticator(build_descriptor(server), CLIENT_ID, CLIENT_SECRET, policy)
}

#[tokio::test]
async fn authenticate_exchanges_code_and_fetches_profile() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());
	let redirect_field = redirect_uri_form_field();
	let token = server
		.mock_async(|when, then| {
			when.method(POST)
				.path("/token")
				.header("content-type", "application/x-www-form-urlencoded")
				.body_includes("grant_type=authorization_code")
				.body_includes("code=valid-code")
				.body_includes(&redirect_field)
				.body_includes("client_secret=secret-it");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	let userinfo = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/userinfo")
				.header("authorization", "Bearer access-success")
				.header("accept", "application/json");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"sub\":\"123\",\"email\":\"alice@mit.edu\",\"name\":\"Alice\"}");
		})
		.await;
	let profile = authenticator
		.authenticate(Some("valid-code"))
		.await?
		.expect("A code should yield a profile.");

	token.assert_async().await;
	userinfo.assert_async().await;

	assert_eq!(profile.email(), "alice@mit.edu");
	assert_eq!(profile.subject(), Some("123"));
	assert!(TEST_REDIRECT_URI.ends_with(CALLBACK_PATH));

	Ok(())
}

#[tokio::test]
async fn missing_or_empty_code_skips_the_provider() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;

	assert!(authenticator.authenticate(None).await?.is_none());
	assert!(authenticator.authenticate(Some("")).await?.is_none());
	assert!(authenticator.complete_login(None).await?.is_none());

	token.assert_hits_async(0).await;

	Ok(())
}

#[tokio::test]
async fn token_endpoint_invalid_grant_is_classified() {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());
	let token = server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(400)
				.header("content-type", "application/json")
				.body("{\"error\":\"invalid_grant\",\"error_description\":\"already used\"}");
		})
		.await;
	let userinfo = server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200).body("{}");
		})
		.await;
	let err = authenticator
		.authenticate(Some("stale-code"))
		.await
		.expect_err("Invalid grant errors should be classified correctly.");

	assert!(matches!(err, Error::InvalidGrant { .. }));

	token.assert_async().await;
	userinfo.assert_hits_async(0).await;
}

#[tokio::test]
async fn userinfo_unauthorized_is_a_client_failure() {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(401).header("www-authenticate", "Bearer error=\"invalid_token\"");
		})
		.await;

	let err = authenticator
		.authenticate(Some("valid-code"))
		.await
		.expect_err("Rejected access tokens should surface as errors.");

	assert!(matches!(err, Error::InvalidClient { .. }));
}

#[tokio::test]
async fn userinfo_scope_challenges_are_insufficient_scope() {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(403).header(
				"www-authenticate",
				"Bearer realm=\"mit\", error=\"insufficient_scope\", scope=\"openid email\"",
			);
		})
		.await;

	let err = authenticator
		.authenticate(Some("valid-code"))
		.await
		.expect_err("Tokens without the email scope should be refused.");

	assert!(matches!(err, Error::InsufficientScope { .. }));
}

#[tokio::test]
async fn userinfo_must_be_a_json_object() {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200)
				.header("content-type", "application/json")
				.body("[\"alice@mit.edu\"]");
		})
		.await;

	let err = authenticator
		.authenticate(Some("valid-code"))
		.await
		.expect_err("Non-object userinfo documents should be rejected.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::UserinfoParse {
			status: Some(200),
			..
		})
	));
}

#[tokio::test]
async fn userinfo_server_errors_are_transient() {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(503).body("maintenance");
		})
		.await;

	let err = authenticator
		.authenticate(Some("valid-code"))
		.await
		.expect_err("Unavailable userinfo endpoints should surface as errors.");

	assert!(matches!(
		err,
		Error::Transient(TransientError::Userinfo {
			status: Some(503),
			..
		})
	));
}

#[tokio::test]
async fn complete_login_applies_group_policy() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let groups = Arc::new(MemoryGroupDatabase::from_records([GroupRecord::new(
		"staff",
		["alice", "robert"],
	)]));
	let policy = AuthorizationPolicy::default()
		.with_username_map(UsernameMap::from_pairs([("bob", "robert")])?)
		.with_allow_list(GroupMembership::required("staff", groups));
	let authenticator = build_authenticator(&server, policy);

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("code=bob-code");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(POST).path("/token").body_includes("code=carol-code");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"access_token\":\"access-carol\",\"token_type\":\"bearer\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer access-success");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"email\":\"bob@mit.edu\"}");
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo").header("authorization", "Bearer access-carol");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"email\":\"carol@mit.edu\"}");
		})
		.await;

	let accepted = authenticator.complete_login(Some("bob-code")).await?;

	assert_eq!(accepted.as_deref(), Some("robert"));

	let rejected = authenticator.complete_login(Some("carol-code")).await?;

	assert_eq!(rejected, None);

	Ok(())
}

#[tokio::test]
async fn complete_login_rejects_foreign_domains() -> color_eyre::Result<()> {
	let server = MockServer::start_async().await;
	let authenticator = build_authenticator(&server, AuthorizationPolicy::default());

	server
		.mock_async(|when, then| {
			when.method(POST).path("/token");
			then.status(200).header("content-type", "application/json").body(TOKEN_BODY);
		})
		.await;
	server
		.mock_async(|when, then| {
			when.method(GET).path("/userinfo");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"email\":\"alice@harvard.edu\"}");
		})
		.await;

	assert_eq!(authenticator.complete_login(Some("valid-code")).await?, None);

	Ok(())
}
