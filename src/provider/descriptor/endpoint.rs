// self
use crate::_prelude::*;

/// Provider endpoints contacted during a login.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndpointKind {
	/// Browser-facing authorize endpoint.
	Authorization,
	/// Token endpoint used for the authorization-code grant.
	Token,
	/// Userinfo endpoint that releases profile claims.
	Userinfo,
}
impl EndpointKind {
	/// Returns a stable label suitable for messages and log fields.
	pub fn as_str(self) -> &'static str {
		match self {
			EndpointKind::Authorization => "authorization",
			EndpointKind::Token => "token",
			EndpointKind::Userinfo => "userinfo",
		}
	}
}
impl Display for EndpointKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
