//! Auth-domain identifiers, scope sets, access-token secrets, and provider profiles.

pub mod id;
pub mod profile;
pub mod scope;
pub mod secret;

pub use id::*;
pub use profile::*;
pub use scope::*;
pub use secret::*;
