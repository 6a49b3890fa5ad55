//! Provider-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated metadata (`ProviderDescriptor`) covering the HTTPS-only
//! authorize, token, and userinfo endpoints, client authentication preferences, and
//! provider quirks. `strategy` defines [`ProviderStrategy`], which adds token-request fields
//! and classifies failed provider calls into [`ProviderErrorKind`]s.

pub mod descriptor;
pub mod strategy;

pub use descriptor::*;
pub use strategy::*;
