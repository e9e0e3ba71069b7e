//! idp-adapter-core: Platform-agnostic identity-provider adapters
//!
//! Two stateless handlers sit behind thin platform shims:
//! - [`jwks::handle`] fetches a JSON Web Key Set and rewrites its keys
//! - [`token::handle`] performs an OAuth2 client-credentials exchange
//!
//! This crate depends only on abstract platform traits (HttpClient,
//! Environment) and never imports platform-specific code.

pub mod config;
pub mod error;
pub mod http;
pub mod jwks;
pub mod platform;
pub mod token;

#[cfg(test)]
pub mod test_support;
