//! Agora Identity Resolver
//!
//! Resolves request credentials into the dual-identity `Actor` sum type and
//! enforces the edit/delete authorization rule that treats authenticated
//! accounts and ephemeral anonymous posters uniformly.
//!
//! The resolver provides:
//! - Actor resolution with ban and suspension-window checks
//! - Edit/delete authorization (owner, moderator, or matching anonymous token)
//!
//! # Examples
//!
//! ```no_run
//! use agora_identity::IdentityResolver;
//! use agora_domain::Credentials;
//!
//! let resolver = IdentityResolver::new();
//!
//! // Resolve a request's credentials against the account store
//! // let actor = resolver.resolve_actor(&credentials, &store, now)?;
//! ```

#![warn(missing_docs)]

mod resolver;

pub use resolver::IdentityResolver;
