//! Clients for the external SaaS collaborators: identity provider, image
//! host, and the social media feed. Each is a narrow async trait plus one
//! reqwest-backed implementation, constructed at bootstrap and injected into
//! the request handlers.

use thiserror::Error;

pub mod identity;
pub mod images;
pub mod media;

pub use identity::{HttpIdentityProvider, IdentityClaims, IdentityProvider};
pub use images::{HttpImageHost, ImageHost};
pub use media::{GraphMediaFeed, MediaFeed, MediaItem, MediaPage};

/// Failure surface shared by all collaborator clients. Failures are terminal
/// per request: no retries anywhere.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The identity provider examined the credential and said no.
    #[error("credential rejected by identity provider")]
    Rejected,

    #[error("upstream returned an unusable response: {0}")]
    Upstream(String),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
