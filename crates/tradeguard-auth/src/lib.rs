//! # tradeguard-auth
//!
//! Device authentication for the TradeGuard control plane.
//!
//! ## Modules
//!
//! - `jwt`: HS256 access token issuance and verification
//! - `pkce`: code challenge validation, S256 verification, state generation
//! - `redirect`: redirect URI allow-list and scheme policy
//! - `secret`: refresh secret generation and hashing
//! - `provider`: upstream OAuth2/OIDC identity provider client
//! - `service`: login, step-up, refresh rotation, and request authentication

pub mod jwt;
pub mod pkce;
pub mod provider;
pub mod redirect;
pub mod secret;
pub mod service;

pub use jwt::TokenCodec;
pub use provider::{IdentityProvider, OidcIdentityProvider, ProviderGrant, ProviderIdentity};
pub use redirect::RedirectPolicy;
pub use service::{AuthRejection, AuthService, AuthenticatedContext};
